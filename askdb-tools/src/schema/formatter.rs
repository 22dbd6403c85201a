use super::{SchemaDescriptor, TableDescriptor};
use std::fmt::Write;

const NO_TABLES: &str = "No hay tablas en la base de datos.";

/// Render a schema as the multi-section report shown to the model
///
/// Pure and total: the same descriptor always renders to the same text.
pub fn render(schema: &SchemaDescriptor) -> String {
    if schema.is_empty() {
        return NO_TABLES.to_string();
    }

    let mut out = String::new();
    let _ = write!(
        out,
        "BASE DE DATOS: SQLite\nTotal de tablas: {}\n\n",
        schema.tables.len()
    );
    out.push_str(&"=".repeat(60));
    out.push_str("\n\n");

    for (name, table) in &schema.tables {
        render_table(&mut out, name, table);
    }

    out
}

fn render_table(out: &mut String, name: &str, table: &TableDescriptor) {
    let _ = writeln!(out, "TABLA: {}", name);
    out.push_str(&"-".repeat(40));
    out.push_str("\n\n");

    out.push_str("COLUMNAS:\n");
    for column in &table.columns {
        let mut constraints = Vec::new();
        if column.primary_key {
            constraints.push("PRIMARY KEY".to_string());
        }
        if column.not_null {
            constraints.push("NOT NULL".to_string());
        }
        if let Some(default) = column.default_value.as_deref().filter(|d| !d.is_empty()) {
            constraints.push(format!("DEFAULT {}", default));
        }

        let _ = write!(out, "  • {} ({})", column.name, column.declared_type);
        if !constraints.is_empty() {
            let _ = write!(out, " ({})", constraints.join(", "));
        }
        out.push('\n');
    }

    if !table.primary_keys.is_empty() {
        let _ = writeln!(out, "\nPRIMARY KEY: {}", table.primary_keys.join(", "));
    }

    if !table.foreign_keys.is_empty() {
        out.push_str("\nRELACIONES (FOREIGN KEYS):\n");
        for fk in &table.foreign_keys {
            let _ = writeln!(
                out,
                "  • {}.{} → {}.{}",
                name, fk.from_column, fk.to_table, fk.to_column
            );
        }
    }

    if !table.indexes.is_empty() {
        out.push_str("\nÍNDICES:\n");
        for index in &table.indexes {
            let _ = writeln!(out, "  • {} ON ({})", index.name, index.columns.join(", "));
        }
    }

    if let Some(samples) = table.sample_rows.as_ref().filter(|s| !s.is_empty()) {
        out.push_str("\nMUESTRA DE DATOS (ejemplos):\n");
        for (i, row) in samples.iter().enumerate() {
            let row_text = serde_json::to_string(row).unwrap_or_default();
            let _ = writeln!(out, "  Fila {}: {}", i + 1, row_text);
        }
    }

    out.push('\n');
    out.push_str(&"=".repeat(60));
    out.push_str("\n\n");
}
