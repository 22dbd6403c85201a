//! Relational introspection
//!
//! [`describe`] reads the catalog of a live connection into a [`SchemaDescriptor`];
//! [`render`] turns that into the report the model reads. Both are
//! deterministic: tables are keyed in a `BTreeMap` and every catalog query
//! has a fixed order.

use crate::sqlite::executor::value_to_json;
use crate::tool_error::ToolError;
use rusqlite::Connection;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub mod formatter;

pub use formatter::render;

const SAMPLE_ROWS: usize = 2;

/// Snapshot of every user table in a database
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaDescriptor {
    pub tables: BTreeMap<String, TableDescriptor>,
}

impl SchemaDescriptor {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.get(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableDescriptor {
    /// Physical column order
    pub columns: Vec<ColumnDescriptor>,
    /// Primary-key columns, in column order
    pub primary_keys: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
    pub indexes: Vec<IndexDescriptor>,
    /// Up to two rows; `None` when sampling failed
    pub sample_rows: Option<Vec<Map<String, Value>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub declared_type: String,
    pub not_null: bool,
    /// Default as the SQL literal text stored in the catalog
    pub default_value: Option<String>,
    pub primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyDescriptor {
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub columns: Vec<String>,
}

/// Describe the current state of the database behind `conn`
///
/// Catalog errors propagate. Sample-row failures do not: they leave
/// `sample_rows` empty for that table.
pub fn describe(conn: &Connection) -> Result<SchemaDescriptor, ToolError> {
    let mut tables = BTreeMap::new();

    for table_name in table_names(conn)? {
        let columns = columns(conn, &table_name)?;
        let primary_keys = columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.clone())
            .collect();

        let descriptor = TableDescriptor {
            foreign_keys: foreign_keys(conn, &table_name)?,
            indexes: indexes(conn, &table_name)?,
            sample_rows: sample_rows(conn, &table_name),
            columns,
            primary_keys,
        };
        tables.insert(table_name, descriptor);
    }

    tracing::debug!(tables = tables.len(), "Described database schema");
    Ok(SchemaDescriptor { tables })
}

/// Quote an identifier for use inside SQL text
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn table_names(conn: &Connection) -> Result<Vec<String>, ToolError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn columns(conn: &Connection, table: &str) -> Result<Vec<ColumnDescriptor>, ToolError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
    let columns = stmt
        .query_map([], |row| {
            Ok(ColumnDescriptor {
                name: row.get(1)?,
                declared_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                not_null: row.get::<_, i64>(3)? != 0,
                default_value: row.get(4)?,
                primary_key: row.get::<_, i64>(5)? > 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn foreign_keys(conn: &Connection, table: &str) -> Result<Vec<ForeignKeyDescriptor>, ToolError> {
    let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list({})", quote_ident(table)))?;
    let declared = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(3)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut foreign_keys = Vec::with_capacity(declared.len());
    for (from_column, to_table, to_column) in declared {
        // `REFERENCES t` without a column points at t's primary key
        let to_column = match to_column {
            Some(column) => column,
            None => referenced_primary_key(conn, &to_table)?,
        };
        foreign_keys.push(ForeignKeyDescriptor {
            from_column,
            to_table,
            to_column,
        });
    }
    Ok(foreign_keys)
}

fn referenced_primary_key(conn: &Connection, table: &str) -> Result<String, ToolError> {
    let pk = columns(conn, table)?
        .into_iter()
        .find(|c| c.primary_key)
        .map(|c| c.name)
        .unwrap_or_else(|| "rowid".to_string());
    Ok(pk)
}

fn indexes(conn: &Connection, table: &str) -> Result<Vec<IndexDescriptor>, ToolError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='index' AND tbl_name=?1 AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut indexes = Vec::with_capacity(names.len());
    for name in names {
        let mut info = conn.prepare(&format!("PRAGMA index_info({})", quote_ident(&name)))?;
        // Expression columns have no name
        let columns = info
            .query_map([], |row| row.get::<_, Option<String>>(2))?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|c| c.unwrap_or_else(|| "<expr>".to_string()))
            .collect();
        indexes.push(IndexDescriptor { name, columns });
    }
    Ok(indexes)
}

fn sample_rows(conn: &Connection, table: &str) -> Option<Vec<Map<String, Value>>> {
    let fetch = || -> Result<Vec<Map<String, Value>>, rusqlite::Error> {
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} LIMIT {}",
            quote_ident(table),
            SAMPLE_ROWS
        ))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let mut rows = stmt.query([])?;
        let mut samples = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Map::new();
            for (i, column) in columns.iter().enumerate() {
                record.insert(column.clone(), value_to_json(row.get_ref(i)?));
            }
            samples.push(record);
        }
        Ok(samples)
    };

    match fetch() {
        Ok(samples) => Some(samples),
        Err(e) => {
            tracing::warn!(table, error = %e, "Could not sample rows");
            None
        }
    }
}
