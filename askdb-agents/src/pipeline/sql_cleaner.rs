use regex::Regex;
use std::sync::LazyLock;

/// A statement starts at the beginning of a line and ends at the first `;`
/// outside quoted literals. `WITH` only counts when followed by a CTE
/// definition (`WITH name AS (`).
const STATEMENT_PATTERN: &str = r#"(?im)^[ \t]*((?:(?:SELECT|INSERT|UPDATE|DELETE)\b|WITH\s+(?:RECURSIVE\s+)?[\w"]+\s*(?:\([^)]*\)\s*)?AS\s*\()(?:'(?:[^']|'')*'|"(?:[^"]|"")*"|[^'";])*;)"#;

static STATEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(STATEMENT_PATTERN).expect("statement pattern is valid"));

/// Keywords a line of SQL may start with when the output has no terminator
const SQL_LINE_KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "WITH", "FROM", "WHERE", "JOIN", "INNER", "LEFT",
    "RIGHT", "OUTER", "ON", "AND", "OR", "GROUP", "ORDER", "HAVING", "LIMIT", "OFFSET", "UNION",
    "VALUES", "SET", "INTO", "CASE", "WHEN", "THEN", "ELSE", "END",
];

/// Extract the SQL statement from raw model output.
///
/// Markdown fences are removed, then the first statement that starts a line
/// with `SELECT`, `INSERT`, `UPDATE`, `DELETE` or `WITH` and ends at `;` is
/// taken.
/// Without such a match, lines starting with SQL keywords are kept. If that
/// also finds nothing, the trimmed text is returned unchanged.
pub fn clean_sql(raw: &str) -> String {
    let unfenced = strip_fences(raw);

    if let Some(found) = STATEMENT.captures(&unfenced).and_then(|caps| caps.get(1)) {
        return found.as_str().trim().to_string();
    }

    let kept: Vec<&str> = unfenced
        .lines()
        .map(str::trim)
        .filter(|line| starts_with_keyword(line))
        .collect();

    if kept.is_empty() {
        unfenced.trim().to_string()
    } else {
        kept.join("\n")
    }
}

fn strip_fences(raw: &str) -> String {
    raw.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            match trimmed.strip_prefix("```") {
                // keep anything written after a closing fence on the same line
                Some(rest) => rest
                    .trim_start_matches(|c: char| c.is_ascii_alphabetic())
                    .to_string(),
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn starts_with_keyword(line: &str) -> bool {
    let first = line
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or("")
        .to_uppercase();
    SQL_LINE_KEYWORDS.contains(&first.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_statement_is_kept() {
        assert_eq!(
            clean_sql("SELECT COUNT(*) FROM ventas;"),
            "SELECT COUNT(*) FROM ventas;"
        );
    }

    #[test]
    fn test_markdown_fence_is_removed() {
        let raw = "```sql\nSELECT producto, monto\nFROM ventas\nWHERE pais = 'Chile';\n```";
        assert_eq!(
            clean_sql(raw),
            "SELECT producto, monto\nFROM ventas\nWHERE pais = 'Chile';"
        );
    }

    #[test]
    fn test_explanation_around_statement_is_dropped() {
        let raw = "Claro, aquí tienes la consulta:\n\nselect pais, sum(monto) from ventas group by pais;\n\nEsta consulta agrupa por país.";
        assert_eq!(
            clean_sql(raw),
            "select pais, sum(monto) from ventas group by pais;"
        );
    }

    #[test]
    fn test_first_statement_wins() {
        let raw = "SELECT 1; SELECT 2;";
        assert_eq!(clean_sql(raw), "SELECT 1;");
    }

    #[test]
    fn test_cte_is_recognized() {
        let raw = "WITH t AS (SELECT pais FROM ventas) SELECT COUNT(*) FROM t;";
        assert_eq!(clean_sql(raw), raw);
    }

    #[test]
    fn test_keyword_must_be_a_whole_word() {
        // "selection" must not start a statement
        let raw = "La selection correcta es:\nSELECT * FROM ventas;";
        assert_eq!(clean_sql(raw), "SELECT * FROM ventas;");
    }

    #[test]
    fn test_unterminated_statement_falls_back_to_line_filter() {
        let raw = "Consulta:\nSELECT producto\nFROM ventas\nORDER BY monto DESC\nEspero que sirva";
        assert_eq!(
            clean_sql(raw),
            "SELECT producto\nFROM ventas\nORDER BY monto DESC"
        );
    }

    #[test]
    fn test_non_sql_text_is_returned_trimmed() {
        assert_eq!(clean_sql("  no sé responder  "), "no sé responder");
        assert_eq!(clean_sql(""), "");
    }

    #[test]
    fn test_semicolon_inside_literal_does_not_end_statement() {
        assert_eq!(
            clean_sql("SELECT * FROM ventas WHERE nota = 'a;b';"),
            "SELECT * FROM ventas WHERE nota = 'a;b';"
        );
        assert_eq!(
            clean_sql("SELECT COUNT(*) FROM ventas WHERE nota = 'it''s; ok';\nSELECT 2;"),
            "SELECT COUNT(*) FROM ventas WHERE nota = 'it''s; ok';"
        );
        assert_eq!(
            clean_sql(r#"SELECT "a;b" FROM ventas;"#),
            r#"SELECT "a;b" FROM ventas;"#
        );
    }

    #[test]
    fn test_keyword_inside_prose_does_not_start_statement() {
        assert_eq!(
            clean_sql("Here is the query with a count:\nSELECT COUNT(*) FROM ventas;"),
            "SELECT COUNT(*) FROM ventas;"
        );
        assert_eq!(
            clean_sql("With this query you get the total:\n  SELECT SUM(monto) FROM ventas;"),
            "SELECT SUM(monto) FROM ventas;"
        );
    }

    #[test]
    fn test_recursive_cte_with_columns_is_recognized() {
        let raw = "Consulta:\nWITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 3) SELECT x FROM n;";
        assert_eq!(
            clean_sql(raw),
            "WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 3) SELECT x FROM n;"
        );
    }
}
