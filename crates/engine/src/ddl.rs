//! Lightweight DDL text parsing.
//!
//! `PRAGMA table_xinfo` is not guaranteed to report per-column collation
//! across every build of bundled SQLite, so the Catalog Loader (§4.3) falls
//! back to reading the declared collation straight out of the table's `sql`
//! column in `sqlite_master`. These helpers do the minimum parsing needed
//! for that: splitting the column-definition list at top-level commas and
//! picking out `COLLATE` / `PRIMARY KEY` tokens. This is not a general SQL
//! parser — it only needs to be correct for `CREATE TABLE` statements the
//! mirror itself produced or copied verbatim from the user schema.

use regex::Regex;
use std::sync::OnceLock;

/// One object read from `sqlite_master`.
#[derive(Clone, Debug)]
pub struct SchemaObject {
    pub kind: String,
    pub name: String,
    pub sql: String,
}

/// Returns whether `name` is one of the engine's reserved, internal
/// objects (`sqlite_%`), which the Schema Mirror must not copy.
pub fn is_reserved(name: &str) -> bool {
    name.starts_with("sqlite_")
}

/// Splits the parenthesized body of a `CREATE TABLE` statement into its
/// top-level comma-separated definitions (column defs and table
/// constraints), respecting nested parentheses so that e.g.
/// `CHECK (a IN (1, 2))` is not split in the middle.
fn split_body(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for ch in body.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// Extracts the parenthesized body following the table/index name in a
/// `CREATE TABLE` (or `CREATE INDEX ... (...)`) statement.
fn extract_body(sql: &str) -> Option<&str> {
    let open = sql.find('(')?;
    let close = sql.rfind(')')?;
    if close <= open {
        return None;
    }
    Some(&sql[open + 1..close])
}

const TABLE_CONSTRAINT_KEYWORDS: &[&str] = &[
    "PRIMARY", "UNIQUE", "CHECK", "FOREIGN", "CONSTRAINT",
];

fn is_table_constraint(def: &str) -> bool {
    let upper = def.trim_start().to_ascii_uppercase();
    TABLE_CONSTRAINT_KEYWORDS
        .iter()
        .any(|kw| upper.starts_with(kw))
}

fn quoted_or_bare_identifier(token: &str) -> String {
    let trimmed = token.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix('`').unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix('[').unwrap_or(trimmed);
    let trimmed = trimmed
        .trim_end_matches('"')
        .trim_end_matches('`')
        .trim_end_matches(']');
    trimmed.to_string()
}

/// Returns the ordinal column names declared by a `CREATE TABLE`
/// statement, skipping table-level constraint clauses.
pub fn column_names(sql: &str) -> Vec<String> {
    let Some(body) = extract_body(sql) else {
        return Vec::new();
    };
    split_body(body)
        .into_iter()
        .filter(|def| !is_table_constraint(def))
        .filter_map(|def| {
            def.split_whitespace()
                .next()
                .map(quoted_or_bare_identifier)
        })
        .collect()
}

fn collate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)COLLATE\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap())
}

/// Returns the declared collation for `column`, if its definition carries
/// an explicit `COLLATE` clause.
pub fn declared_collation(sql: &str, column: &str) -> Option<String> {
    let body = extract_body(sql)?;
    split_body(body).into_iter().find_map(|def| {
        let name = def.split_whitespace().next().map(quoted_or_bare_identifier)?;
        if name != column || is_table_constraint(&def) {
            return None;
        }
        collate_regex()
            .captures(&def)
            .map(|caps| caps[1].to_ascii_uppercase())
    })
}

fn primary_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)PRIMARY\s+KEY\s*\(([^)]*)\)").unwrap())
}

/// Returns the set of columns participating in the table's primary key,
/// whether declared inline (`col INTEGER PRIMARY KEY`) or as a
/// table-level constraint (`PRIMARY KEY(a, b)`).
pub fn primary_key_columns(sql: &str) -> Vec<String> {
    let Some(body) = extract_body(sql) else {
        return Vec::new();
    };

    let mut pk = Vec::new();
    for def in split_body(body) {
        if is_table_constraint(&def) {
            if let Some(caps) = primary_key_regex().captures(&def) {
                for col in caps[1].split(',') {
                    pk.push(quoted_or_bare_identifier(col));
                }
            }
            continue;
        }
        if def.to_ascii_uppercase().contains("PRIMARY KEY") {
            if let Some(name) = def.split_whitespace().next() {
                pk.push(quoted_or_bare_identifier(name));
            }
        }
    }
    pk
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names_simple() {
        let sql = "CREATE TABLE t1(a INT PRIMARY KEY, b INT, c INT)";
        assert_eq!(column_names(sql), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_column_names_skips_table_constraints() {
        let sql = "CREATE TABLE t1(a, b, PRIMARY KEY(a))";
        assert_eq!(column_names(sql), vec!["a", "b"]);
    }

    #[test]
    fn test_declared_collation_inline() {
        let sql = "CREATE TABLE t1(a TEXT PRIMARY KEY COLLATE NOCASE, b TEXT)";
        assert_eq!(declared_collation(sql, "a"), Some("NOCASE".to_string()));
        assert_eq!(declared_collation(sql, "b"), None);
    }

    #[test]
    fn test_primary_key_inline() {
        let sql = "CREATE TABLE t1(a INT PRIMARY KEY, b INT)";
        assert_eq!(primary_key_columns(sql), vec!["a"]);
    }

    #[test]
    fn test_primary_key_table_level() {
        let sql = "CREATE TABLE t1(a, b, PRIMARY KEY(a))";
        assert_eq!(primary_key_columns(sql), vec!["a"]);
    }

    #[test]
    fn test_nested_parens_do_not_split_check_clause() {
        let sql = "CREATE TABLE t1(a INT PRIMARY KEY, b INT CHECK (b IN (1, 2)))";
        assert_eq!(column_names(sql), vec!["a", "b"]);
    }
}
