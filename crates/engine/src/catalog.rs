//! The Catalog Loader (§4.3): builds a [`Table`] for each scan's
//! referenced table by combining `PRAGMA table_info` with the
//! declared-collation fallback of [`crate::ddl`].

use std::collections::BTreeMap;

use advisor_core::schema::{Column, Table};
use advisor_core::{Error, Result};
use rusqlite::Connection;

fn table_sql(conn: &Connection, table: &str) -> Result<String> {
    conn.query_row(
        "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get::<_, String>(0),
    )
    .map_err(|e| Error::catalog_error(format!("no such table {table:?}: {e}")))
}

/// Loads the [`Table`] definition for `table_name` against `mirror`,
/// using `PRAGMA table_info` for ordinal column names and the table's
/// own `sql` text for collation and primary-key membership. Fails with
/// `NoPrimaryKey` if no column is flagged as part of the primary key.
pub fn load_table(conn: &Connection, table_name: &str) -> Result<Table> {
    let sql = table_sql(conn, table_name)?;
    let pk_columns = super::ddl::primary_key_columns(&sql);

    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info(\"{table_name}\")"))
        .map_err(|e| Error::catalog_error(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| {
            let name: String = row.get("name")?;
            let pk: i64 = row.get("pk")?;
            Ok((name, pk))
        })
        .map_err(|e| Error::catalog_error(e.to_string()))?;

    let mut columns = Vec::new();
    let mut has_pk = false;
    for row in rows {
        let (name, pk) = row.map_err(|e| Error::catalog_error(e.to_string()))?;
        let is_pk = pk != 0 || pk_columns.iter().any(|c| c.eq_ignore_ascii_case(&name));
        has_pk |= is_pk;
        let collation = super::ddl::declared_collation(&sql, &name).unwrap_or_default();
        columns.push(Column::new(name, collation, is_pk));
    }

    if !has_pk {
        return Err(Error::no_primary_key(table_name));
    }

    Ok(Table::new(table_name, columns))
}

/// Loads every table referenced by `table_names`, deduplicated, into a
/// name → [`Table`] catalog.
pub fn load_catalog(
    conn: &Connection,
    table_names: impl IntoIterator<Item = String>,
) -> Result<BTreeMap<String, Table>> {
    let mut catalog = BTreeMap::new();
    for name in table_names {
        if catalog.contains_key(&name) {
            continue;
        }
        let table = load_table(conn, &name)?;
        catalog.insert(name, table);
    }
    Ok(catalog)
}
