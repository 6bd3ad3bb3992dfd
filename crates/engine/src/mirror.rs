//! The Schema Mirror (§4.2): a scratch in-memory database holding the
//! user schema's `CREATE VIEW`s verbatim and the user schema's base
//! tables re-expressed as stub virtual tables (see [`crate::stub`]).

use std::cell::RefCell;
use std::rc::Rc;

use advisor_core::{Error, Result, Scan};
use rusqlite::Connection;

use crate::ddl::{self, SchemaObject};
use crate::stub::{ScanSink, StubTable};
use crate::tables::{self, TableBits};

/// Reads every object in `sqlite_master` carrying DDL text.
fn list_schema_objects(conn: &Connection) -> Result<Vec<SchemaObject>> {
    let mut stmt = conn
        .prepare("SELECT type, name, sql FROM sqlite_master WHERE sql IS NOT NULL")
        .map_err(|e| Error::setup_failed(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(SchemaObject {
                kind: row.get(0)?,
                name: row.get(1)?,
                sql: row.get(2)?,
            })
        })
        .map_err(|e| Error::setup_failed(e.to_string()))?;

    let mut objects = Vec::new();
    for row in rows {
        objects.push(row.map_err(|e| Error::setup_failed(e.to_string()))?);
    }
    Ok(objects)
}

/// Owns the mirror connection, the shared scan sink, and the set of
/// table names the mirror knows about (needed to approximate per-scan
/// dependency masks — see [`crate::tables`]).
pub struct Mirror {
    conn: Connection,
    sink: Rc<RefCell<ScanSink>>,
    known_tables: Vec<String>,
}

impl Mirror {
    /// Opens a fresh mirror and copies the user schema into it: base
    /// tables become stub virtual tables, views are replayed verbatim,
    /// everything under the engine's reserved `sqlite_%` prefix is
    /// skipped.
    pub fn open(user_db: &Connection) -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| Error::setup_failed(e.to_string()))?;
        let sink = ScanSink::shared();

        conn.create_module::<StubTable>(
            "advisor_stub",
            rusqlite::vtab::read_only_module::<StubTable>(),
            Some(sink.clone()),
        )
        .map_err(|e| Error::setup_failed(e.to_string()))?;

        let objects = list_schema_objects(user_db)?;
        let mut known_tables = Vec::new();

        for object in &objects {
            if ddl::is_reserved(&object.name) {
                continue;
            }
            match object.kind.as_str() {
                "table" => {
                    let columns = ddl::column_names(&object.sql);
                    // Each entry carries "name:collation" so the stub
                    // table can fall back to a column's true declared
                    // collation for `ORDER BY` terms, which SQLite gives
                    // the planner no `sqlite3_vtab_collation`-style way
                    // to report (see crate::stub).
                    let column_list = columns
                        .iter()
                        .map(|c| {
                            let collation = ddl::declared_collation(&object.sql, c)
                                .unwrap_or_else(|| "BINARY".to_string());
                            format!("{c}:{collation}")
                        })
                        .collect::<Vec<_>>()
                        .join(", ");
                    let install = format!(
                        "CREATE VIRTUAL TABLE \"{}\" USING advisor_stub('{}')",
                        object.name, column_list
                    );
                    conn.execute_batch(&install)
                        .map_err(|e| Error::setup_failed(e.to_string()))?;
                    known_tables.push(object.name.clone());
                }
                "view" => {
                    conn.execute_batch(&object.sql)
                        .map_err(|e| Error::setup_failed(e.to_string()))?;
                }
                _ => {}
            }
        }

        Ok(Self {
            conn,
            sink,
            known_tables,
        })
    }

    /// Returns the mirror's live connection (used by the Plan Evaluator
    /// and Candidate Synthesizer to run `EXPLAIN` and `CREATE INDEX`).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns every base-table name the mirror knows about.
    pub fn known_tables(&self) -> &[String] {
        &self.known_tables
    }

    /// Prepares `sql` against the mirror, triggering `xBestIndex` on
    /// every referenced stub table, and returns the scans it recorded in
    /// planner call order. Fails with `ParseError` if the statement does
    /// not prepare (e.g. it references a table absent from the schema).
    pub fn prepare_and_extract(&self, sql: &str) -> Result<Vec<Scan>> {
        let referenced = tables::referenced_tables(sql, &self.known_tables);
        self.sink.borrow_mut().table_bits = TableBits::assign(&referenced);
        self.sink.borrow_mut().drain();

        let _stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| Error::parse_error(e.to_string()))?;

        Ok(self.sink.borrow_mut().drain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_db_with_schema(sql: &str) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        conn
    }

    #[test]
    fn test_open_copies_base_table_as_stub() {
        let user_db = user_db_with_schema("CREATE TABLE t1(a INTEGER PRIMARY KEY, b INTEGER)");
        let mirror = Mirror::open(&user_db).unwrap();
        assert_eq!(mirror.known_tables(), &["t1".to_string()]);
    }

    #[test]
    fn test_prepare_and_extract_records_equality_scan() {
        let user_db = user_db_with_schema("CREATE TABLE t1(a INTEGER PRIMARY KEY, b INTEGER, c INTEGER)");
        let mirror = Mirror::open(&user_db).unwrap();
        let scans = mirror
            .prepare_and_extract("SELECT * FROM t1 WHERE b = 1")
            .unwrap();
        assert_eq!(scans.len(), 1);
        assert_eq!(scans[0].equality().len(), 1);
    }

    #[test]
    fn test_prepare_rejects_unknown_table() {
        let user_db = user_db_with_schema("CREATE TABLE t1(a INTEGER PRIMARY KEY)");
        let mirror = Mirror::open(&user_db).unwrap();
        let err = mirror.prepare_and_extract("SELECT * FROM missing").unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }

    #[test]
    fn test_orderby_on_nocase_column_carries_declared_collation() {
        let user_db = user_db_with_schema(
            "CREATE TABLE t1(a INTEGER PRIMARY KEY, b TEXT COLLATE NOCASE)",
        );
        let mirror = Mirror::open(&user_db).unwrap();
        let scans = mirror
            .prepare_and_extract("SELECT * FROM t1 ORDER BY b")
            .unwrap();
        assert_eq!(scans.len(), 1);
        assert_eq!(scans[0].orderby().len(), 1);
        assert_eq!(scans[0].orderby()[0].collation(), "NOCASE");
    }

    #[test]
    fn test_equality_on_default_collation_column_is_not_spuriously_overridden() {
        let user_db = user_db_with_schema(
            "CREATE TABLE t1(a INTEGER PRIMARY KEY, b TEXT COLLATE NOCASE)",
        );
        let mirror = Mirror::open(&user_db).unwrap();
        let scans = mirror
            .prepare_and_extract("SELECT * FROM t1 WHERE b = 'x'")
            .unwrap();
        assert_eq!(scans.len(), 1);
        // The planner applies b's own declared collation (NOCASE) to an
        // equality predicate with no explicit COLLATE override.
        assert_eq!(scans[0].equality()[0].collation(), "NOCASE");
    }
}
