//! The evaluation mirror: a second in-memory database holding the user
//! schema replayed *verbatim* (real tables, real pre-existing indexes,
//! views), rather than the stub virtual tables `mirror::Mirror` uses for
//! scan extraction.
//!
//! `CREATE INDEX` cannot target a virtual table in SQLite, so the
//! Candidate Synthesizer's "install surviving candidates into the
//! mirror" step (§4.2, §4.4) and the Plan Evaluator's `EXPLAIN QUERY
//! PLAN` (§4.5) both need real, empty tables with the user's real
//! indexes already present — exactly what this second mirror provides.
//! The stub mirror and this one agree on schema; they differ only in
//! whether each base table is virtual (for capturing predicates) or real
//! (for carrying indexes and reporting plans).

use advisor_core::{Error, Result};
use rusqlite::Connection;

use crate::ddl;

/// One column of a pre-existing index, as reported by
/// `PRAGMA index_xinfo`.
#[derive(Clone, Debug)]
pub struct ExistingIndexColumn {
    pub column_index: usize,
    pub collation: String,
}

/// A pre-existing index on the evaluation mirror — either part of the
/// original user schema, or a candidate installed earlier in the same
/// `analyze()` pass.
#[derive(Clone, Debug)]
pub struct ExistingIndexInfo {
    pub name: String,
    pub table: String,
    pub columns: Vec<ExistingIndexColumn>,
}

/// Owns the evaluation mirror connection.
pub struct EvalMirror {
    conn: Connection,
}

impl EvalMirror {
    /// Opens a fresh evaluation mirror and replays every non-reserved
    /// `CREATE TABLE`, `CREATE INDEX`, and `CREATE VIEW` from `user_db`
    /// verbatim.
    pub fn open(user_db: &Connection) -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| Error::setup_failed(e.to_string()))?;

        let mut stmt = user_db
            .prepare(
                "SELECT type, name, sql FROM sqlite_master \
                 WHERE sql IS NOT NULL ORDER BY \
                 CASE type WHEN 'table' THEN 0 WHEN 'view' THEN 1 ELSE 2 END",
            )
            .map_err(|e| Error::setup_failed(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                let kind: String = row.get(0)?;
                let name: String = row.get(1)?;
                let sql: String = row.get(2)?;
                Ok((kind, name, sql))
            })
            .map_err(|e| Error::setup_failed(e.to_string()))?;

        for row in rows {
            let (_kind, name, sql) = row.map_err(|e| Error::setup_failed(e.to_string()))?;
            if ddl::is_reserved(&name) {
                continue;
            }
            conn.execute_batch(&sql)
                .map_err(|e| Error::setup_failed(e.to_string()))?;
        }

        Ok(Self { conn })
    }

    /// Returns the mirror's live connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Executes a candidate's `CREATE INDEX` statement against the
    /// mirror.
    pub fn install_candidate(&self, create_sql: &str) -> Result<()> {
        self.conn
            .execute_batch(create_sql)
            .map_err(|e| Error::create_index_failed(e.to_string()))
    }

    /// Returns the ordinal index of `table`'s sole primary-key column when
    /// it is a rowid alias (a lone `INTEGER PRIMARY KEY` column on a
    /// rowid table), or `None` otherwise. SQLite never materializes a real
    /// index object for this column — `PRAGMA index_list` has nothing to
    /// say about it — but any equality lookup on it is already as fast as
    /// an index lookup gets, since it *is* the table's own rowid b-tree.
    fn rowid_alias_column(&self, table: &str) -> Result<Option<usize>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info(\"{table}\")"))
            .map_err(|e| Error::catalog_error(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                let cid: i64 = row.get("cid")?;
                let col_type: String = row.get("type")?;
                let pk: i64 = row.get("pk")?;
                Ok((cid, col_type, pk))
            })
            .map_err(|e| Error::catalog_error(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::catalog_error(e.to_string()))?;

        let pk_hits: Vec<(i64, String)> = rows
            .into_iter()
            .filter(|(_, _, pk)| *pk != 0)
            .map(|(cid, col_type, _)| (cid, col_type))
            .collect();
        let [(cid, col_type)] = &pk_hits[..] else {
            return Ok(None);
        };
        if !col_type.eq_ignore_ascii_case("INTEGER") {
            return Ok(None);
        }

        // A `WITHOUT ROWID` table has no rowid alias even for a lone
        // `INTEGER PRIMARY KEY` column; probing for the pseudo-column is
        // more robust than scraping `WITHOUT ROWID` out of the DDL text.
        let has_rowid = self
            .conn
            .prepare(&format!("SELECT rowid FROM \"{table}\" LIMIT 0"))
            .is_ok();
        if !has_rowid {
            return Ok(None);
        }

        Ok(Some(*cid as usize))
    }

    /// Returns every index presently visible on `table` (original schema
    /// indexes plus anything installed by `install_candidate` so far, plus
    /// a synthetic entry for an intrinsic rowid-alias primary key), via
    /// `PRAGMA index_list` / `PRAGMA index_xinfo`.
    pub fn existing_indexes(&self, table: &str) -> Result<Vec<ExistingIndexInfo>> {
        let mut list_stmt = self
            .conn
            .prepare(&format!("PRAGMA index_list(\"{table}\")"))
            .map_err(|e| Error::catalog_error(e.to_string()))?;
        let index_names: Vec<String> = list_stmt
            .query_map([], |row| row.get::<_, String>("name"))
            .map_err(|e| Error::catalog_error(e.to_string()))?
            .collect::<rusqlite::Result<_>>()
            .map_err(|e| Error::catalog_error(e.to_string()))?;

        let mut indexes = Vec::new();
        for index_name in index_names {
            let mut xinfo_stmt = self
                .conn
                .prepare(&format!("PRAGMA index_xinfo(\"{index_name}\")"))
                .map_err(|e| Error::catalog_error(e.to_string()))?;
            let rows = xinfo_stmt
                .query_map([], |row| {
                    let key: i64 = row.get("key")?;
                    let cid: i64 = row.get("cid")?;
                    let coll: String = row.get("coll")?;
                    Ok((key, cid, coll))
                })
                .map_err(|e| Error::catalog_error(e.to_string()))?;

            let mut columns = Vec::new();
            for row in rows {
                let (key, cid, coll) = row.map_err(|e| Error::catalog_error(e.to_string()))?;
                if key != 1 || cid < 0 {
                    continue;
                }
                columns.push(ExistingIndexColumn {
                    column_index: cid as usize,
                    collation: coll,
                });
            }

            indexes.push(ExistingIndexInfo {
                name: index_name,
                table: table.to_string(),
                columns,
            });
        }

        if let Some(column_index) = self.rowid_alias_column(table)? {
            indexes.push(ExistingIndexInfo {
                name: format!("sqlite_rowid_{table}"),
                table: table.to_string(),
                columns: vec![ExistingIndexColumn {
                    column_index,
                    collation: "BINARY".to_string(),
                }],
            });
        }

        Ok(indexes)
    }
}
