//! The Plan Evaluator (§4.5): runs `EXPLAIN QUERY PLAN` against the
//! mirror and scans the plan text for index usage.
//!
//! SQLite's own `EXPLAIN QUERY PLAN` pragma yields rows shaped
//! `(id, parent, notused, detail)`. spec.md's plan-dump contract names
//! the same four columns `(select_id, order, from_index, detail_text)`;
//! the mapping is a rename, not a reinterpretation: `order := parent`,
//! `from_index := notused`. Both shapes carry the same four columns in
//! the same positions, so the substring scan for index usage needs no
//! adjustment.

use std::collections::BTreeSet;

use advisor_core::{Error, Result};
use rusqlite::Connection;

const USING_INDEX: &str = " USING INDEX ";
const USING_COVERING_INDEX: &str = " USING COVERING INDEX ";

/// One row of the plan dump, already formatted for `Statement::plan_text`.
pub struct PlanRow {
    pub select_id: i64,
    pub order: i64,
    pub from_index: i64,
    pub detail_text: String,
}

impl PlanRow {
    fn formatted_line(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.select_id, self.order, self.from_index, self.detail_text
        )
    }
}

/// Extracts the index name following `marker` in `detail`, if present:
/// the token up to the next space-before-`(` or end of string.
fn extract_index_name(detail: &str, marker: &str) -> Option<String> {
    let start = detail.find(marker)? + marker.len();
    let rest = &detail[start..];
    let end = rest.find(" (").unwrap_or(rest.len());
    let name = rest[..end].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Runs `EXPLAIN QUERY PLAN` for `sql` against `conn` and returns each
/// plan-dump line (rendered per spec.md §4.5, one per row, without a
/// trailing newline — callers append via
/// [`advisor_core::Statement::push_plan_line`]) plus the set of
/// candidate-index names (restricted to `candidate_names`) that the plan
/// mentions via `USING INDEX` / `USING COVERING INDEX`.
pub fn evaluate(
    conn: &Connection,
    sql: &str,
    candidate_names: &BTreeSet<String>,
) -> Result<(Vec<String>, BTreeSet<String>)> {
    let mut stmt = conn
        .prepare(&format!("EXPLAIN QUERY PLAN {sql}"))
        .map_err(|e| Error::plan_error(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| {
            Ok(PlanRow {
                select_id: row.get(0)?,
                order: row.get(1)?,
                from_index: row.get(2)?,
                detail_text: row.get(3)?,
            })
        })
        .map_err(|e| Error::plan_error(e.to_string()))?;

    let mut lines = Vec::new();
    let mut chosen = BTreeSet::new();

    for row in rows {
        let row = row.map_err(|e| Error::plan_error(e.to_string()))?;
        lines.push(row.formatted_line());

        for marker in [USING_INDEX, USING_COVERING_INDEX] {
            if let Some(name) = extract_index_name(&row.detail_text, marker) {
                if candidate_names.contains(&name) {
                    chosen.insert(name);
                }
            }
        }
    }

    Ok((lines, chosen))
}
