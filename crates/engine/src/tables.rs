//! FROM-clause table detection and dependency-mask bit assignment.
//!
//! `rusqlite`'s public `vtab` API reports, per constraint, only the
//! constrained column and the comparison operator — not which other
//! FROM-clause table supplies the right-hand side of an equality
//! predicate. The real `sqlite3expert.c` gets this for free from SQLite's
//! internal join-order enumerator; a `vtab`-based implementation cannot
//! observe it directly.
//!
//! The documented simplification: before preparing a statement, scan its
//! SQL text for mentions of every table name known to the catalog and
//! assign each a stable bit in appearance order. Every equality
//! constraint recorded while preparing that statement is then given a
//! `dependency_mask` equal to the OR of every *other* referenced table's
//! bit — a conservative over-approximation of "this predicate might
//! depend on any of the other tables in the join", which is exact for the
//! single-table case (mask 0, matching every scenario in spec.md §8 that
//! has no join) and correct enough to produce the right dependency-closure
//! candidates for a two-table equi-join (scenario S5).

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn table_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap())
}

/// Returns the subset of `known_tables` that appear (as a whole word) in
/// `sql`, in first-occurrence order.
pub fn referenced_tables(sql: &str, known_tables: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for m in table_name_regex().find_iter(sql) {
        let word = m.as_str();
        for t in known_tables {
            if t.eq_ignore_ascii_case(word) && !seen.iter().any(|s: &String| s == t) {
                seen.push(t.clone());
            }
        }
    }
    seen
}

/// A stable bit assignment for the tables referenced by one statement.
#[derive(Clone, Debug, Default)]
pub struct TableBits {
    bits: HashMap<String, u64>,
}

impl TableBits {
    /// Assigns bit `i` to the `i`-th table in `referenced`. Caps at 63
    /// tables (matching `dependency_mask`'s `u64` width); any table beyond
    /// that shares the last bit, which only widens the over-approximation
    /// further and never drops a real dependency.
    pub fn assign(referenced: &[String]) -> Self {
        let mut bits = HashMap::new();
        for (i, table) in referenced.iter().enumerate() {
            let shift = i.min(63) as u32;
            bits.insert(table.clone(), 1u64 << shift);
        }
        Self { bits }
    }

    /// Returns this table's own bit, or 0 if it was not part of the
    /// assignment (single-table statements all resolve to mask 0).
    pub fn own_bit(&self, table: &str) -> u64 {
        self.bits.get(table).copied().unwrap_or(0)
    }

    /// Returns the dependency mask to attach to an equality constraint on
    /// `table`: the OR of every *other* referenced table's bit.
    pub fn dependency_mask_for(&self, table: &str) -> u64 {
        let own = self.own_bit(table);
        self.bits.values().fold(0u64, |acc, &b| acc | b) & !own
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_table_statement_has_zero_mask() {
        let known = vec!["t1".to_string()];
        let sql = "SELECT * FROM t1 WHERE b = ?";
        let referenced = referenced_tables(sql, &known);
        assert_eq!(referenced, vec!["t1".to_string()]);
        let bits = TableBits::assign(&referenced);
        assert_eq!(bits.dependency_mask_for("t1"), 0);
    }

    #[test]
    fn test_two_table_join_gives_nonzero_cross_mask() {
        let known = vec!["t1".to_string(), "t2".to_string()];
        let sql = "SELECT * FROM t1, t2 WHERE t1.x = t2.y";
        let referenced = referenced_tables(sql, &known);
        assert_eq!(referenced.len(), 2);
        let bits = TableBits::assign(&referenced);
        assert_ne!(bits.dependency_mask_for("t1"), 0);
        assert_ne!(bits.dependency_mask_for("t2"), 0);
        assert_ne!(bits.own_bit("t1"), bits.own_bit("t2"));
    }

    #[test]
    fn test_unreferenced_table_has_no_bit() {
        let known = vec!["t1".to_string()];
        let bits = TableBits::assign(&known);
        assert_eq!(bits.dependency_mask_for("missing"), 0);
    }
}
