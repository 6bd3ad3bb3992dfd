//! Subsumption check of §4.4: is a proposed candidate already covered by an
//! index that exists on the mirror (whether user-defined, or installed by
//! an earlier candidate in the same `analyze()` pass)?

use advisor_core::Constraint;

/// One key column of an index already present on the mirror.
#[derive(Clone, Debug)]
pub struct ExistingIndexColumn {
    pub column_index: usize,
    pub collation: String,
}

/// A snapshot of an index already present on the mirror.
#[derive(Clone, Debug)]
pub struct ExistingIndex {
    pub name: String,
    pub table: String,
    pub columns: Vec<ExistingIndexColumn>,
}

fn collation_matches(declared: &str, other: &str) -> bool {
    declared.eq_ignore_ascii_case(other)
}

/// Returns true when `existing` already provides everything `leading` +
/// `trailing` would provide: its first `leading.len()` columns match
/// `leading` as a *set* (column index + collation, any order), and the
/// columns immediately following match `trailing` *in order* (column
/// index + collation). Column order within `trailing` matters because a
/// trailing suffix serves either an `ORDER BY` or a range scan, both of
/// which are order-sensitive; the leading set does not, because equality
/// predicates can be satisfied in any column order.
fn covers(existing: &ExistingIndex, leading: &[Constraint], trailing: &[Constraint]) -> bool {
    let total = leading.len() + trailing.len();
    if existing.columns.len() < total {
        return false;
    }

    let prefix = &existing.columns[..leading.len()];
    let mut remaining: Vec<&ExistingIndexColumn> = prefix.iter().collect();
    for c in leading {
        let pos = remaining.iter().position(|e| {
            e.column_index == c.column_index() && collation_matches(&e.collation, c.collation())
        });
        match pos {
            Some(i) => {
                remaining.remove(i);
            }
            None => return false,
        }
    }

    let suffix = &existing.columns[leading.len()..total];
    for (e, c) in suffix.iter().zip(trailing.iter()) {
        if e.column_index != c.column_index() || !collation_matches(&e.collation, c.collation()) {
            return false;
        }
    }

    true
}

/// Returns true when any index in `existing` on `table` already subsumes
/// this proposal.
pub fn is_subsumed(
    table: &str,
    leading: &[Constraint],
    trailing: &[Constraint],
    existing: &[ExistingIndex],
) -> bool {
    existing
        .iter()
        .filter(|e| e.table == table)
        .any(|e| covers(e, leading, trailing))
}
