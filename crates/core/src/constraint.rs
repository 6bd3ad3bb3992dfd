//! A single extractable term from a `WHERE` or `ORDER BY` clause.

use crate::types::ConstraintKind;

/// One term extractable from a scan: an equality predicate, a range
/// predicate, or an `ORDER BY` term, tied to one column of the owning
/// table.
///
/// `column_index` indexes into the owning [`crate::schema::Table`]'s column
/// sequence. `collation` is whatever collation the planner reports it would
/// apply — it may differ from the column's declared collation (S3 in the
/// test scenarios). `dependency_mask` is an opaque bitset naming the
/// FROM-clause tables this constraint's right-hand side depends on; see
/// the dependency-mask closure in the synthesizer. `descending` is only
/// meaningful for `ORDERBY` constraints.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    column_index: usize,
    collation: String,
    kind: ConstraintKind,
    dependency_mask: u64,
    descending: bool,
}

impl Constraint {
    /// Creates a new constraint.
    pub fn new(
        column_index: usize,
        collation: impl Into<String>,
        kind: ConstraintKind,
        dependency_mask: u64,
        descending: bool,
    ) -> Self {
        Self {
            column_index,
            collation: collation.into(),
            kind,
            dependency_mask,
            descending,
        }
    }

    /// Returns the index of the column this constraint refers to.
    #[inline]
    pub fn column_index(&self) -> usize {
        self.column_index
    }

    /// Returns the planner-reported collation for this constraint.
    #[inline]
    pub fn collation(&self) -> &str {
        &self.collation
    }

    /// Returns the constraint's kind (equality, range, or order-by).
    #[inline]
    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    /// Returns the dependency mask: which FROM-clause tables this
    /// constraint's right-hand side depends on.
    #[inline]
    pub fn dependency_mask(&self) -> u64 {
        self.dependency_mask
    }

    /// Returns whether this is a descending `ORDER BY` term. Meaningless
    /// for non-`ORDERBY` constraints.
    #[inline]
    pub fn descending(&self) -> bool {
        self.descending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_accessors() {
        let c = Constraint::new(2, "NOCASE", ConstraintKind::Equality, 0b10, false);
        assert_eq!(c.column_index(), 2);
        assert_eq!(c.collation(), "NOCASE");
        assert_eq!(c.kind(), ConstraintKind::Equality);
        assert_eq!(c.dependency_mask(), 0b10);
        assert!(!c.descending());
    }
}
