//! Table definition for the index advisor's catalog.

use super::column::Column;

/// A table as reported by the Catalog Loader: a name and an ordinal
/// sequence of columns. Built once per referenced table, before synthesis
/// begins (§3 invariant: every Scan references a Table present in the
/// catalog before synthesis begins).
#[derive(Clone, Debug)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
}

impl Table {
    /// Creates a table from its name and ordinal column sequence.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns in ordinal order.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the column at `index`, if in range.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Returns the ordinal index of the column named `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Returns whether at least one column is a primary-key member.
    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(Column::is_primary_key_member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::new(
            "t1",
            vec![
                Column::new("a", "BINARY", true),
                Column::new("b", "BINARY", false),
                Column::new("c", "NOCASE", false),
            ],
        )
    }

    #[test]
    fn test_table_column_lookup() {
        let t = sample_table();
        assert_eq!(t.column_index("b"), Some(1));
        assert_eq!(t.column_index("missing"), None);
        assert_eq!(t.column(2).map(Column::name), Some("c"));
    }

    #[test]
    fn test_table_has_primary_key() {
        assert!(sample_table().has_primary_key());
        let no_pk = Table::new("t2", vec![Column::new("x", "BINARY", false)]);
        assert!(!no_pk.has_primary_key());
    }
}
