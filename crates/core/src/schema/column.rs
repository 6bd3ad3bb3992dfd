//! Column definition for the index advisor's catalog.

/// A single column as reported by the Catalog Loader.
///
/// `declared_collation` is whatever collation the engine's column-info
/// pragma reports for the column (empty declared collation is treated as
/// equal to the engine's default collation name for comparison purposes —
/// see [`Column::has_collation`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    name: String,
    declared_collation: String,
    is_primary_key_member: bool,
}

/// The collation name SQLite reports for columns with no explicit
/// `COLLATE` clause.
pub const DEFAULT_COLLATION: &str = "BINARY";

impl Column {
    /// Creates a new column. An empty `declared_collation` is normalized to
    /// [`DEFAULT_COLLATION`] so that every comparison downstream can assume
    /// a non-empty string.
    pub fn new(
        name: impl Into<String>,
        declared_collation: impl Into<String>,
        is_primary_key_member: bool,
    ) -> Self {
        let declared_collation = declared_collation.into();
        let declared_collation = if declared_collation.is_empty() {
            DEFAULT_COLLATION.to_string()
        } else {
            declared_collation
        };
        Self {
            name: name.into(),
            declared_collation,
            is_primary_key_member,
        }
    }

    /// Returns the column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the column's declared collation (never empty).
    #[inline]
    pub fn declared_collation(&self) -> &str {
        &self.declared_collation
    }

    /// Returns whether this column is part of the table's primary key.
    #[inline]
    pub fn is_primary_key_member(&self) -> bool {
        self.is_primary_key_member
    }

    /// Returns whether `collation` differs from this column's declared
    /// collation, case-insensitively. Used by the synthesizer to decide
    /// whether to emit an explicit `COLLATE` clause (§4.4).
    pub fn overrides_collation(&self, collation: &str) -> bool {
        let collation = if collation.is_empty() {
            DEFAULT_COLLATION
        } else {
            collation
        };
        !collation.eq_ignore_ascii_case(&self.declared_collation)
    }
}
