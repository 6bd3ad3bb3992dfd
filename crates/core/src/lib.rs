//! Core data model for the index advisor.
//!
//! This crate provides the foundational types shared by every other crate
//! in the workspace:
//!
//! - `schema`: catalog-facing `Column` and `Table`, as reported by the
//!   Catalog Loader.
//! - `Constraint`: a single extractable term from a `WHERE` or `ORDER BY`
//!   clause.
//! - `Scan`: one per-table access within a prepared statement.
//! - `Statement`: a submitted workload statement and its report state.
//! - `candidate`: synthesized `CandidateIndex` definitions and the
//!   deterministic naming hash.
//! - `Error`: the error kinds surfaced across the pipeline.
//!
//! # Example
//!
//! ```rust
//! use advisor_core::schema::{Column, Table};
//! use advisor_core::{Constraint, Scan};
//! use advisor_core::types::ConstraintKind;
//!
//! let table = Table::new(
//!     "t1",
//!     vec![
//!         Column::new("a", "BINARY", true),
//!         Column::new("b", "BINARY", false),
//!     ],
//! );
//!
//! let mut scan = Scan::new("t1", 1);
//! scan.push_equality(Constraint::new(1, "BINARY", ConstraintKind::Equality, 0, false));
//!
//! assert_eq!(table.name(), "t1");
//! assert_eq!(scan.equality().len(), 1);
//! ```

mod candidate;
mod constraint;
mod error;
mod scan;
pub mod schema;
mod statement;
pub mod types;

pub use candidate::{hash8, shift_add_hash, CandidateColumn, CandidateIndex};
pub use constraint::Constraint;
pub use error::{Error, Result};
pub use scan::Scan;
pub use statement::Statement;
