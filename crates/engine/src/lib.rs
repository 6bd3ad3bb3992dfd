//! SQLite-backed implementation of the Schema Mirror, Catalog Loader, and
//! Plan Evaluator (spec.md §4.2, §4.3, §4.5), embedding SQLite via
//! `rusqlite`.

mod catalog;
mod ddl;
mod eval_mirror;
mod mirror;
mod plan;
mod split;
mod stub;
mod tables;

pub use catalog::{load_catalog, load_table};
pub use eval_mirror::{EvalMirror, ExistingIndexColumn, ExistingIndexInfo};
pub use mirror::Mirror;
pub use plan::evaluate as evaluate_plan;
pub use split::split_statements;
pub use tables::{referenced_tables, TableBits};
