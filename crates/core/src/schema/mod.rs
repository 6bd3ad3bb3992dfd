//! Schema module for the index advisor.
//!
//! Holds the catalog-facing shape of the user's schema: columns and tables
//! as reported by the Catalog Loader (§4.3 of the design), independent of
//! how the workload's scans reference them.

mod column;
mod table;

pub use column::Column;
pub use table::Table;
