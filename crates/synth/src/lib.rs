//! Candidate index synthesis (§4.4): turns one table's [`Scan`] into the
//! set of candidate indexes worth trying against the plan evaluator.
//!
//! The pipeline is: compute the dependency-mask closure over the scan's
//! equality set, propose a structural candidate for each mask, collapse
//! proposals that render identically, then drop anything already
//! subsumed by an index present on the mirror.

mod closure;
mod proposal;
mod subsumption;

pub use closure::dependency_closure;
pub use proposal::{name_and_render, propose_for_mask, render_column_list, Proposal};
pub use subsumption::{is_subsumed, ExistingIndex, ExistingIndexColumn};

use advisor_core::schema::Table;
use advisor_core::{CandidateIndex, Scan};

/// Default cap on distinct dependency masks before falling back to the
/// OR-fold approximation (§9).
pub const DEFAULT_MAX_DISTINCT_MASKS: usize = 12;

/// Synthesizes the candidate indexes for one scan, against `table`'s
/// schema and the indexes already known to exist (`existing`, which
/// includes both user-defined indexes and any candidate installed by an
/// earlier scan within the same `analyze()` pass).
pub fn synthesize(
    table: &Table,
    scan: &Scan,
    existing: &[ExistingIndex],
    max_distinct_masks: usize,
) -> Vec<CandidateIndex> {
    let closure = dependency_closure(scan.equality(), max_distinct_masks);

    let mut seen_renderings: Vec<String> = Vec::new();
    let mut survivors: Vec<CandidateIndex> = Vec::new();

    for mask in closure {
        for proposal in propose_for_mask(scan, mask) {
            if proposal.leading.is_empty() && proposal.trailing.is_empty() {
                continue;
            }

            let rendering = render_column_list(table, &proposal);
            if seen_renderings.contains(&rendering) {
                continue;
            }

            if is_subsumed(table.name(), &proposal.leading, &proposal.trailing, existing) {
                continue;
            }

            seen_renderings.push(rendering);
            survivors.push(name_and_render(table, &proposal));
        }
    }

    survivors
}
