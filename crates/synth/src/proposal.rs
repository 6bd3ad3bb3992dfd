//! Per-mask candidate proposals: column selection, rendering, and naming.

use advisor_core::schema::Table;
use advisor_core::{hash8, CandidateColumn, CandidateIndex, Constraint, Scan};

/// A structural candidate before it has been named or checked for
/// subsumption: a leading "key" prefix (the deduplicated, mask-filtered
/// equality set `E_µ`) followed by a trailing suffix (`O`, or a single
/// range constraint when `O` is empty). The split between `leading` and
/// `trailing` is exactly the split the subsumption check in §4.4 treats
/// differently: the leading columns may match an existing index's prefix
/// in any order, the trailing columns must match in order.
#[derive(Clone, Debug)]
pub struct Proposal {
    pub leading: Vec<Constraint>,
    pub trailing: Vec<Constraint>,
}

impl Proposal {
    /// All key columns, leading followed by trailing, in final index order.
    pub fn all_columns(&self) -> impl Iterator<Item = &Constraint> {
        self.leading.iter().chain(self.trailing.iter())
    }
}

/// Builds the proposals for one dependency-mask value `µ`, per §4.4 steps
/// 1–3.
pub fn propose_for_mask(scan: &Scan, mask: u64) -> Vec<Proposal> {
    let mut leading: Vec<Constraint> = Vec::new();
    for c in scan.equality() {
        if c.dependency_mask() & mask == c.dependency_mask() {
            if !leading.iter().any(|e| e.column_index() == c.column_index()) {
                leading.push(c.clone());
            }
        }
    }

    let orderby: Vec<Constraint> = scan.orderby().to_vec();

    let mut proposals = Vec::new();

    // Step 2: E_µ followed by O as trailing columns, even when both are
    // empty — the caller filters out the fully-empty case.
    if !leading.is_empty() || !orderby.is_empty() {
        proposals.push(Proposal {
            leading: leading.clone(),
            trailing: orderby.clone(),
        });
    }

    // Step 3: only when O is empty, one extra candidate per qualifying
    // range constraint not already in E_µ.
    if orderby.is_empty() {
        for r in scan.range() {
            if r.dependency_mask() & mask != r.dependency_mask() {
                continue;
            }
            if leading.iter().any(|e| e.column_index() == r.column_index()) {
                continue;
            }
            proposals.push(Proposal {
                leading: leading.clone(),
                trailing: vec![r.clone()],
            });
        }
    }

    proposals
}

/// Renders one key column as `name [COLLATE coll] [DESC]`.
fn render_column(table: &Table, c: &Constraint) -> String {
    let column = table
        .column(c.column_index())
        .expect("constraint column_index must be in range for its table");
    let mut out = column.name().to_string();
    if column.overrides_collation(c.collation()) {
        out.push_str(" COLLATE ");
        out.push_str(c.collation());
    }
    if c.descending() {
        out.push_str(" DESC");
    }
    out
}

/// Renders the full column-definition string used both for the `CREATE
/// INDEX` statement and as the fingerprint input for naming.
pub fn render_column_list(table: &Table, proposal: &Proposal) -> String {
    proposal
        .all_columns()
        .map(|c| render_column(table, c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Finishes a structural proposal into a named [`CandidateIndex`], per
/// §4.4's naming rule: `<table>_idx_<hash8>` where `hash8` hashes the
/// rendered column-definition string.
pub fn name_and_render(table: &Table, proposal: &Proposal) -> CandidateIndex {
    let column_list = render_column_list(table, proposal);
    let name = format!("{}_idx_{}", table.name(), hash8(&column_list));
    let create_sql = format!("CREATE INDEX {} ON {}({})", name, table.name(), column_list);

    let columns = proposal
        .all_columns()
        .map(|c| {
            let column = table.column(c.column_index()).expect("in-range column");
            let collation_override = column
                .overrides_collation(c.collation())
                .then(|| c.collation().to_string());
            CandidateColumn {
                column_index: c.column_index(),
                collation_override,
                descending: c.descending(),
            }
        })
        .collect();

    CandidateIndex::new(name, table.name(), columns, create_sql)
}
