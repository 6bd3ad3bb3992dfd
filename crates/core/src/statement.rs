//! A single submitted workload statement.

use std::collections::BTreeSet;

/// A workload statement, tracked from `submit_sql` through `analyze` and
/// `report`. `id` is assigned in insertion order starting at 0.
#[derive(Clone, Debug)]
pub struct Statement {
    id: u32,
    original_sql: String,
    chosen_indexes: BTreeSet<String>,
    plan_text: String,
}

impl Statement {
    /// Creates a new statement with empty `chosen_indexes` and `plan_text`,
    /// as it exists right after a successful `submit_sql` call, before
    /// `analyze` has run.
    pub fn new(id: u32, original_sql: impl Into<String>) -> Self {
        Self {
            id,
            original_sql: original_sql.into(),
            chosen_indexes: BTreeSet::new(),
            plan_text: String::new(),
        }
    }

    /// Returns the statement's sequential id.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the original submitted SQL text.
    #[inline]
    pub fn original_sql(&self) -> &str {
        &self.original_sql
    }

    /// Returns the set of candidate-index names the planner chose for this
    /// statement.
    #[inline]
    pub fn chosen_indexes(&self) -> &BTreeSet<String> {
        &self.chosen_indexes
    }

    /// Returns the recorded plan-dump text.
    #[inline]
    pub fn plan_text(&self) -> &str {
        &self.plan_text
    }

    /// Records that the planner chose `index_name` for this statement.
    pub fn mark_chosen(&mut self, index_name: impl Into<String>) {
        self.chosen_indexes.insert(index_name.into());
    }

    /// Appends a line to the recorded plan-dump text.
    pub fn push_plan_line(&mut self, line: &str) {
        self.plan_text.push_str(line);
        self.plan_text.push('\n');
    }

    /// Renders the INDEXES report for this statement (§4.5): one `CREATE
    /// INDEX` line per chosen index (in `create_sql` form, supplied by the
    /// caller via `candidate_sql`), or the fixed string when nothing was
    /// chosen.
    pub fn indexes_report<'a>(&self, candidate_sql: impl Fn(&str) -> Option<&'a str>) -> String {
        if self.chosen_indexes.is_empty() {
            return "(no new indexes)\n".to_string();
        }
        let mut out = String::new();
        for name in &self.chosen_indexes {
            if let Some(sql) = candidate_sql(name) {
                out.push_str(sql);
                out.push('\n');
            }
        }
        out
    }
}
