//! The Session object (§4.1, §3): owns the user db handle, both mirrors,
//! the catalog, and the append-only scan/statement/candidate lists.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use advisor_core::schema::Table;
use advisor_core::{CandidateIndex, Error, Result, Scan, Statement};
use advisor_engine::{EvalMirror, Mirror};
use rusqlite::{Connection, OpenFlags};

use crate::config::AdvisorConfig;
use crate::report::ReportKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionState {
    Extracting,
    Analyzed,
    Reporting,
    Poisoned,
}

/// The public entry point of the index advisor. Not `Sync`: it holds a
/// raw `rusqlite::Connection`, itself not `Sync`, so sharing one Session
/// across threads without external synchronization does not compile.
/// Per §5, callers must only ever drive a Session from one thread.
pub struct Session {
    user_db: Connection,
    extraction_mirror: Mirror,
    eval_mirror: Option<EvalMirror>,
    catalog: BTreeMap<String, Table>,
    scans: Vec<Scan>,
    statements: Vec<Statement>,
    candidates: Vec<CandidateIndex>,
    candidate_names: std::collections::BTreeSet<String>,
    state: SessionState,
    config: AdvisorConfig,
}

impl Session {
    /// Opens `db_path` read-only and builds a fresh extraction mirror
    /// from its schema. Fails with `SetupFailed` if the mirror cannot be
    /// built.
    pub fn create(db_path: impl AsRef<Path>, config: AdvisorConfig) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let user_db = Connection::open_with_flags(db_path, flags)
            .map_err(|e| Error::setup_failed(e.to_string()))?;
        user_db
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms as u64))
            .map_err(|e| Error::setup_failed(e.to_string()))?;

        Self::from_connection(user_db, config)
    }

    /// Builds a Session from an already-open connection (used by tests
    /// and by embedders that manage the connection themselves).
    pub fn from_connection(user_db: Connection, config: AdvisorConfig) -> Result<Self> {
        let extraction_mirror = Mirror::open(&user_db)?;
        Ok(Self {
            user_db,
            extraction_mirror,
            eval_mirror: None,
            catalog: BTreeMap::new(),
            scans: Vec::new(),
            statements: Vec::new(),
            candidates: Vec::new(),
            candidate_names: std::collections::BTreeSet::new(),
            state: SessionState::Extracting,
            config,
        })
    }

    /// Accepts one or more semicolon-separated statements. Each
    /// successfully prepared statement is appended (with a sequential
    /// id) and drives the Scan Extractor. If any statement in this call
    /// fails to prepare, every scan/statement appended by this call is
    /// rolled back and the error is returned; the Session remains
    /// `EXTRACTING`.
    #[tracing::instrument(skip(self, sql))]
    pub fn submit_sql(&mut self, sql: &str) -> Result<()> {
        if self.state != SessionState::Extracting {
            return Err(Error::MisuseError);
        }

        let scan_head = self.scans.len();
        let statement_head = self.statements.len();

        for statement_sql in advisor_engine::split_statements(sql) {
            match self.extraction_mirror.prepare_and_extract(&statement_sql) {
                Ok(new_scans) => {
                    let id = self.statements.len() as u32;
                    self.statements.push(Statement::new(id, statement_sql));
                    self.scans.extend(new_scans);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "submit_sql failed, rolling back this call");
                    self.scans.truncate(scan_head);
                    self.statements.truncate(statement_head);
                    return Err(err);
                }
            }
        }

        Ok(())
    }

    /// Transitions `EXTRACTING` → `ANALYZED`, running the Catalog
    /// Loader, Candidate Synthesizer, and Plan Evaluator in that order.
    /// On failure the Session becomes unusable except for `destroy` and
    /// `report`.
    #[tracing::instrument(skip(self))]
    pub fn analyze(&mut self) -> Result<()> {
        if self.state != SessionState::Extracting {
            return Err(Error::MisuseError);
        }

        match self.run_analysis() {
            Ok(()) => {
                self.state = SessionState::Analyzed;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "analyze failed, session poisoned");
                self.state = SessionState::Poisoned;
                Err(err)
            }
        }
    }

    fn run_analysis(&mut self) -> Result<()> {
        let mut table_names: Vec<String> = Vec::new();
        for scan in &self.scans {
            if !table_names.iter().any(|t| t == scan.table_ref()) {
                table_names.push(scan.table_ref().to_string());
            }
        }
        self.catalog = advisor_engine::load_catalog(&self.user_db, table_names)?;

        let eval_mirror = EvalMirror::open(&self.user_db)?;

        for scan in &self.scans {
            if scan.is_empty() {
                continue;
            }
            let table = self
                .catalog
                .get(scan.table_ref())
                .expect("scan's table is present in the catalog per the §3 invariant");

            let existing = eval_mirror
                .existing_indexes(table.name())?
                .into_iter()
                .map(|e| advisor_synth::ExistingIndex {
                    name: e.name,
                    table: e.table,
                    columns: e
                        .columns
                        .into_iter()
                        .map(|c| advisor_synth::ExistingIndexColumn {
                            column_index: c.column_index,
                            collation: c.collation,
                        })
                        .collect(),
                })
                .collect::<Vec<_>>();

            let proposed =
                advisor_synth::synthesize(table, scan, &existing, self.config.max_distinct_masks);

            for candidate in proposed {
                if self.candidate_names.contains(candidate.name()) {
                    tracing::debug!(name = candidate.name(), "duplicate candidate name, dropping");
                    continue;
                }
                eval_mirror.install_candidate(candidate.create_sql())?;
                self.candidate_names.insert(candidate.name().to_string());
                self.candidates.push(candidate);
            }
        }

        for statement in &mut self.statements {
            let (lines, chosen) = advisor_engine::evaluate_plan(
                eval_mirror.connection(),
                statement.original_sql(),
                &self.candidate_names,
            )?;
            for line in lines {
                statement.push_plan_line(&line);
            }
            for name in chosen {
                statement.mark_chosen(name);
            }
        }

        self.eval_mirror = Some(eval_mirror);
        Ok(())
    }

    /// Returns the number of statements submitted so far.
    pub fn statement_count(&self) -> u32 {
        self.statements.len() as u32
    }

    /// Returns the requested report, or `None` if `statement_id` is out
    /// of range or the Session has not reached `ANALYZED`.
    /// `ReportKind::Candidates` ignores `statement_id`.
    pub fn report(&mut self, statement_id: u32, kind: ReportKind) -> Option<String> {
        if !matches!(self.state, SessionState::Analyzed | SessionState::Reporting) {
            return None;
        }
        self.state = SessionState::Reporting;

        if kind == ReportKind::Candidates {
            let mut out = String::new();
            for candidate in &self.candidates {
                out.push_str(candidate.create_sql());
                out.push('\n');
            }
            return Some(out);
        }

        let statement = self.statements.get(statement_id as usize)?;
        let candidates = &self.candidates;
        Some(match kind {
            ReportKind::Sql => format!("{}\n", statement.original_sql()),
            ReportKind::Plan => statement.plan_text().to_string(),
            ReportKind::Indexes => statement.indexes_report(|name| {
                candidates
                    .iter()
                    .find(|c| c.name() == name)
                    .map(|c| c.create_sql())
            }),
            ReportKind::Candidates => unreachable!("handled above"),
        })
    }

    /// Releases the mirrors and all owned state. Equivalent to dropping
    /// the Session; kept as an explicit method for parity with the
    /// `expert_destroy` entry point of spec.md §6.
    pub fn destroy(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection as RConn;

    fn session_with_schema(sql: &str) -> Session {
        let conn = RConn::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        Session::from_connection(conn, AdvisorConfig::default()).unwrap()
    }

    #[test]
    fn test_scenario_s1_single_equality() {
        let mut session =
            session_with_schema("CREATE TABLE t1(a INTEGER PRIMARY KEY, b INTEGER, c INTEGER)");
        session.submit_sql("SELECT * FROM t1 WHERE b = 1").unwrap();
        session.analyze().unwrap();

        let candidates = session.report(0, ReportKind::Candidates).unwrap();
        assert!(candidates.contains("ON t1(b)"));

        let indexes = session.report(0, ReportKind::Indexes).unwrap();
        assert!(indexes.contains("ON t1(b)"));

        let plan = session.report(0, ReportKind::Plan).unwrap();
        assert!(plan.contains("USING INDEX"));
    }

    #[test]
    fn test_scenario_s4_subsumed_by_existing_index() {
        let mut session = session_with_schema(
            "CREATE TABLE t1(a, b, PRIMARY KEY(a)); CREATE INDEX t1_b ON t1(b);",
        );
        session.submit_sql("SELECT * FROM t1 WHERE b = 1").unwrap();
        session.analyze().unwrap();

        let indexes = session.report(0, ReportKind::Indexes).unwrap();
        assert_eq!(indexes, "(no new indexes)\n");
    }

    #[test]
    fn test_submit_sql_rejected_after_analyze() {
        let mut session = session_with_schema("CREATE TABLE t1(a INTEGER PRIMARY KEY)");
        session.analyze().unwrap();
        let err = session.submit_sql("SELECT * FROM t1").unwrap_err();
        assert!(matches!(err, Error::MisuseError));
    }

    #[test]
    fn test_analyze_is_callable_exactly_once() {
        let mut session = session_with_schema("CREATE TABLE t1(a INTEGER PRIMARY KEY)");
        session.analyze().unwrap();
        let err = session.analyze().unwrap_err();
        assert!(matches!(err, Error::MisuseError));
    }

    #[test]
    fn test_submit_sql_rolls_back_on_parse_error() {
        let mut session = session_with_schema("CREATE TABLE t1(a INTEGER PRIMARY KEY)");
        let err = session.submit_sql("SELECT * FROM missing_table").unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
        assert_eq!(session.statement_count(), 0);
    }

    #[test]
    fn test_empty_workload_analyze_succeeds() {
        let mut session = session_with_schema("CREATE TABLE t1(a INTEGER PRIMARY KEY)");
        session.analyze().unwrap();
        assert_eq!(session.statement_count(), 0);
        let candidates = session.report(0, ReportKind::Candidates).unwrap();
        assert_eq!(candidates, "");
    }

    #[test]
    fn test_report_none_when_not_analyzed() {
        let mut session = session_with_schema("CREATE TABLE t1(a INTEGER PRIMARY KEY)");
        session.submit_sql("SELECT * FROM t1").unwrap();
        assert!(session.report(0, ReportKind::Sql).is_none());
    }

    #[test]
    fn test_report_none_for_out_of_range_statement_id() {
        let mut session = session_with_schema("CREATE TABLE t1(a INTEGER PRIMARY KEY)");
        session.analyze().unwrap();
        assert!(session.report(5, ReportKind::Sql).is_none());
    }

    #[test]
    fn test_submitting_same_sql_twice_yields_identical_indexes_reports() {
        let mut session =
            session_with_schema("CREATE TABLE t1(a INTEGER PRIMARY KEY, b INTEGER)");
        session.submit_sql("SELECT * FROM t1 WHERE b = 1").unwrap();
        session.submit_sql("SELECT * FROM t1 WHERE b = 1").unwrap();
        session.analyze().unwrap();

        let first = session.report(0, ReportKind::Indexes).unwrap();
        let second = session.report(1, ReportKind::Indexes).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_scenario_s6_invalid_statement_in_separate_call() {
        let mut session =
            session_with_schema("CREATE TABLE t1(a INTEGER PRIMARY KEY, b INTEGER)");
        assert!(session.submit_sql("SELECT * FROM nope").is_err());
        session.submit_sql("SELECT * FROM t1 WHERE b = 1").unwrap();
        session.analyze().unwrap();
        assert_eq!(session.statement_count(), 1);
    }
}
