//! Library surface behind the `advisor` binary, kept separate from
//! `main.rs` so the run loop is testable without a subprocess.

pub mod args;

use anyhow::Context;
use colored::Colorize;
use std::io::Write;

use advisor_session::{AdvisorConfig, ReportKind, Session};
use args::Cli;

/// Runs one advisor pass: opens the database, submits every statement,
/// analyzes, and writes the per-statement report to `out`.
pub fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let statements = cli.statements()?;

    let mut session = Session::create(&cli.db_path, AdvisorConfig::default())
        .with_context(|| format!("opening database {}", cli.db_path.display()))?;

    for (i, sql) in statements.iter().enumerate() {
        session
            .submit_sql(sql)
            .with_context(|| format!("statement #{i}: {sql}"))?;
    }

    session.analyze().context("analyzing workload")?;

    for id in 0..session.statement_count() {
        write_statement_report(&mut session, id, out)?;
    }

    let candidates = session
        .report(0, ReportKind::Candidates)
        .unwrap_or_default();
    if !candidates.is_empty() {
        writeln!(out, "{}", "candidate indexes".bold())?;
        write!(out, "{candidates}")?;
    }

    Ok(())
}

fn write_statement_report(
    session: &mut Session,
    id: u32,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let sql = session
        .report(id, ReportKind::Sql)
        .unwrap_or_else(|| "(missing)\n".to_string());
    let indexes = session
        .report(id, ReportKind::Indexes)
        .unwrap_or_else(|| "(missing)\n".to_string());
    let plan = session
        .report(id, ReportKind::Plan)
        .unwrap_or_else(|| "(missing)\n".to_string());

    writeln!(out, "{} {}", format!("[{id}]").cyan().bold(), sql.trim_end())?;
    writeln!(out, "  {}", "recommended indexes".green())?;
    for line in indexes.lines() {
        writeln!(out, "    {line}")?;
    }
    writeln!(out, "  {}", "plan".yellow())?;
    for line in plan.lines() {
        writeln!(out, "    {line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn make_db() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        let conn = Connection::open(file.path()).unwrap();
        conn.execute_batch("CREATE TABLE t1(a INTEGER PRIMARY KEY, b INTEGER)")
            .unwrap();
        file
    }

    #[test]
    fn test_run_reports_recommended_index() {
        let db = make_db();
        let cli = Cli {
            db_path: db.path().to_path_buf(),
            sql: Some("SELECT * FROM t1 WHERE b = 1".to_string()),
            file: None,
            verbose: 0,
        };
        let mut out = Vec::new();
        run(&cli, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("ON t1(b)"));
    }

    #[test]
    fn test_run_fails_on_missing_table() {
        let db = make_db();
        let cli = Cli {
            db_path: db.path().to_path_buf(),
            sql: Some("SELECT * FROM nope".to_string()),
            file: None,
            verbose: 0,
        };
        let mut out = Vec::new();
        assert!(run(&cli, &mut out).is_err());
    }
}
