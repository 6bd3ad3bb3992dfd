//! Argument parsing for the `advisor` binary (spec.md §6).

use std::path::PathBuf;

use clap::Parser;

/// Recommends secondary indexes for a SQL workload against a given database.
#[derive(Debug, Parser)]
#[command(name = "advisor", version, about)]
pub struct Cli {
    /// Path to the SQLite database the workload runs against.
    pub db_path: PathBuf,

    /// A single SQL statement to analyze.
    #[arg(long = "sql", value_name = "TEXT")]
    pub sql: Option<String>,

    /// A file of newline-separated SQL statements to analyze.
    #[arg(long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Collects the individual statements this invocation should submit,
    /// in order: `--sql` first (if present), then one entry per
    /// non-blank line of `--file` (if present).
    pub fn statements(&self) -> anyhow::Result<Vec<String>> {
        let mut out = Vec::new();
        if let Some(sql) = &self.sql {
            out.push(sql.clone());
        }
        if let Some(path) = &self.file {
            let contents = std::fs::read_to_string(path)?;
            for line in contents.lines() {
                let line = line.trim();
                if !line.is_empty() {
                    out.push(line.to_string());
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sql_only() {
        let cli = Cli::parse_from(["advisor", "--sql", "SELECT 1", "db.sqlite"]);
        assert_eq!(cli.statements().unwrap(), vec!["SELECT 1".to_string()]);
    }

    #[test]
    fn test_file_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SELECT 1\n\nSELECT 2\n").unwrap();
        let cli = Cli::parse_from([
            "advisor",
            "--file",
            file.path().to_str().unwrap(),
            "db.sqlite",
        ]);
        assert_eq!(
            cli.statements().unwrap(),
            vec!["SELECT 1".to_string(), "SELECT 2".to_string()]
        );
    }
}
