use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::db::session::{ScriptSession, ScriptTransaction};
use crate::error::{Result, RunnerError};

use super::{ExecutionOutcome, FileReport, ParsedScript};

pub struct ScriptExecutor;

impl ScriptExecutor {
    /// Parse and execute one script's text as a single transaction.
    ///
    /// Returns the number of statements executed. Blank scripts succeed
    /// without opening a transaction.
    pub fn execute_script(session: &mut dyn ScriptSession, sql: &str) -> Result<usize> {
        let script = Self::parse_script(sql);
        if script.is_empty() {
            debug!("script has no statements");
            return Ok(0);
        }
        Self::execute_parsed(session, &script)?;
        Ok(script.len())
    }

    /// Execute statements in order; any failure rolls back the whole unit.
    pub fn execute_parsed(session: &mut dyn ScriptSession, script: &ParsedScript) -> Result<()> {
        let mut tx = ScriptTransaction::begin(session).map_err(RunnerError::Transaction)?;

        for (i, statement) in script.statements.iter().enumerate() {
            debug!(index = i + 1, "executing statement");
            if let Err(err) = tx.execute(statement) {
                if let Err(rollback_err) = tx.rollback() {
                    warn!("Rollback failed after statement error: {rollback_err}");
                }
                return Err(RunnerError::statement(i + 1, statement, err));
            }
        }

        tx.commit().map_err(RunnerError::Transaction)
    }

    /// Read one file and run it; every failure is folded into the report.
    pub fn run_file(session: &mut dyn ScriptSession, path: &Path) -> FileReport {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        info!("Executing {file_name}");

        let start = Instant::now();
        let outcome = match fs::read_to_string(path) {
            Err(err) => {
                warn!("{file_name}: cannot read: {err}");
                ExecutionOutcome::ParseFailed {
                    error: RunnerError::from(err).to_string(),
                }
            }
            Ok(sql) => match Self::execute_script(session, &sql) {
                Ok(statements) => {
                    info!("{file_name}: OK ({statements} statements)");
                    ExecutionOutcome::AllCommitted { statements }
                }
                Err(err) => {
                    warn!("{file_name}: FAILED: {err}");
                    ExecutionOutcome::RolledBack {
                        error: err.to_string(),
                    }
                }
            },
        };

        FileReport {
            file_name,
            outcome,
            elapsed: start.elapsed(),
        }
    }

    /// Parse one file without executing it.
    pub fn parse_file(path: &Path) -> Result<ParsedScript> {
        let sql = fs::read_to_string(path)?;
        Ok(Self::parse_script(&sql))
    }
}
