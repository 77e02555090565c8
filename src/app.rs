use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::db::{
    category_scripts, connect, BatchSummary, ExecutionOutcome, FileReport, RunReport,
    ScriptExecutor, ScriptRunner, ScriptSession,
};
use crate::error::{Result, RunnerError};
use crate::utils::AppConfig;

pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    fn scripts_dir(&self) -> Result<PathBuf> {
        self.config.scripts_dir.clone().ok_or_else(|| {
            RunnerError::Config("no scripts directory given (--scripts-dir)".to_string())
        })
    }

    /// Connect and replay every configured category in order.
    pub fn run(&mut self) -> Result<RunReport> {
        let scripts_dir = self.scripts_dir()?;
        let started_at = Utc::now();

        let driver = self.config.connection.driver;
        if !driver.rolls_back_ddl() {
            warn!(
                "{driver:?} commits DDL implicitly; a failing script keeps the DDL that ran before it"
            );
        }

        self.config.resolve_password();
        let mut session = connect(&mut self.config.connection).map_err(|source| {
            RunnerError::Connect {
                target: self.config.connection.display_string(),
                source,
            }
        })?;

        let target = session.describe();
        let categories = self.run_categories(session.as_mut(), &scripts_dir);
        Ok(RunReport {
            target,
            dry_run: false,
            started_at,
            finished_at: Utc::now(),
            categories,
        })
    }

    pub fn run_categories(
        &self,
        session: &mut dyn ScriptSession,
        scripts_dir: &Path,
    ) -> Vec<BatchSummary> {
        let mut runner = ScriptRunner::new(session).with_extension(&self.config.extension);
        let mut summaries = Vec::new();
        for category in &self.config.categories {
            info!("Running category {category}");
            summaries.push(runner.run_category(scripts_dir, category));
        }
        summaries
    }

    /// Parse every script without connecting.
    pub fn dry_run(&self) -> Result<RunReport> {
        let scripts_dir = self.scripts_dir()?;
        let started_at = Utc::now();

        let mut categories = Vec::new();
        for category in &self.config.categories {
            let summary =
                match category_scripts(&scripts_dir, category, &self.config.extension) {
                    Err(skipped) => skipped,
                    Ok(files) => {
                        let mut summary = BatchSummary::new(category);
                        for file in &files {
                            summary.record(parse_report(file));
                        }
                        summary
                    }
                };
            categories.push(summary);
        }

        Ok(RunReport {
            target: "dry run".to_string(),
            dry_run: true,
            started_at,
            finished_at: Utc::now(),
            categories,
        })
    }
}

fn parse_report(path: &Path) -> FileReport {
    let start = std::time::Instant::now();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let outcome = match ScriptExecutor::parse_file(path) {
        Ok(script) => ExecutionOutcome::AllCommitted {
            statements: script.len(),
        },
        Err(err) => {
            warn!("{file_name}: {err}");
            ExecutionOutcome::ParseFailed {
                error: err.to_string(),
            }
        }
    };
    FileReport {
        file_name,
        outcome,
        elapsed: start.elapsed(),
    }
}
