use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::db::session::ScriptSession;
use crate::error::Result;

use super::{BatchStatus, BatchSummary, ScriptExecutor};

pub const DEFAULT_EXTENSION: &str = "sql";

/// Runs every script of a category directory, one transaction per file.
pub struct ScriptRunner<'s> {
    session: &'s mut dyn ScriptSession,
    extension: String,
}

impl<'s> ScriptRunner<'s> {
    pub fn new(session: &'s mut dyn ScriptSession) -> Self {
        Self {
            session,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Run `scripts_dir/category/*.<ext>` in file-name order.
    ///
    /// A failing file is recorded and the next file still runs. A missing,
    /// empty or unlistable directory is reported, never raised, so the
    /// remaining categories still run.
    pub fn run_category(&mut self, scripts_dir: &Path, category: &str) -> BatchSummary {
        let files = match category_scripts(scripts_dir, category, &self.extension) {
            Ok(files) => files,
            Err(summary) => return summary,
        };

        let mut summary = BatchSummary::new(category);
        for file in &files {
            let report = ScriptExecutor::run_file(self.session, file);
            summary.record(report);
        }

        info!("{}", summary.message());
        summary
    }
}

/// Script files of `scripts_dir/category`, or the summary explaining why
/// there is nothing to run.
pub fn category_scripts(
    scripts_dir: &Path,
    category: &str,
    extension: &str,
) -> std::result::Result<Vec<PathBuf>, BatchSummary> {
    let dir = scripts_dir.join(category);
    let skipped = match list_scripts(&dir, extension) {
        Ok(Some(files)) if !files.is_empty() => return Ok(files),
        Ok(Some(_)) => BatchSummary::skipped(category, BatchStatus::NoScripts),
        Ok(None) => BatchSummary::skipped(category, BatchStatus::MissingDirectory),
        Err(err) => BatchSummary::unreadable(category, err.to_string()),
    };
    match skipped.status {
        BatchStatus::NoScripts => info!("{}", skipped.message()),
        _ => warn!("{}", skipped.message()),
    }
    Err(skipped)
}

/// Script files of a directory sorted by name, or None if there is no
/// directory at that path (a regular file counts as no directory).
pub fn list_scripts(dir: &Path, extension: &str) -> Result<Option<Vec<PathBuf>>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let entries = fs::read_dir(dir)?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(Some(files))
}
