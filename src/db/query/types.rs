use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_TERMINATOR: &str = ";";

/// Ordered, non-empty statements of one script file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedScript {
    pub statements: Vec<String>,
    /// True when the file was split by the terminator-directive-aware path.
    pub uses_directives: bool,
}

impl ParsedScript {
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    AllCommitted { statements: usize },
    RolledBack { error: String },
    /// The file could not be read, so no transaction was opened.
    ParseFailed { error: String },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::AllCommitted { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file_name: String,
    #[serde(flatten)]
    pub outcome: ExecutionOutcome,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Executed,
    MissingDirectory,
    NoScripts,
    /// The directory exists but could not be listed.
    Unreadable,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub category: String,
    pub status: BatchStatus,
    pub files: Vec<FileReport>,
    pub success_count: usize,
    pub error_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchSummary {
    pub fn skipped(category: &str, status: BatchStatus) -> Self {
        Self {
            category: category.to_string(),
            status,
            files: Vec::new(),
            success_count: 0,
            error_count: 0,
            error: None,
        }
    }

    pub fn unreadable(category: &str, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::skipped(category, BatchStatus::Unreadable)
        }
    }

    pub fn new(category: &str) -> Self {
        Self::skipped(category, BatchStatus::Executed)
    }

    pub fn record(&mut self, report: FileReport) {
        if report.outcome.is_success() {
            self.success_count += 1;
        } else {
            self.error_count += 1;
        }
        self.files.push(report);
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().filter_map(|file| match &file.outcome {
            ExecutionOutcome::RolledBack { error } | ExecutionOutcome::ParseFailed { error } => {
                Some((file.file_name.as_str(), error.as_str()))
            }
            ExecutionOutcome::AllCommitted { .. } => None,
        })
    }

    pub fn message(&self) -> String {
        match self.status {
            BatchStatus::MissingDirectory => {
                format!("Directory {} does not exist, skipping", self.category)
            }
            BatchStatus::NoScripts => format!("No script files in {}", self.category),
            BatchStatus::Unreadable => format!(
                "Cannot list {}: {}, skipping",
                self.category,
                self.error.as_deref().unwrap_or("unknown error")
            ),
            BatchStatus::Executed => format!(
                "Summary {}: {} succeeded, {} failed",
                self.category, self.success_count, self.error_count
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub target: String,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub categories: Vec<BatchSummary>,
}

impl RunReport {
    pub fn success_count(&self) -> usize {
        self.categories.iter().map(|c| c.success_count).sum()
    }

    pub fn error_count(&self) -> usize {
        self.categories.iter().map(|c| c.error_count).sum()
    }

    /// No file failed and every existing category directory could be listed.
    pub fn is_success(&self) -> bool {
        self.error_count() == 0
            && self
                .categories
                .iter()
                .all(|c| c.status != BatchStatus::Unreadable)
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
