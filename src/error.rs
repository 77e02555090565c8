//! Error types for script replay.

use thiserror::Error;

/// Errors raised by a database session.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Oracle error: {0}")]
    Oracle(#[from] oracle::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Session used in a way the backend does not allow
    #[error("Session error: {0}")]
    Session(String),
}

/// Main error type for the runner.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Configuration error (unreadable file, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Could not open the database connection
    #[error("Connection to {target} failed: {source}")]
    Connect {
        target: String,
        #[source]
        source: DbError,
    },

    /// A statement failed; the whole file was rolled back
    #[error("Statement {index} failed: {source}\n  Statement: {statement}")]
    Statement {
        index: usize,
        statement: String,
        #[source]
        source: DbError,
    },

    /// BEGIN or COMMIT failed
    #[error("Transaction error: {0}")]
    Transaction(#[source] DbError),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const STATEMENT_PREVIEW_CHARS: usize = 120;

impl RunnerError {
    pub fn statement(index: usize, sql: &str, source: DbError) -> Self {
        RunnerError::Statement {
            index,
            statement: preview(sql),
            source,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// First line of a statement, cut to a readable length.
fn preview(sql: &str) -> String {
    let first_line = sql.lines().next().unwrap_or_default().trim();
    let mut text: String = first_line.chars().take(STATEMENT_PREVIEW_CHARS).collect();
    if first_line.chars().count() > STATEMENT_PREVIEW_CHARS || sql.lines().nth(1).is_some() {
        text.push_str(" ...");
    }
    text
}

pub type Result<T> = std::result::Result<T, RunnerError>;
