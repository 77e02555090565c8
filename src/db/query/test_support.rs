use crate::db::session::ScriptSession;
use crate::error::DbError;

/// Session that records calls and fails statements containing a marker.
#[derive(Default)]
pub struct RecordingSession {
    pub events: Vec<String>,
    pub fail_marker: Option<String>,
    pub fail_commit: bool,
    pub committed: Vec<String>,
    pending: Vec<String>,
}

impl RecordingSession {
    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_commit() -> Self {
        Self {
            fail_commit: true,
            ..Self::default()
        }
    }

    pub fn executed(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| event.strip_prefix("EXEC "))
            .collect()
    }
}

impl ScriptSession for RecordingSession {
    fn begin(&mut self) -> Result<(), DbError> {
        self.events.push("BEGIN".to_string());
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<(), DbError> {
        self.events.push(format!("EXEC {sql}"));
        if let Some(marker) = &self.fail_marker {
            if sql.contains(marker.as_str()) {
                return Err(DbError::Session(format!("rejected: {sql}")));
            }
        }
        self.pending.push(sql.to_string());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DbError> {
        self.events.push("COMMIT".to_string());
        if self.fail_commit {
            return Err(DbError::Session("commit refused".to_string()));
        }
        self.committed.append(&mut self.pending);
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        self.events.push("ROLLBACK".to_string());
        self.pending.clear();
        Ok(())
    }

    fn describe(&self) -> String {
        "recording".to_string()
    }
}
