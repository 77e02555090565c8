use oracle::Connection as OracleConnection;
use rusqlite::Connection as SqliteConnection;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::DbError;

/// One live database connection able to run script statements.
///
/// Used by a single transaction at a time; a new transaction is only begun
/// after the previous one has been committed or rolled back.
pub trait ScriptSession {
    fn begin(&mut self) -> Result<(), DbError>;
    fn execute(&mut self, sql: &str) -> Result<(), DbError>;
    fn commit(&mut self) -> Result<(), DbError>;
    fn rollback(&mut self) -> Result<(), DbError>;
    fn describe(&self) -> String;
}

pub struct OracleSession {
    conn: OracleConnection,
    target: String,
}

impl OracleSession {
    pub fn new(conn: OracleConnection, target: String) -> Self {
        Self { conn, target }
    }
}

impl ScriptSession for OracleSession {
    fn begin(&mut self) -> Result<(), DbError> {
        // Oracle opens a transaction implicitly with the first statement.
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<(), DbError> {
        match self.conn.execute(sql, &[]) {
            Ok(_stmt) => Ok(()),
            Err(err) => {
                debug!("Database operation failed: {err}");
                Err(err.into())
            }
        }
    }

    fn commit(&mut self) -> Result<(), DbError> {
        self.conn.commit()?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        self.conn.rollback()?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.target.clone()
    }
}

pub struct SqliteSession {
    conn: SqliteConnection,
    target: String,
}

impl SqliteSession {
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = SqliteConnection::open(path)?;
        Ok(Self {
            conn,
            target: format!("sqlite:{}", path.display()),
        })
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = SqliteConnection::open_in_memory()?;
        Ok(Self {
            conn,
            target: "sqlite::memory:".to_string(),
        })
    }

    #[cfg(test)]
    pub fn connection(&self) -> &SqliteConnection {
        &self.conn
    }
}

impl ScriptSession for SqliteSession {
    fn begin(&mut self) -> Result<(), DbError> {
        if !self.conn.is_autocommit() {
            return Err(DbError::Session(
                "a transaction is already open on this connection".to_string(),
            ));
        }
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<(), DbError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DbError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        // A failed statement may already have ended the transaction.
        if self.conn.is_autocommit() {
            return Ok(());
        }
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.target.clone()
    }
}

/// Scoped transaction over a session.
///
/// Ends in exactly one commit or one rollback. Dropping an unfinished guard
/// (early return, panic unwinding) rolls back.
pub struct ScriptTransaction<'s> {
    session: &'s mut dyn ScriptSession,
    finished: bool,
}

impl<'s> ScriptTransaction<'s> {
    pub fn begin(session: &'s mut dyn ScriptSession) -> Result<Self, DbError> {
        session.begin()?;
        Ok(Self {
            session,
            finished: false,
        })
    }

    pub fn execute(&mut self, sql: &str) -> Result<(), DbError> {
        self.session.execute(sql)
    }

    /// A failed commit leaves the guard unfinished, so drop rolls back.
    pub fn commit(mut self) -> Result<(), DbError> {
        self.session.commit()?;
        self.finished = true;
        Ok(())
    }

    pub fn rollback(mut self) -> Result<(), DbError> {
        self.finished = true;
        self.session.rollback()
    }
}

impl Drop for ScriptTransaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(err) = self.session.rollback() {
            warn!("Rollback of abandoned transaction failed: {err}");
        }
    }
}
