use oracle::Connection as OracleConnection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::db::session::{OracleSession, ScriptSession, SqliteSession};
use crate::error::DbError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    #[default]
    Oracle,
    Sqlite,
}

impl Driver {
    /// Whether a rollback also undoes DDL run earlier in the transaction.
    pub fn rolls_back_ddl(&self) -> bool {
        match self {
            Driver::Oracle => false,
            Driver::Sqlite => true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionInfo {
    pub name: String,
    pub driver: Driver,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub host: String,
    pub port: u16,
    pub service_name: String,
    /// Database file for the SQLite driver
    pub database: Option<PathBuf>,
    /// Statements run once right after connecting
    pub session_init: Vec<String>,
}

impl ConnectionInfo {
    pub fn connection_string(&self) -> String {
        format!("//{}:{}/{}", self.host, self.port, self.service_name)
    }

    pub fn display_string(&self) -> String {
        match self.driver {
            Driver::Oracle => format!(
                "{} ({}@{}:{}/{})",
                self.name, self.username, self.host, self.port, self.service_name
            ),
            Driver::Sqlite => match &self.database {
                Some(path) => format!("{} (sqlite:{})", self.name, path.display()),
                None => format!("{} (sqlite::memory:)", self.name),
            },
        }
    }

    /// Securely clear the password from memory by overwriting with zeros
    /// then releasing the allocation.
    pub fn clear_password(&mut self) {
        // SAFETY: zero bytes are valid UTF-8, so the string stays well formed
        let bytes = unsafe { self.password.as_bytes_mut() };
        for b in bytes.iter_mut() {
            // write_volatile keeps the zeroing from being optimized away
            unsafe { std::ptr::write_volatile(b, 0) };
        }
        self.password.clear();
        self.password.shrink_to_fit();
    }
}

impl Default for ConnectionInfo {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            driver: Driver::Oracle,
            username: String::new(),
            password: String::new(),
            host: "localhost".to_string(),
            port: 1521,
            service_name: "ORCL".to_string(),
            database: None,
            session_init: Vec::new(),
        }
    }
}

/// Open a session for the configured driver.
///
/// The password is wiped from `info` once the connection is established.
pub fn connect(info: &mut ConnectionInfo) -> Result<Box<dyn ScriptSession>, DbError> {
    let mut session: Box<dyn ScriptSession> = match info.driver {
        Driver::Oracle => {
            let conn_str = info.connection_string();
            let conn = OracleConnection::connect(&info.username, &info.password, &conn_str)?;
            Box::new(OracleSession::new(conn, info.display_string()))
        }
        Driver::Sqlite => match &info.database {
            Some(path) => Box::new(SqliteSession::open(path)?),
            None => Box::new(SqliteSession::open_in_memory()?),
        },
    };
    info.clear_password();
    info!("Connected to {}", session.describe());

    apply_session_settings(session.as_mut(), &info.session_init);
    Ok(session)
}

fn apply_session_settings(session: &mut dyn ScriptSession, statements: &[String]) {
    for statement in statements {
        if let Err(err) = session.execute(statement) {
            warn!("Failed to apply session setting `{statement}`: {err}");
        }
    }
}
