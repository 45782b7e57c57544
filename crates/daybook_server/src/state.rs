use crate::config::ServerConfig;
use crate::error::ApiError;
use daybook_core::AuthSettings;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    // One connection serialized behind a mutex; handlers hold it only for
    // synchronous repository calls.
    db: Arc<Mutex<Connection>>,
    pub auth: AuthSettings,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(conn: Connection, auth: AuthSettings, cookie_secure: bool) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            auth,
            cookie_secure,
        }
    }

    pub fn from_config(conn: Connection, config: &ServerConfig) -> Self {
        Self::new(conn, config.auth_settings(), config.cookie_secure)
    }

    /// Runs `f` with exclusive access to the database connection.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let conn = self
            .db
            .lock()
            .map_err(|_| ApiError::Internal("database connection lock poisoned".to_string()))?;
        f(&conn)
    }
}
