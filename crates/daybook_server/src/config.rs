//! Server configuration: optional TOML file, then CLI/env overrides.

use anyhow::{bail, Context, Result};
use axum::http::HeaderValue;
use chrono::Duration;
use clap::Parser;
use daybook_core::password::{DEFAULT_COST, MIN_COST};
use daybook_core::{default_log_level, AuthSettings};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

const DEFAULT_PORT: u16 = 5555;
const DEFAULT_DATABASE: &str = "daybook.sqlite3";
const DEFAULT_SESSION_TTL_HOURS: u32 = 24 * 7;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Parser)]
#[command(name = "daybook-server")]
#[command(version, about = "Session-authenticated REST API for lists, tasks and calendars")]
pub struct CliArgs {
    /// Path to a TOML config file
    #[arg(short, long, env = "DAYBOOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on (e.g. 127.0.0.1:5555)
    #[arg(long, env = "DAYBOOK_BIND")]
    pub bind: Option<SocketAddr>,

    /// SQLite database file, or `:memory:`
    #[arg(long, env = "DAYBOOK_DATABASE")]
    pub database: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "DAYBOOK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rotating log files (stderr when unset)
    #[arg(long, env = "DAYBOOK_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Mark the session cookie `Secure`
    #[arg(long)]
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub database_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub cookie_secure: bool,
    /// 0 keeps sessions until logout.
    pub session_ttl_hours: u32,
    pub bcrypt_cost: u32,
    /// Origins allowed to send credentialed requests. Empty allows any
    /// origin without credentials.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            database_path: PathBuf::from(DEFAULT_DATABASE),
            log_level: default_log_level().to_string(),
            log_dir: None,
            cookie_secure: false,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            bcrypt_cost: DEFAULT_COST,
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Builds the effective config from `args`, reading `args.config` first.
    pub fn load(args: &CliArgs) -> Result<Self> {
        let mut config = match args.config.as_deref() {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(args);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn apply_overrides(&mut self, args: &CliArgs) {
        if let Some(bind) = args.bind {
            self.bind = bind;
        }
        if let Some(database) = &args.database {
            self.database_path = database.clone();
        }
        if let Some(level) = &args.log_level {
            self.log_level = level.clone();
        }
        if let Some(dir) = &args.log_dir {
            self.log_dir = Some(dir.clone());
        }
        if args.cookie_secure {
            self.cookie_secure = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            bail!(
                "bcrypt_cost must be between {MIN_COST} and {MAX_BCRYPT_COST}, got {}",
                self.bcrypt_cost
            );
        }
        Ok(())
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            bcrypt_cost: self.bcrypt_cost,
            session_ttl: (self.session_ttl_hours > 0)
                .then(|| Duration::hours(i64::from(self.session_ttl_hours))),
        }
    }

    pub fn cors_layer(&self) -> Result<CorsLayer> {
        if self.allowed_origins.is_empty() {
            return Ok(CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any));
        }

        let origins = self
            .allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .with_context(|| format!("Invalid allowed origin `{origin}`"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true))
    }
}

#[cfg(test)]
mod tests {
    use super::{CliArgs, ServerConfig};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = ServerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind.port(), 5555);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ServerConfig::from_toml_str("colour = \"blue\"").is_err());
    }

    #[test]
    fn cli_flags_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daybook.toml");
        std::fs::write(
            &path,
            "bind = \"0.0.0.0:8080\"\ndatabase_path = \"/tmp/file.db\"\nsession_ttl_hours = 0\n",
        )
        .unwrap();

        let args = CliArgs::parse_from([
            "daybook-server",
            "--config",
            path.to_str().unwrap(),
            "--database",
            ":memory:",
            "--cookie-secure",
        ]);
        let config = ServerConfig::load(&args).unwrap();

        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.database_path, PathBuf::from(":memory:"));
        assert!(config.cookie_secure);
        assert_eq!(config.auth_settings().session_ttl, None);
    }

    #[test]
    fn out_of_range_bcrypt_cost_is_rejected() {
        let config = ServerConfig::from_toml_str("bcrypt_cost = 2").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn credentialed_cors_requires_valid_origins() {
        let config = ServerConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            ..ServerConfig::default()
        };
        assert!(config.cors_layer().is_ok());

        let bad = ServerConfig {
            allowed_origins: vec!["bad\norigin".to_string()],
            ..ServerConfig::default()
        };
        assert!(bad.cors_layer().is_err());
    }
}
