//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::facets::ExecutionLimits;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Facet configuration file (default: ./facets.toml).
    pub facets_config: PathBuf,

    /// Directory holding a `page.html` template override.
    pub templates_dir: Option<PathBuf>,

    /// Directory searched for static assets before the built-in ones
    /// (default: ./assets).
    pub assets_dir: PathBuf,

    /// Per-statement timeout (default: 10s).
    pub query_timeout: Duration,

    /// Deadline for a whole search pass (default: 15s).
    pub request_deadline: Duration,

    /// Retries for transient storage errors (default: 1).
    pub query_retries: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let facets_config = env::var("FACETS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./facets.toml"));

        let templates_dir = env::var("TEMPLATES_DIR")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let assets_dir = env::var("ASSETS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./assets"));

        let query_timeout = seconds_var("QUERY_TIMEOUT_SECS", 10)?;
        let request_deadline = seconds_var("REQUEST_DEADLINE_SECS", 15)?;

        let query_retries = env::var("QUERY_RETRIES")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .context("QUERY_RETRIES must be a valid u32")?;

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            facets_config,
            templates_dir,
            assets_dir,
            query_timeout,
            request_deadline,
            query_retries,
        })
    }

    /// Query execution limits derived from this configuration.
    pub fn execution_limits(&self) -> ExecutionLimits {
        ExecutionLimits {
            statement_timeout: self.query_timeout,
            pass_deadline: self.request_deadline,
            retries: self.query_retries,
        }
    }
}

fn seconds_var(name: &str, default: u64) -> Result<Duration> {
    let secs: u64 = match env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{name} must be a whole number of seconds"))?,
        Err(_) => default,
    };
    if secs == 0 {
        anyhow::bail!("{name} must be greater than 0");
    }
    Ok(Duration::from_secs(secs))
}
