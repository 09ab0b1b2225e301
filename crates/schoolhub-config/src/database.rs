use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::env_or;

/// Connection settings for the PostgreSQL pool.
///
/// `statement_timeout` is applied per connection so a single slow query
/// cannot hold a transaction open indefinitely.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub statement_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        let url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        Ok(Self::with_url(url))
    }

    /// Builds a config for `url` using the environment (or defaults) for
    /// everything else.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10),
            acquire_timeout: Duration::from_secs(env_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 5)),
            statement_timeout: Duration::from_millis(env_or(
                "DATABASE_STATEMENT_TIMEOUT_MS",
                10_000,
            )),
        }
    }
}
