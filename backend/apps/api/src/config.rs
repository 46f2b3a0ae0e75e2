//! API server configuration.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use identity::IdentityConfig;

/// Startup configuration read from the environment
#[derive(Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    pub frontend_origins: Vec<String>,
    pub identity: IdentityConfig,
}

impl ApiConfig {
    /// | Variable                   | Default                                          |
    /// |----------------------------|--------------------------------------------------|
    /// | `JWT_SECRET`               | required                                         |
    /// | `DATABASE_URL`             | required                                         |
    /// | `DATABASE_MAX_CONNECTIONS` | `5`                                              |
    /// | `BIND_ADDR`                | `0.0.0.0:8080`                                   |
    /// | `TOKEN_TTL_HOURS`          | `24`                                             |
    /// | `PASSWORD_PEPPER`          | unset                                            |
    /// | `FRONTEND_ORIGINS`         | `http://localhost:3000,http://127.0.0.1:3000`    |
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = env::var("JWT_SECRET").unwrap_or_default();
        if secret.trim().is_empty() {
            bail!("JWT_SECRET must be set in environment");
        }

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 5u32)?;
        let bind_addr = parse_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?;
        let ttl_hours = parse_or("TOKEN_TTL_HOURS", 24u64)?;

        let mut identity = IdentityConfig::new(secret)?.with_token_ttl(token_ttl(ttl_hours)?)?;
        if let Ok(pepper) = env::var("PASSWORD_PEPPER") {
            identity = identity.with_pepper(pepper);
        }

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            bind_addr,
            database_url,
            database_max_connections,
            frontend_origins,
            identity,
        })
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .field("frontend_origins", &self.frontend_origins)
            .field("identity", &self.identity)
            .finish()
    }
}

/// `TOKEN_TTL_HOURS` as a duration
fn token_ttl(hours: u64) -> anyhow::Result<Duration> {
    hours
        .checked_mul(3600)
        .map(Duration::from_secs)
        .with_context(|| format!("TOKEN_TTL_HOURS is too large: {}", hours))
}

/// Parse `name` if set, else `default`
fn parse_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}
