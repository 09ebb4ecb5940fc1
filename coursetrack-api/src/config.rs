/// Configuration management for the API server
///
/// Configuration comes from environment variables (a `.env` file is loaded
/// first when present).
///
/// # Environment Variables
///
/// | Variable                   | Default    | Notes                               |
/// |----------------------------|------------|-------------------------------------|
/// | `API_HOST`                 | `0.0.0.0`  |                                     |
/// | `API_PORT`                 | `4000`     |                                     |
/// | `CORS_ORIGINS`             | `*`        | comma separated                     |
/// | `APP_ENV`                  | `development` | `production` enables HSTS and secure cookies |
/// | `STORAGE_BACKEND`          | `postgres` | `postgres` or `memory`              |
/// | `DATABASE_URL`             |            | required for `postgres`             |
/// | `DATABASE_MAX_CONNECTIONS` | `10`       |                                     |
/// | `REDIS_URL`                |            | required for `postgres`             |
/// | `REDIS_CONNECTION_TIMEOUT_SECS` | `5`   |                                     |
/// | `REDIS_COMMAND_TIMEOUT_SECS` | `10`     |                                     |
/// | `SESSION_SECRET`           |            | required, at least 32 characters    |
/// | `SESSION_TTL_SECONDS`      | `604800`   | seven days, at most one year        |
/// | `SESSION_COOKIE_NAME`      | `sid`      |                                     |
///
/// # Example
///
/// ```no_run
/// use coursetrack_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use coursetrack_shared::redis::RedisConfig;

const MIN_SECRET_LENGTH: usize = 32;

/// One year
const MAX_SESSION_TTL_SECONDS: u64 = 365 * 24 * 3600;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,

    pub port: u16,

    /// Allowed origins; `*` allows any origin
    pub cors_origins: Vec<String>,

    /// Production mode: HSTS header and `Secure` cookies
    pub production: bool,
}

/// Where domain data and sessions live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL for data, Redis for sessions
    Postgres,
    /// Everything in process; lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("Unknown STORAGE_BACKEND '{}' (expected postgres or memory)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Set whenever `backend` is `Postgres`
    pub database_url: Option<String>,

    pub max_connections: u32,

    /// Set whenever `backend` is `Postgres`
    pub redis_url: Option<String>,

    pub redis_connection_timeout_secs: u64,

    pub redis_command_timeout_secs: u64,
}

impl StorageConfig {
    /// Redis settings for the session store, when a URL is configured
    pub fn redis(&self) -> Option<RedisConfig> {
        self.redis_url.as_ref().map(|url| {
            let mut config = RedisConfig::new(url.clone());
            config.connection_timeout_secs = self.redis_connection_timeout_secs;
            config.command_timeout_secs = self.redis_command_timeout_secs;
            config
        })
    }
}

#[derive(Clone)]
pub struct SessionConfig {
    /// HMAC key for cookie signatures
    pub secret: String,

    pub ttl_seconds: u64,

    pub cookie_name: String,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

fn parse_or<T>(value: Option<String>, default: T, name: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {}", name, raw)),
        None => Ok(default),
    }
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to its
    /// value
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(lookup("API_PORT"), 4000u16, "API_PORT")?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = lookup("APP_ENV")
            .map(|v| v.trim().eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let backend = match lookup("STORAGE_BACKEND") {
            Some(raw) => raw.parse::<StorageBackend>()?,
            None => StorageBackend::Postgres,
        };

        let database_url = lookup("DATABASE_URL");
        let redis_url = lookup("REDIS_URL");
        if backend == StorageBackend::Postgres {
            if database_url.is_none() {
                anyhow::bail!("DATABASE_URL environment variable is required");
            }
            if redis_url.is_none() {
                anyhow::bail!("REDIS_URL environment variable is required");
            }
        }
        let max_connections = parse_or(
            lookup("DATABASE_MAX_CONNECTIONS"),
            10u32,
            "DATABASE_MAX_CONNECTIONS",
        )?;
        let redis_connection_timeout_secs = parse_or(
            lookup("REDIS_CONNECTION_TIMEOUT_SECS"),
            5u64,
            "REDIS_CONNECTION_TIMEOUT_SECS",
        )?;
        let redis_command_timeout_secs = parse_or(
            lookup("REDIS_COMMAND_TIMEOUT_SECS"),
            10u64,
            "REDIS_COMMAND_TIMEOUT_SECS",
        )?;

        let secret = lookup("SESSION_SECRET")
            .ok_or_else(|| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;
        if secret.len() < MIN_SECRET_LENGTH {
            anyhow::bail!("SESSION_SECRET must be at least {} characters long", MIN_SECRET_LENGTH);
        }

        let ttl_seconds = parse_or(lookup("SESSION_TTL_SECONDS"), 604_800u64, "SESSION_TTL_SECONDS")?;
        if ttl_seconds == 0 || ttl_seconds > MAX_SESSION_TTL_SECONDS {
            anyhow::bail!(
                "SESSION_TTL_SECONDS must be between 1 and {}",
                MAX_SESSION_TTL_SECONDS
            );
        }

        let cookie_name = lookup("SESSION_COOKIE_NAME")
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "sid".to_string());

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            storage: StorageConfig {
                backend,
                database_url,
                max_connections,
                redis_url,
                redis_connection_timeout_secs,
                redis_command_timeout_secs,
            },
            session: SessionConfig {
                secret,
                ttl_seconds,
                cookie_name,
            },
        })
    }

    /// In-memory configuration for tests and local experiments
    pub fn for_memory(secret: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                database_url: None,
                max_connections: 1,
                redis_url: None,
                redis_connection_timeout_secs: 5,
                redis_command_timeout_secs: 10,
            },
            session: SessionConfig {
                secret: secret.into(),
                ttl_seconds: 604_800,
                cookie_name: "sid".to_string(),
            },
        }
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
