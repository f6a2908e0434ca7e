use axum::http::HeaderValue;
use depot_cloud::ConfigError;

/// Default request body ceiling for uploads (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Where asset metadata is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    /// Process-local store; contents are lost on restart.
    Memory,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except
/// `DATABASE_URL`, which the PostgreSQL backend requires.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on draining in-flight publishes at shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Maximum accepted request body in bytes.
    pub max_upload_bytes: usize,
    pub store: StoreBackend,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                       |
    /// | `MAX_UPLOAD_BYTES`        | `10485760`                 |
    /// | `STORE_BACKEND`           | `postgres` (or `memory`)   |
    /// | `DATABASE_URL`            | required for `postgres`    |
    /// | `DATABASE_MAX_CONNECTIONS`| `20`                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(var("PORT"), "PORT", 3000u16)?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    value: origin.clone(),
                    reason: e.to_string(),
                })?;
        }

        let request_timeout_secs = parse_or(var("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS", 30u64)?;
        let shutdown_timeout_secs =
            parse_or(var("SHUTDOWN_TIMEOUT_SECS"), "SHUTDOWN_TIMEOUT_SECS", 30u64)?;
        let max_upload_bytes =
            parse_or(var("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        let backend = var("STORE_BACKEND").unwrap_or_else(|| "postgres".into());
        let store = match backend.trim().to_ascii_lowercase().as_str() {
            "postgres" => StoreBackend::Postgres {
                database_url: var("DATABASE_URL")
                    .ok_or(ConfigError::Missing { var: "DATABASE_URL" })?,
                max_connections: parse_or(
                    var("DATABASE_MAX_CONNECTIONS"),
                    "DATABASE_MAX_CONNECTIONS",
                    depot_db::DEFAULT_MAX_CONNECTIONS,
                )?,
            },
            "memory" => StoreBackend::Memory,
            _ => {
                return Err(ConfigError::Invalid {
                    var: "STORE_BACKEND",
                    value: backend,
                    reason: "expected 'postgres' or 'memory'".into(),
                })
            }
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            max_upload_bytes,
            store,
        })
    }
}

fn parse_or<T>(value: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
