//! Process configuration, read from the environment (and `.env` if present).

use std::net::SocketAddr;

use anyhow::{Context, Result, bail};

use carehub_observability::LogFormat;

const DEV_JWT_SECRET: &str = "carehub-dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// `None` runs on in-memory stores.
    pub database: Option<DatabaseConfig>,
    /// Allowed CORS origins; empty disables cross-origin access.
    pub cors_origins: Vec<String>,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (blank values count as unset).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let dev_mode = get("CAREHUB_ENV").is_some_and(|env| env.eq_ignore_ascii_case("dev"));

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid BIND_ADDR")?;

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None if dev_mode => DEV_JWT_SECRET.to_string(),
            None => bail!("JWT_SECRET is required (set CAREHUB_ENV=dev to use a development default)"),
        };

        let database = match get("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: get("DATABASE_MAX_CONNECTIONS")
                    .map(|v| v.parse::<u32>().context("Invalid DATABASE_MAX_CONNECTIONS"))
                    .transpose()?
                    .unwrap_or(10),
            }),
            None => None,
        };

        let cors_origins = get("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let log_format = match get("LOG_FORMAT") {
            Some(v) => v.parse::<LogFormat>().map_err(anyhow::Error::msg).context("Invalid LOG_FORMAT")?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            database,
            cors_origins,
            log_format,
        })
    }

    /// True when tokens are signed with the built-in development secret.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}
