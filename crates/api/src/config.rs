//! Process configuration, read once from the environment at startup.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use stockroom_observability::LogFormat;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not a valid port: {value}")]
    InvalidPort { name: &'static str, value: String },

    #[error("{name} is not a valid IP address: {value}")]
    InvalidAddr { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `BIND_ADDR`, default `0.0.0.0`.
    pub bind_addr: IpAddr,
    /// `PORT`, default 8080.
    pub port: u16,
    /// `DATABASE_URL`; unset means the in-memory store.
    pub database_url: Option<String>,
    /// `ASSETS_DIR`: directory holding the compiled dashboard bundle (served under `/pkg`).
    pub assets_dir: Option<PathBuf>,
    /// `LOG_FORMAT`: `json` (default) or `pretty`.
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            database_url: None,
            assets_dir: None,
            log_format: LogFormat::Json,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(value) = get("PORT") {
            config.port = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort { name: "PORT", value })?;
        }

        if let Some(value) = get("BIND_ADDR") {
            config.bind_addr = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidAddr { name: "BIND_ADDR", value })?;
        }

        config.database_url = get("DATABASE_URL");
        config.assets_dir = get("ASSETS_DIR").map(PathBuf::from);

        if let Some(value) = get("LOG_FORMAT") {
            config.log_format = LogFormat::from_env_value(&value);
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
