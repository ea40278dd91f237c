use reqwest::Url;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Base address of the agent backend, e.g. `http://127.0.0.1:8000`.
    pub agent_base_url: Url,
    /// Upper bound on one backend call. `None` leaves it to the transport.
    pub agent_timeout: Option<Duration>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let agent_base_str =
            std::env::var("AGENT_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
        let agent_base_url = Url::parse(&agent_base_str)
            .map_err(|e| ConfigError::InvalidValue("AGENT_BASE_URL".to_string(), e.to_string()))?;
        if !matches!(agent_base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue(
                "AGENT_BASE_URL".to_string(),
                format!("unsupported scheme '{}'", agent_base_url.scheme()),
            ));
        }

        let timeout_str = std::env::var("AGENT_TIMEOUT_SECS").unwrap_or_else(|_| "120".to_string());
        let timeout_secs = timeout_str.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                "AGENT_TIMEOUT_SECS".to_string(),
                format!("'{}' is not a whole number of seconds", timeout_str),
            )
        })?;
        let agent_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            agent_base_url,
            agent_timeout,
            log_level,
        })
    }
}
