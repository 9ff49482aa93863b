//! Configuration management for the MCP server.
//!
//! Configuration is resolved once at startup, from defaults overridden by
//! environment variables (optionally loaded from a `.env` file), and then
//! threaded through the server. Nothing reads the environment afterwards.

use super::transport::TransportConfig;
use crate::domains::tools::upstream::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Environment variable holding the upstream credential.
pub const API_KEY_ENV: &str = "KUAIDI100_API_KEY";

/// Default upstream request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Upstream API credentials for non-contextual transports.
    pub credentials: CredentialsConfig,

    /// Upstream API endpoint configuration.
    pub upstream: UpstreamConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,

    /// Instructions reported to clients on initialization.
    pub instructions: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Configuration for the upstream credential.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// kuaidi100 API key.
    /// Get one at: https://poll.kuaidi100.com/manager/page/myinfo/enterprise
    pub kuaidi100_api_key: Option<String>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field(
                "kuaidi100_api_key",
                &self.kuaidi100_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Configuration for the upstream HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL the endpoint name is appended to.
    pub base_url: String,

    /// Per-request timeout in seconds; `None` leaves the client default.
    pub timeout_secs: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "kuaidi100_mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                instructions: "This is a MCP server for kuaidi100 API.".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
            credentials: CredentialsConfig::default(),
            upstream: UpstreamConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Server settings use the `MCP_` prefix (`MCP_SERVER_NAME`,
    /// `MCP_LOG_LEVEL`, `MCP_UPSTREAM_BASE_URL`, ...). The credential is read
    /// from `KUAIDI100_API_KEY`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(timestamps) = std::env::var("MCP_LOG_TIMESTAMPS") {
            config.logging.with_timestamps = timestamps.to_lowercase() != "false" && timestamps != "0";
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        if let Ok(base_url) = std::env::var("MCP_UPSTREAM_BASE_URL") {
            config.upstream.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("MCP_UPSTREAM_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(0) => config.upstream.timeout_secs = None,
                Ok(secs) => config.upstream.timeout_secs = Some(secs),
                Err(_) => warn!(
                    "Ignoring invalid MCP_UPSTREAM_TIMEOUT_SECS={:?}, using {}s",
                    timeout, DEFAULT_TIMEOUT_SECS
                ),
            }
        }

        match std::env::var(API_KEY_ENV) {
            Ok(api_key) if !api_key.is_empty() => {
                config.credentials.kuaidi100_api_key = Some(api_key);
                info!("{} loaded from environment", API_KEY_ENV);
            }
            _ => {
                warn!(
                    "{} not set - STDIO tool calls will fail until it is provided. \
                     HTTP callers must send it as a request header.",
                    API_KEY_ENV
                );
            }
        }

        config
    }
}
