//! Gateway configuration with validation.

use crate::domain::operations::ContractRole;
use crate::domain::types::DiscoveryOptions;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Ledger network, identity and profile settings
    pub network: NetworkConfig,
    /// Deployed contract names
    pub contracts: ContractsConfig,
    /// Per-stage timeouts
    pub timeouts: TimeoutConfig,
    /// HTTP binding
    pub http: HttpConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Log output
    pub logging: LoggingConfig,
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.channel.trim().is_empty() {
            return Err(ConfigError::MissingValue("network.channel"));
        }
        if self.network.identity.trim().is_empty() {
            return Err(ConfigError::MissingValue("network.identity"));
        }
        if self.contracts.access_control.trim().is_empty() {
            return Err(ConfigError::MissingValue("contracts.access_control"));
        }
        if self.contracts.security_audit.trim().is_empty() {
            return Err(ConfigError::MissingValue("contracts.security_audit"));
        }

        for (name, value) in [
            ("connection", self.timeouts.connection),
            ("submit", self.timeouts.submit),
            ("evaluate", self.timeouts.evaluate),
        ] {
            if value.is_zero() {
                return Err(ConfigError::InvalidTimeout(format!(
                    "{} timeout cannot be 0",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Defaults overlaid with process environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `PORT` | `http.port` |
    /// | `LEDGER_CHANNEL` | `network.channel` |
    /// | `LEDGER_IDENTITY` | `network.identity` |
    /// | `LEDGER_WALLET_PATH` | `network.wallet_path` |
    /// | `LEDGER_CONNECTION_PROFILE` | `network.connection_profile` |
    /// | `LOG_LEVEL` | `logging.level` |
    /// | `LOG_JSON` | `logging.json` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.http.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT", port))?;
        }
        if let Some(channel) = lookup("LEDGER_CHANNEL") {
            self.network.channel = channel;
        }
        if let Some(identity) = lookup("LEDGER_IDENTITY") {
            self.network.identity = identity;
        }
        if let Some(path) = lookup("LEDGER_WALLET_PATH") {
            self.network.wallet_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("LEDGER_CONNECTION_PROFILE") {
            self.network.connection_profile = PathBuf::from(path);
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("LOG_JSON") {
            self.logging.json = match json.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(ConfigError::InvalidValue("LOG_JSON", json)),
            };
        }
        Ok(self)
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// Ledger network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Channel every operation is dispatched on
    pub channel: String,
    /// Wallet label of the service identity
    pub identity: String,
    /// Directory holding `<label>.id` identity files
    pub wallet_path: PathBuf,
    /// Connection profile JSON file
    pub connection_profile: PathBuf,
    /// Discovery settings for new sessions
    pub discovery: DiscoveryOptions,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            channel: "security-channel".to_string(),
            identity: "admin".to_string(),
            wallet_path: PathBuf::from("wallet"),
            connection_profile: PathBuf::from("connection-org1.json"),
            discovery: DiscoveryOptions::default(),
        }
    }
}

/// Names of the deployed contracts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractsConfig {
    pub access_control: String,
    pub security_audit: String,
}

impl ContractsConfig {
    pub fn name_for(&self, role: ContractRole) -> &str {
        match role {
            ContractRole::AccessControl => &self.access_control,
            ContractRole::SecurityAudit => &self.security_audit,
        }
    }
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            access_control: "accesscontrol".to_string(),
            security_audit: "securityaudit".to_string(),
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Identity lookup, profile load and session open combined
    #[serde(with = "humantime_serde")]
    pub connection: Duration,
    /// Write calls. Expiry leaves the outcome ambiguous.
    #[serde(with = "humantime_serde")]
    pub submit: Duration,
    /// Read-only calls
    #[serde(with = "humantime_serde")]
    pub evaluate: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connection: Duration::from_secs(10),
            submit: Duration::from_secs(30),
            evaluate: Duration::from_secs(10),
        }
    }
}

/// HTTP binding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 3000)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS
    pub enabled: bool,
    /// Allowed origins ("*" for all)
    pub allowed_origins: Vec<String>,
    /// Allowed methods
    pub allowed_methods: Vec<String>,
    /// Allowed headers
    pub allowed_headers: Vec<String>,
    /// Max age for preflight cache, in seconds
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()],
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            max_age: 86400, // 24 hours
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// JSON formatted output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing value: {0}")]
    MissingValue(&'static str),

    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(&'static str, String),

    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}
