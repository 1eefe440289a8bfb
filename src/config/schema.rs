//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the clients.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default platform host used when no host is configured.
pub const DEFAULT_PLATFORM_HOST: &str = "https://app.blockcluster.io";

/// Root configuration shared by every client.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Platform endpoint settings.
    pub platform: PlatformConfig,

    /// HTTP transport settings.
    pub http: HttpConfig,

    /// Transaction confirmation polling.
    pub confirmation: ConfirmationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Platform endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PlatformConfig {
    /// Base URL of the platform API (scheme + host, no trailing path).
    pub host: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PLATFORM_HOST.to_string(),
        }
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds. Downloads are bounded until headers arrive.
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// User agent sent with every request.
    pub user_agent: String,

    /// Scheme used to reach ledger nodes by location domain.
    pub node_scheme: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: concat!("blockcluster-rs/", env!("CARGO_PKG_VERSION")).to_string(),
            node_scheme: "https".to_string(),
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Delay strategy between confirmation rounds.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// Same delay after every failed round.
    #[default]
    Fixed,
    /// Doubling delay with jitter, capped at `max_delay_ms`.
    Exponential,
}

/// Confirmation polling configuration.
///
/// `max_rounds` and `deadline_secs` are unset by default: the poller keeps
/// going until every receipt is observed or the caller cancels it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Delay between rounds in milliseconds (base delay for exponential).
    pub poll_interval_ms: u64,

    /// Give up after this many rounds.
    pub max_rounds: Option<u32>,

    /// Give up once this many seconds have elapsed.
    pub deadline_secs: Option<u64>,

    /// Delay strategy.
    pub backoff: BackoffKind,

    /// Upper bound on the exponential delay in milliseconds.
    pub max_delay_ms: u64,

    /// Bound on a single receipt lookup; a lookup that exceeds it fails the round.
    pub lookup_timeout_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 3000,
            max_rounds: None,
            deadline_secs: None,
            backoff: BackoffKind::Fixed,
            max_delay_ms: 30_000,
            lookup_timeout_ms: 10_000,
        }
    }
}

impl ConfirmationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level directive (trace, debug, info, warn, error or a full filter).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
