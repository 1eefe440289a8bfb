//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or ClientConfig::default()
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → passed by value to every client constructor
//! ```
//!
//! # Design Decisions
//! - No process-wide default host; the platform host lives in the config value
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    BackoffKind, ClientConfig, ConfirmationConfig, HttpConfig, LogFormat, ObservabilityConfig,
    PlatformConfig,
};
pub use validation::{validate_config, ValidationError};
