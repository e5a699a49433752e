//! # keyhaven-core
//!
//! Shared building blocks for the Keyhaven credential store:
//!
//! - **Configuration**: loading, validation, and persistence of the JSON5 config file
//! - **Paths**: resolution of the base, config, and fallback storage directories
//! - **Secrets**: a zeroizing, redacting string type for plaintext credentials

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod secret;

pub use config::Config;
pub use error::ConfigError;
pub use secret::SecretString;
