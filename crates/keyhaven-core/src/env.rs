//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable as a boolean.
pub fn get_bool(name: &str) -> bool {
    get_var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Environment variable names understood by Keyhaven.
pub mod vars {
    /// Keyhaven home directory override.
    pub const KEYHAVEN_HOME: &str = "KEYHAVEN_HOME";

    /// Keyhaven config file override.
    pub const KEYHAVEN_CONFIG: &str = "KEYHAVEN_CONFIG";

    /// Log filter (takes the same syntax as `RUST_LOG`).
    pub const KEYHAVEN_LOG: &str = "KEYHAVEN_LOG";

    /// Force the file backend regardless of the configured preference.
    pub const KEYHAVEN_FILE_BACKEND: &str = "KEYHAVEN_FILE_BACKEND";
}
