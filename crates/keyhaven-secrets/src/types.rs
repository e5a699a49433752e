//! Record identifiers and backend metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace for provider API tokens.
pub const PROVIDER_NAMESPACE: &str = "provider";

/// Namespace for encrypted configuration documents.
pub const CONFIG_NAMESPACE: &str = "config";

/// Config key under which system settings are stored.
pub const SYSTEM_SETTINGS_KEY: &str = "system-settings";

/// Identifies one stored secret: a `(namespace, account)` pair.
///
/// Writing the same pair twice overwrites the earlier value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SecretKey<'a> {
    pub namespace: &'a str,
    pub account: &'a str,
}

impl<'a> SecretKey<'a> {
    pub fn new(namespace: &'a str, account: &'a str) -> Self {
        Self { namespace, account }
    }

    /// Account name used inside the OS vault (`namespace:account`).
    pub fn vault_account(&self) -> String {
        format!("{}:{}", self.namespace, self.account)
    }

    /// File name used by the file backend.
    ///
    /// Every character outside `[A-Za-z0-9]` becomes `_`, so distinct pairs
    /// can map to the same file (`("a-b", "c")` and `("a_b", "c")`, or
    /// `("a", "b_c")` and `("a_b", "c")`). Such pairs overwrite each other.
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.enc",
            sanitize(self.namespace),
            sanitize(self.account)
        )
    }
}

fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Which backend a manager ended up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// The host operating system's credential vault.
    Vault,
    /// Encrypted files under a private directory.
    File,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vault => "vault",
            Self::File => "file",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
