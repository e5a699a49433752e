//! CLI command implementations.

pub mod backend;
pub mod config;
pub mod crypto;
pub mod settings;
pub mod token;

/// Read a secret from the terminal without echoing it.
pub(crate) fn prompt_hidden(prompt: &str) -> anyhow::Result<String> {
    let value = rpassword::prompt_password(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to read input: {}", e))?;
    if value.is_empty() {
        anyhow::bail!("Value must not be empty");
    }
    Ok(value)
}

/// Parse a command-line document: JSON when it parses, otherwise a plain
/// string.
pub(crate) fn parse_document(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}
