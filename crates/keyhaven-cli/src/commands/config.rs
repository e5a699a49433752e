//! Encrypted configuration document commands.
//!
//! `keyhaven config put <key> <value>` stores a JSON document (or a plain
//! string) under the config namespace; `keyhaven config get <key>` prints it.

use clap::Args;
use console::style;
use keyhaven_secrets::SecureStorageManager;

use super::parse_document;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Encrypt and store a document
    Put {
        /// Document key
        key: String,

        /// Document as JSON; anything that is not JSON is stored as a string
        value: String,
    },

    /// Decrypt and print a document
    Get {
        /// Document key
        key: String,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, manager: &SecureStorageManager) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Put { key, value } => {
            let document = parse_document(&value);
            manager.store_encrypted_config(&key, &document).await?;
            println!("{} Document '{}' stored.", style("✓").green(), key);
        }

        ConfigCommand::Get { key } => match manager.get_encrypted_config(&key).await? {
            Some(document) => println!("{}", serde_json::to_string_pretty(&document)?),
            None => anyhow::bail!("No document stored under '{}'", key),
        },
    }

    Ok(())
}
