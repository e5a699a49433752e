//! Provider token commands.
//!
//! `keyhaven token set|get|delete <provider>`

use clap::Args;
use console::style;
use keyhaven_secrets::SecureStorageManager;

use super::prompt_hidden;

/// Token command arguments.
#[derive(Args)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommand,
}

#[derive(clap::Subcommand)]
pub enum TokenCommand {
    /// Store a provider token (prompts for value)
    Set {
        /// Provider id
        provider: String,

        /// Token value (if omitted, prompts for hidden input)
        #[arg(long)]
        value: Option<String>,
    },

    /// Print a stored provider token
    Get {
        /// Provider id
        provider: String,
    },

    /// Delete a provider token
    Delete {
        /// Provider id
        provider: String,
    },
}

/// Run the token command.
pub async fn run(args: TokenArgs, manager: &SecureStorageManager) -> anyhow::Result<()> {
    match args.command {
        TokenCommand::Set { provider, value } => {
            let token = match value {
                Some(v) => v,
                None => prompt_hidden(&format!("Enter token for '{provider}': "))?,
            };

            manager.store_provider_token(&provider, &token).await?;
            println!("{} Token for '{}' stored.", style("✓").green(), provider);
        }

        TokenCommand::Get { provider } => match manager.get_provider_token(&provider).await? {
            Some(token) => println!("{}", token.expose_secret()),
            None => anyhow::bail!("No token stored for '{}'", provider),
        },

        TokenCommand::Delete { provider } => {
            if manager.delete_provider_token(&provider).await {
                println!("{} Token for '{}' deleted.", style("✓").green(), provider);
            } else {
                println!("{} No token deleted for '{}'.", style("!").yellow(), provider);
            }
        }
    }

    Ok(())
}
