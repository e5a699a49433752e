//! System settings commands.

use clap::Args;
use console::style;
use keyhaven_secrets::SecureStorageManager;

use super::parse_document;

/// Settings command arguments.
#[derive(Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(clap::Subcommand)]
pub enum SettingsCommand {
    /// Replace the stored system settings
    Put {
        /// Settings as JSON
        value: String,
    },

    /// Print the stored system settings
    Get,
}

/// Run the settings command.
pub async fn run(args: SettingsArgs, manager: &SecureStorageManager) -> anyhow::Result<()> {
    match args.command {
        SettingsCommand::Put { value } => {
            let settings = parse_document(&value);
            if !settings.is_object() {
                anyhow::bail!("System settings must be a JSON object");
            }
            manager.store_system_settings(&settings).await?;
            println!("{} System settings stored.", style("✓").green());
        }

        SettingsCommand::Get => match manager.get_system_settings().await? {
            Some(settings) => println!("{}", serde_json::to_string_pretty(&settings)?),
            None => println!("{} No system settings stored.", style("!").yellow()),
        },
    }

    Ok(())
}
