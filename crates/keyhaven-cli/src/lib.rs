//! Keyhaven command-line interface.

pub mod commands;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use keyhaven_core::Config;
use keyhaven_secrets::SecureStorageManager;

/// Keyhaven - secure credential storage
#[derive(Parser)]
#[command(name = "keyhaven")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "KEYHAVEN_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage provider API tokens
    Token(commands::token::TokenArgs),

    /// Store and load encrypted configuration documents
    Config(commands::config::ConfigArgs),

    /// Store and load system settings
    Settings(commands::settings::SettingsArgs),

    /// Encrypt a value with the host-bound key and print the envelope
    Encrypt {
        /// Value to encrypt (if omitted, prompts for hidden input)
        value: Option<String>,
    },

    /// Decrypt an envelope produced by `encrypt`
    Decrypt {
        /// Envelope (`nonce:tag:ciphertext`)
        envelope: String,
    },

    /// Show which storage backend is active
    Backend,

    /// Show version information
    Version,
}

/// Load and validate configuration from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_or_default(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load_default().context("failed to load config")?,
    };
    config.validate()?;
    Ok(config)
}

/// Run the CLI with the given arguments.
///
/// The storage manager is built once here and shared with every command.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    if let Commands::Version = cli.command {
        println!("keyhaven {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let manager = Arc::new(
        SecureStorageManager::new(&config)
            .await
            .context("failed to open secure storage")?,
    );

    match cli.command {
        Commands::Token(args) => commands::token::run(args, &manager).await,
        Commands::Config(args) => commands::config::run(args, &manager).await,
        Commands::Settings(args) => commands::settings::run(args, &manager).await,
        Commands::Encrypt { value } => commands::crypto::encrypt(value, &manager).await,
        Commands::Decrypt { envelope } => commands::crypto::decrypt(&envelope, &manager).await,
        Commands::Backend => commands::backend::run(&config, &manager),
        Commands::Version => Ok(()),
    }
}
