//! `keyhaven backend`: report where secrets are kept.

use console::style;
use keyhaven_core::Config;
use keyhaven_secrets::{BackendKind, SecureStorageManager, VaultBackend};

pub fn run(config: &Config, manager: &SecureStorageManager) -> anyhow::Result<()> {
    match manager.backend_kind() {
        BackendKind::Vault => {
            println!("{} OS credential vault", style("vault").green().bold());
            println!(
                "  service: {}",
                VaultBackend::service_for(&config.storage.service_name)
            );
        }
        BackendKind::File => {
            println!("{} encrypted files", style("file").yellow().bold());
            println!("  directory: {}", config.storage_dir()?.display());
        }
    }
    Ok(())
}
