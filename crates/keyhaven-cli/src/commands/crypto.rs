//! Raw envelope commands: `keyhaven encrypt` and `keyhaven decrypt`.

use keyhaven_secrets::SecureStorageManager;

use super::prompt_hidden;

pub async fn encrypt(value: Option<String>, manager: &SecureStorageManager) -> anyhow::Result<()> {
    let plaintext = match value {
        Some(v) => v,
        None => prompt_hidden("Value to encrypt: ")?,
    };
    println!("{}", manager.encrypt_data(&plaintext).await?);
    Ok(())
}

pub async fn decrypt(envelope: &str, manager: &SecureStorageManager) -> anyhow::Result<()> {
    let plaintext = manager.decrypt_data(envelope.trim()).await?;
    println!("{}", plaintext.expose_secret());
    Ok(())
}
