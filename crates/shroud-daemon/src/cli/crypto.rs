use super::commands::OutputFormat;
use super::utils::{field_line, print_json, read_json, read_stdin};
use anyhow::{Context, Result};
use shroud_crypto::EncryptedContent;
use shroud_types::SymmetricKey;
use std::io::Write;
use std::path::PathBuf;

pub fn encrypt_content(key: Option<String>, input: Option<String>, format: OutputFormat) -> Result<()> {
    let key = key
        .map(|hex| SymmetricKey::from_hex(hex.trim()))
        .transpose()
        .context("Key must be 64 hex characters")?;

    let plaintext = match input {
        Some(text) => text.into_bytes(),
        None => read_stdin()?,
    };

    let sealed = shroud_crypto::encrypt(&plaintext, key.as_ref())?;

    match format {
        OutputFormat::Json => print_json(&sealed)?,
        OutputFormat::Text => {
            field_line("Ciphertext:", &sealed.ciphertext);
            field_line("IV:", &sealed.iv);
            field_line("Auth tag:", &sealed.auth_tag);
            field_line("Key:", &sealed.key);
        }
    }
    Ok(())
}

pub fn decrypt_content(input: Option<PathBuf>) -> Result<()> {
    let sealed: EncryptedContent = match input {
        Some(path) => read_json(&path)?,
        None => serde_json::from_slice(&read_stdin()?).context("Failed to parse sealed content")?,
    };

    let plaintext = shroud_crypto::decrypt(&sealed)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&plaintext)?;
    stdout.flush()?;
    Ok(())
}
