use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "daysnap";

/// Keychain account under which the Pinata JWT is stored
const PINATA_JWT_ENTRY: &str = "pinata-jwt";

pub struct CredentialStore;

impl CredentialStore {
    fn entry() -> Result<Entry> {
        Entry::new(SERVICE_NAME, PINATA_JWT_ENTRY).context("Failed to create keyring entry")
    }

    /// Store the Pinata JWT in the OS keychain
    pub fn store_pinata_jwt(jwt: &str) -> Result<()> {
        Self::entry()?
            .set_password(jwt)
            .context("Failed to store Pinata JWT in keychain")?;
        Ok(())
    }

    /// Retrieve the Pinata JWT from the OS keychain
    pub fn pinata_jwt() -> Result<String> {
        Self::entry()?
            .get_password()
            .context("Failed to retrieve Pinata JWT from keychain")
    }

    pub fn delete_pinata_jwt() -> Result<()> {
        Self::entry()?
            .delete_credential()
            .context("Failed to delete Pinata JWT from keychain")?;
        Ok(())
    }

    pub fn has_pinata_jwt() -> bool {
        Self::entry()
            .map(|entry| entry.get_password().is_ok())
            .unwrap_or(false)
    }
}
