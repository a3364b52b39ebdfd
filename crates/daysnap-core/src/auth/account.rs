use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use solana_pubkey::Pubkey;

use super::AuthError;

/// Base64-encoded account address, as handed out by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Base64Address(String);

impl Base64Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Encode raw key bytes the way the wallet does.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(STANDARD.encode(bytes))
    }

    /// Decode into a Solana public key. Anything other than 32 bytes is rejected.
    pub fn to_public_key(&self) -> Result<Pubkey, AuthError> {
        let bytes = STANDARD
            .decode(&self.0)
            .map_err(|_| AuthError::InvalidAddress(self.0.clone()))?;
        let key: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AuthError::InvalidAddress(self.0.clone()))?;
        Ok(Pubkey::new_from_array(key))
    }
}

impl fmt::Display for Base64Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque token issued by the wallet, needed to reauthorize or deauthorize.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep tokens out of logs.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// Account entry exactly as returned by an authorize round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedAccount {
    pub address: Base64Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl AuthorizedAccount {
    pub fn new(address: Base64Address, label: Option<String>) -> Self {
        Self { address, label }
    }
}

/// An authorized account with its public key resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: Base64Address,
    pub label: Option<String>,
    pub public_key: Pubkey,
}

impl Account {
    pub fn from_authorized(account: &AuthorizedAccount) -> Result<Self, AuthError> {
        Ok(Self {
            public_key: account.address.to_public_key()?,
            address: account.address.clone(),
            label: account.label.clone(),
        })
    }

    /// Label if the wallet supplied one, otherwise the base58 key.
    pub fn display_name(&self) -> String {
        match self.label {
            Some(ref label) if !label.is_empty() => label.clone(),
            _ => self.public_key.to_string(),
        }
    }

    /// Two accounts refer to the same wallet address.
    pub fn same_address(&self, other: &Account) -> bool {
        self.address == other.address
    }
}
