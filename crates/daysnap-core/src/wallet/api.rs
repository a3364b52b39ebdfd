use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{AuthToken, AuthorizedAccount, Base64Address};

/// App name shown by the wallet during authorization
const APP_NAME: &str = "daysnap";

const APP_URI: &str = "https://daysnap.app";

/// Relative to `APP_URI`
const APP_ICON: &str = "favicon.ico";

/// Identifies this app to the wallet on authorize/reauthorize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdentity {
    pub name: String,
    pub uri: String,
    pub icon: String,
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            name: APP_NAME.to_string(),
            uri: APP_URI.to_string(),
            icon: APP_ICON.to_string(),
        }
    }
}

/// Reply to a successful authorize or reauthorize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationResult {
    pub accounts: Vec<AuthorizedAccount>,
    pub auth_token: AuthToken,
}

/// Raw transaction signature bytes as returned by the wallet.
pub type TransactionSignature = Vec<u8>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Wallet connection failed: {0}")]
    Connection(String),

    #[error("Request rejected by wallet: {0}")]
    Rejected(String),

    #[error("Wallet protocol error: {0}")]
    Protocol(String),
}

/// Requests available inside an open wallet transaction.
#[async_trait]
pub trait WalletApi: Send + Sync {
    async fn authorize(&self, identity: &AppIdentity) -> Result<AuthorizationResult, TransportError>;

    async fn reauthorize(
        &self,
        auth_token: &AuthToken,
        identity: &AppIdentity,
    ) -> Result<AuthorizationResult, TransportError>;

    async fn deauthorize(&self, auth_token: &AuthToken) -> Result<(), TransportError>;

    async fn sign_and_send_transactions(
        &self,
        transactions: &[Vec<u8>],
    ) -> Result<Vec<TransactionSignature>, TransportError>;

    async fn sign_messages(
        &self,
        addresses: &[Base64Address],
        payloads: &[Vec<u8>],
    ) -> Result<Vec<Vec<u8>>, TransportError>;
}

/// Channel to a wallet application.
///
/// Every `open` is matched by a `close`, whatever happened in between.
/// Implementations must not allow two transactions to be open at once on
/// the same wallet connection.
#[async_trait]
pub trait WalletTransport: Send + Sync {
    async fn open(&self) -> Result<Box<dyn WalletApi>, TransportError>;

    async fn close(&self, wallet: Box<dyn WalletApi>);
}
