use std::sync::Arc;

use async_trait::async_trait;
use solana_pubkey::Pubkey;
use thiserror::Error;
use tracing::debug;

use crate::auth::{Account, AuthError, AuthorizationStore};

use super::{TransactionSignature, TransportError, WalletApi, WalletTransport};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Wallet returned no {0}")]
    EmptyResponse(&'static str),
}

/// Something that can sign and submit transactions for the selected account.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    fn public_key(&self) -> Option<Pubkey>;

    async fn sign_and_send_transaction(
        &self,
        transaction: Vec<u8>,
    ) -> Result<TransactionSignature, WalletError>;
}

/// Wallet operations as the app uses them.
///
/// Each public method opens one transport transaction, (re)authorizes the
/// session where needed, performs its request and closes the transaction.
pub struct MobileWallet<T> {
    transport: T,
    store: Arc<AuthorizationStore>,
}

impl<T: WalletTransport> MobileWallet<T> {
    pub fn new(transport: T, store: Arc<AuthorizationStore>) -> Self {
        Self { transport, store }
    }

    pub fn store(&self) -> &Arc<AuthorizationStore> {
        &self.store
    }

    async fn open(&self) -> Result<Box<dyn WalletApi>, TransportError> {
        debug!("Opening wallet transaction");
        self.transport.open().await
    }

    async fn finish<R>(&self, wallet: Box<dyn WalletApi>, result: R) -> R {
        self.transport.close(wallet).await;
        debug!("Closed wallet transaction");
        result
    }

    /// Authorize (or reauthorize) and return the selected account.
    pub async fn connect(&self) -> Result<Account, WalletError> {
        // Failing to reach the wallet is an authorization failure to callers
        let wallet = self
            .open()
            .await
            .map_err(|e| AuthError::AuthorizationFailed(e.to_string()))?;
        let result = self
            .store
            .authorize_session(wallet.as_ref())
            .await
            .map_err(WalletError::from);
        self.finish(wallet, result).await
    }

    pub async fn disconnect(&self) -> Result<(), WalletError> {
        if !self.store.is_authorized() {
            return Ok(());
        }
        let wallet = self.open().await?;
        self.store.deauthorize_session(wallet.as_ref()).await;
        self.finish(wallet, Ok(())).await
    }

    pub async fn sign_and_send_transaction(
        &self,
        transaction: Vec<u8>,
    ) -> Result<TransactionSignature, WalletError> {
        let wallet = self
            .open()
            .await
            .map_err(|e| AuthError::AuthorizationFailed(e.to_string()))?;
        let result = self.sign_and_send_in(wallet.as_ref(), transaction).await;
        self.finish(wallet, result).await
    }

    async fn sign_and_send_in(
        &self,
        wallet: &dyn WalletApi,
        transaction: Vec<u8>,
    ) -> Result<TransactionSignature, WalletError> {
        self.store.authorize_session(wallet).await?;
        let signatures = wallet.sign_and_send_transactions(&[transaction]).await?;
        signatures
            .into_iter()
            .next()
            .ok_or(WalletError::EmptyResponse("transaction signature"))
    }

    /// Sign an arbitrary message with the selected account.
    pub async fn sign_message(&self, message: Vec<u8>) -> Result<Vec<u8>, WalletError> {
        let wallet = self
            .open()
            .await
            .map_err(|e| AuthError::AuthorizationFailed(e.to_string()))?;
        let result = self.sign_message_in(wallet.as_ref(), message).await;
        self.finish(wallet, result).await
    }

    async fn sign_message_in(
        &self,
        wallet: &dyn WalletApi,
        message: Vec<u8>,
    ) -> Result<Vec<u8>, WalletError> {
        let account = self.store.authorize_session(wallet).await?;
        let signed = wallet.sign_messages(&[account.address], &[message]).await?;
        signed
            .into_iter()
            .next()
            .ok_or(WalletError::EmptyResponse("signed message"))
    }
}

#[async_trait]
impl<T: WalletTransport> TransactionSigner for MobileWallet<T> {
    fn public_key(&self) -> Option<Pubkey> {
        self.store.selected_account().map(|a| a.public_key)
    }

    async fn sign_and_send_transaction(
        &self,
        transaction: Vec<u8>,
    ) -> Result<TransactionSignature, WalletError> {
        MobileWallet::sign_and_send_transaction(self, transaction).await
    }
}
