//! In-memory store for the active wallet authorization.
//!
//! The store holds at most one `Session`. Round-trips to the wallet
//! (authorize, reauthorize, deauthorize) are serialized by an async mutex
//! that is held across the wallet call; the committed session sits behind a
//! plain `RwLock` that is only ever held for the synchronous
//! read-modify-write, so `switch_account` and `observe` never wait on a
//! wallet.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::wallet::{AppIdentity, WalletApi};

use super::{Account, AuthError, Session};

/// Read-only view of the store handed to UI code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationSnapshot {
    pub accounts: Option<Vec<Account>>,
    pub selected_account: Option<Account>,
}

pub struct AuthorizationStore {
    identity: AppIdentity,
    session: RwLock<Option<Session>>,
    round_trip: Mutex<()>,
}

impl AuthorizationStore {
    pub fn new(identity: AppIdentity) -> Self {
        Self {
            identity,
            session: RwLock::new(None),
            round_trip: Mutex::new(()),
        }
    }

    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Authorize a fresh session, or reauthorize the current one.
    ///
    /// Returns the selected account of the resulting session. On failure the
    /// previous session (if any) is left untouched.
    pub async fn authorize_session(&self, wallet: &dyn WalletApi) -> Result<Account, AuthError> {
        let _round_trip = self.round_trip.lock().await;

        let auth_token = self.read().as_ref().map(|s| s.auth_token().clone());
        let response = match auth_token {
            Some(ref token) => {
                debug!("Reauthorizing wallet session");
                wallet.reauthorize(token, &self.identity).await
            }
            None => {
                debug!(app = %self.identity.name, "Authorizing new wallet session");
                wallet.authorize(&self.identity).await
            }
        };

        let result = response.map_err(|e| {
            warn!(error = %e, "Wallet authorization failed");
            AuthError::AuthorizationFailed(e.to_string())
        })?;

        // Merge against the committed selection, which may have been
        // switched while the wallet call was outstanding.
        let mut session = self.write();
        let next = Session::from_result(&result, session.as_ref().map(Session::selected_account))
            .map_err(|e| match e {
                AuthError::InvalidAddress(address) => AuthError::AuthorizationFailed(format!(
                    "wallet returned an invalid address: {}",
                    address
                )),
                other => other,
            })?;

        let selected = next.selected_account().clone();
        info!(
            accounts = next.accounts().len(),
            selected = %selected.public_key,
            "Wallet session authorized"
        );
        *session = Some(next);
        Ok(selected)
    }

    /// Revoke the current session. Does nothing when there is no session.
    ///
    /// Local state is cleared once the wallet call completes, whether or not
    /// the wallet reported success.
    pub async fn deauthorize_session(&self, wallet: &dyn WalletApi) {
        let _round_trip = self.round_trip.lock().await;

        let auth_token = self.read().as_ref().map(|s| s.auth_token().clone());
        let Some(token) = auth_token else {
            debug!("No wallet session to deauthorize");
            return;
        };

        if let Err(e) = wallet.deauthorize(&token).await {
            warn!(error = %e, "Wallet deauthorize failed, clearing local session anyway");
        }

        *self.write() = None;
        info!("Wallet session cleared");
    }

    /// Select another account from the authorized set.
    pub fn switch_account(&self, next: &Account) -> Result<(), AuthError> {
        let mut session = self.write();
        match session.as_mut() {
            Some(current) => {
                current.select(next)?;
                debug!(selected = %next.public_key, "Switched wallet account");
                Ok(())
            }
            None => Err(AuthError::AccountNotAuthorized(next.address.clone())),
        }
    }

    pub fn observe(&self) -> AuthorizationSnapshot {
        match self.read().as_ref() {
            Some(session) => AuthorizationSnapshot {
                accounts: Some(session.accounts().to_vec()),
                selected_account: Some(session.selected_account().clone()),
            },
            None => AuthorizationSnapshot::default(),
        }
    }

    pub fn selected_account(&self) -> Option<Account> {
        self.read().as_ref().map(|s| s.selected_account().clone())
    }

    pub fn is_authorized(&self) -> bool {
        self.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthToken, AuthorizedAccount, Base64Address};
    use crate::wallet::testing::{authorized, ScriptedWallet, WalletCall};
    use crate::wallet::{AppIdentity, AuthorizationResult, TransactionSignature, TransportError};

    fn store() -> AuthorizationStore {
        AuthorizationStore::new(AppIdentity::default())
    }

    fn address(byte: u8) -> Base64Address {
        Base64Address::from_bytes(&[byte; 32])
    }

    fn account(byte: u8) -> Account {
        Account::from_authorized(&authorized(byte)).unwrap()
    }

    async fn established(accounts: &[u8]) -> (AuthorizationStore, ScriptedWallet) {
        let store = store();
        let wallet = ScriptedWallet::new();
        wallet.push_authorization(accounts, "token-1");
        store.authorize_session(&wallet).await.unwrap();
        (store, wallet)
    }

    #[tokio::test]
    async fn test_first_authorization_selects_first_account() {
        let (store, wallet) = established(&[1, 2]).await;

        let observed = store.observe();
        assert_eq!(observed.selected_account.unwrap().address, address(1));
        assert_eq!(observed.accounts.unwrap().len(), 2);
        assert_eq!(wallet.calls(), vec![WalletCall::Authorize]);
    }

    #[tokio::test]
    async fn test_reauthorize_keeps_selection_when_still_present() {
        let (store, wallet) = established(&[1, 2]).await;
        store.switch_account(&account(2)).unwrap();

        wallet.push_authorization(&[3, 2, 1], "token-2");
        let selected = store.authorize_session(&wallet).await.unwrap();

        assert_eq!(selected.address, address(2));
        assert_eq!(
            wallet.calls(),
            vec![
                WalletCall::Authorize,
                WalletCall::Reauthorize(AuthToken::new("token-1")),
            ]
        );
    }

    #[tokio::test]
    async fn test_reauthorize_reselects_when_selection_revoked() {
        let (store, wallet) = established(&[1, 2]).await;

        wallet.push_authorization(&[5, 6], "token-2");
        let selected = store.authorize_session(&wallet).await.unwrap();

        assert_eq!(selected.address, address(5));
        assert_eq!(store.selected_account().unwrap().address, address(5));
    }

    #[tokio::test]
    async fn test_failed_authorization_leaves_state_unchanged() {
        let (store, wallet) = established(&[1, 2]).await;
        let before = store.observe();

        wallet.push_failure(TransportError::Rejected("user declined".to_string()));
        let err = store.authorize_session(&wallet).await.unwrap_err();

        assert!(matches!(err, AuthError::AuthorizationFailed(_)));
        assert_eq!(store.observe(), before);
    }

    #[tokio::test]
    async fn test_failed_first_authorization_stays_absent() {
        let store = store();
        let wallet = ScriptedWallet::new();
        wallet.push_failure(TransportError::Connection("no wallet installed".to_string()));

        assert!(store.authorize_session(&wallet).await.is_err());
        assert!(!store.is_authorized());
    }

    #[tokio::test]
    async fn test_empty_account_list_is_authorization_failure() {
        let store = store();
        let wallet = ScriptedWallet::new();
        wallet.push_authorization(&[], "token-1");

        let err = store.authorize_session(&wallet).await.unwrap_err();
        assert!(matches!(err, AuthError::AuthorizationFailed(_)));
        assert!(!store.is_authorized());
    }

    #[tokio::test]
    async fn test_invalid_address_is_authorization_failure() {
        let store = store();
        let wallet = ScriptedWallet::new();
        wallet.push_raw_authorization(
            vec![AuthorizedAccount::new(Base64Address::new("short"), None)],
            "token-1",
        );

        let err = store.authorize_session(&wallet).await.unwrap_err();
        assert!(matches!(err, AuthError::AuthorizationFailed(_)));
    }

    #[tokio::test]
    async fn test_switch_to_unknown_account_fails() {
        let (store, _wallet) = established(&[1, 2]).await;

        let err = store.switch_account(&account(7)).unwrap_err();

        assert_eq!(err, AuthError::AccountNotAuthorized(address(7)));
        assert_eq!(store.selected_account().unwrap().address, address(1));
    }

    #[tokio::test]
    async fn test_switch_without_session_fails() {
        let store = store();
        assert!(matches!(
            store.switch_account(&account(1)),
            Err(AuthError::AccountNotAuthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_switch_changes_only_selection() {
        let (store, wallet) = established(&[1, 2]).await;
        let before = store.observe();

        store.switch_account(&account(2)).unwrap();

        let after = store.observe();
        assert_eq!(after.selected_account.unwrap().address, address(2));
        assert_eq!(after.accounts, before.accounts);

        // Token is unchanged: the next call reauthorizes with the first token
        wallet.push_authorization(&[1, 2], "token-2");
        store.authorize_session(&wallet).await.unwrap();
        assert_eq!(
            wallet.calls().last(),
            Some(&WalletCall::Reauthorize(AuthToken::new("token-1")))
        );
    }

    #[tokio::test]
    async fn test_deauthorize_clears_state_and_next_call_authorizes() {
        let (store, wallet) = established(&[1]).await;

        store.deauthorize_session(&wallet).await;
        assert_eq!(store.observe(), AuthorizationSnapshot::default());

        wallet.push_authorization(&[2], "token-2");
        store.authorize_session(&wallet).await.unwrap();
        assert_eq!(
            wallet.calls(),
            vec![
                WalletCall::Authorize,
                WalletCall::Deauthorize(AuthToken::new("token-1")),
                WalletCall::Authorize,
            ]
        );
    }

    #[tokio::test]
    async fn test_deauthorize_without_session_is_noop() {
        let store = store();
        let wallet = ScriptedWallet::new();

        store.deauthorize_session(&wallet).await;

        assert!(wallet.calls().is_empty());
        assert!(!store.is_authorized());
    }

    #[tokio::test]
    async fn test_deauthorize_failure_still_clears_state() {
        let (store, wallet) = established(&[1]).await;
        wallet.fail_deauthorize(TransportError::Connection("closed".to_string()));

        store.deauthorize_session(&wallet).await;

        assert!(!store.is_authorized());
    }

    /// Wallet whose user switches account while the reauthorize prompt is open.
    struct SwitchDuringReauthorize<'a> {
        store: &'a AuthorizationStore,
        switch_to: Account,
        inner: ScriptedWallet,
    }

    #[async_trait::async_trait]
    impl<'a> WalletApi for SwitchDuringReauthorize<'a> {
        async fn authorize(&self, identity: &AppIdentity) -> Result<AuthorizationResult, TransportError> {
            self.inner.authorize(identity).await
        }

        async fn reauthorize(
            &self,
            auth_token: &AuthToken,
            identity: &AppIdentity,
        ) -> Result<AuthorizationResult, TransportError> {
            self.store.switch_account(&self.switch_to).unwrap();
            self.inner.reauthorize(auth_token, identity).await
        }

        async fn deauthorize(&self, auth_token: &AuthToken) -> Result<(), TransportError> {
            self.inner.deauthorize(auth_token).await
        }

        async fn sign_and_send_transactions(
            &self,
            transactions: &[Vec<u8>],
        ) -> Result<Vec<TransactionSignature>, TransportError> {
            self.inner.sign_and_send_transactions(transactions).await
        }

        async fn sign_messages(
            &self,
            addresses: &[Base64Address],
            payloads: &[Vec<u8>],
        ) -> Result<Vec<Vec<u8>>, TransportError> {
            self.inner.sign_messages(addresses, payloads).await
        }
    }

    #[tokio::test]
    async fn test_switch_during_reauthorize_is_kept() {
        let (store, wallet) = established(&[1, 2, 3]).await;
        wallet.push_authorization(&[1, 2, 3], "token-2");
        let switching = SwitchDuringReauthorize {
            store: &store,
            switch_to: account(2),
            inner: wallet.clone(),
        };

        let selected = store.authorize_session(&switching).await.unwrap();

        assert_eq!(selected.address, address(2));
        assert_eq!(store.selected_account().unwrap().address, address(2));
        assert_eq!(store.observe().accounts.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_switch_during_reauthorize_to_revoked_account_reselects() {
        let (store, wallet) = established(&[1, 2]).await;
        wallet.push_authorization(&[1, 3], "token-2");
        let switching = SwitchDuringReauthorize {
            store: &store,
            switch_to: account(2),
            inner: wallet.clone(),
        };

        let selected = store.authorize_session(&switching).await.unwrap();

        assert_eq!(selected.address, address(1));
    }
}
