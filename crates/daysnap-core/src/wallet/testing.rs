//! Scripted wallet doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::auth::{AuthToken, AuthorizedAccount, Base64Address};

use super::{
    AppIdentity, AuthorizationResult, TransactionSignature, TransportError, WalletApi,
    WalletTransport,
};

pub(crate) fn authorized(byte: u8) -> AuthorizedAccount {
    AuthorizedAccount::new(Base64Address::from_bytes(&[byte; 32]), None)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WalletCall {
    Authorize,
    Reauthorize(AuthToken),
    Deauthorize(AuthToken),
    SignAndSend(usize),
    SignMessages(Vec<Base64Address>),
}

#[derive(Default)]
struct Script {
    authorizations: VecDeque<Result<AuthorizationResult, TransportError>>,
    signatures: VecDeque<TransactionSignature>,
    deauthorize_error: Option<TransportError>,
    calls: Vec<WalletCall>,
}

/// Wallet that replays queued replies and records every request.
#[derive(Clone, Default)]
pub(crate) struct ScriptedWallet {
    script: Arc<Mutex<Script>>,
}

impl ScriptedWallet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_authorization(&self, accounts: &[u8], token: &str) {
        self.push_raw_authorization(accounts.iter().map(|b| authorized(*b)).collect(), token);
    }

    pub(crate) fn push_raw_authorization(&self, accounts: Vec<AuthorizedAccount>, token: &str) {
        self.script.lock().unwrap().authorizations.push_back(Ok(AuthorizationResult {
            accounts,
            auth_token: AuthToken::new(token),
        }));
    }

    pub(crate) fn push_failure(&self, error: TransportError) {
        self.script.lock().unwrap().authorizations.push_back(Err(error));
    }

    pub(crate) fn push_signature(&self, signature: TransactionSignature) {
        self.script.lock().unwrap().signatures.push_back(signature);
    }

    pub(crate) fn fail_deauthorize(&self, error: TransportError) {
        self.script.lock().unwrap().deauthorize_error = Some(error);
    }

    pub(crate) fn calls(&self) -> Vec<WalletCall> {
        self.script.lock().unwrap().calls.clone()
    }

    fn next_authorization(&self, call: WalletCall) -> Result<AuthorizationResult, TransportError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(call);
        script
            .authorizations
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Protocol("no scripted reply".to_string())))
    }
}

#[async_trait]
impl WalletApi for ScriptedWallet {
    async fn authorize(&self, _identity: &AppIdentity) -> Result<AuthorizationResult, TransportError> {
        self.next_authorization(WalletCall::Authorize)
    }

    async fn reauthorize(
        &self,
        auth_token: &AuthToken,
        _identity: &AppIdentity,
    ) -> Result<AuthorizationResult, TransportError> {
        self.next_authorization(WalletCall::Reauthorize(auth_token.clone()))
    }

    async fn deauthorize(&self, auth_token: &AuthToken) -> Result<(), TransportError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(WalletCall::Deauthorize(auth_token.clone()));
        match script.deauthorize_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn sign_and_send_transactions(
        &self,
        transactions: &[Vec<u8>],
    ) -> Result<Vec<TransactionSignature>, TransportError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(WalletCall::SignAndSend(transactions.len()));
        Ok(script.signatures.drain(..).collect())
    }

    async fn sign_messages(
        &self,
        addresses: &[Base64Address],
        payloads: &[Vec<u8>],
    ) -> Result<Vec<Vec<u8>>, TransportError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(WalletCall::SignMessages(addresses.to_vec()));
        Ok(payloads.to_vec())
    }
}

#[derive(Default)]
struct TransportState {
    opened: usize,
    closed: usize,
    open_error: Option<TransportError>,
}

/// Transport that always hands out the same scripted wallet.
#[derive(Clone)]
pub(crate) struct ScriptedTransport {
    wallet: ScriptedWallet,
    state: Arc<Mutex<TransportState>>,
}

impl ScriptedTransport {
    pub(crate) fn new(wallet: ScriptedWallet) -> Self {
        Self {
            wallet,
            state: Arc::new(Mutex::new(TransportState::default())),
        }
    }

    pub(crate) fn fail_open(&self, error: TransportError) {
        self.state.lock().unwrap().open_error = Some(error);
    }

    pub(crate) fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    pub(crate) fn closed(&self) -> usize {
        self.state.lock().unwrap().closed
    }
}

#[async_trait]
impl WalletTransport for ScriptedTransport {
    async fn open(&self) -> Result<Box<dyn WalletApi>, TransportError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.open_error.take() {
            return Err(error);
        }
        state.opened += 1;
        Ok(Box::new(self.wallet.clone()))
    }

    async fn close(&self, _wallet: Box<dyn WalletApi>) {
        self.state.lock().unwrap().closed += 1;
    }
}
