//! Wallet connection layer.
//!
//! `WalletTransport` opens a scoped connection to a wallet application and
//! hands back a `WalletApi` for the round-trips; `MobileWallet` pairs a
//! transport with the `AuthorizationStore` and runs each logical operation
//! inside exactly one transaction.

pub mod api;
pub mod mobile;
#[cfg(test)]
pub(crate) mod testing;

pub use api::{
    AppIdentity, AuthorizationResult, TransactionSignature, TransportError, WalletApi,
    WalletTransport,
};
pub use mobile::{MobileWallet, TransactionSigner, WalletError};
