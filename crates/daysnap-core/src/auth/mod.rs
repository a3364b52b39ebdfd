//! Wallet authorization module.
//!
//! This module provides:
//! - `AuthorizationStore`: the single in-memory wallet session and the
//!   operations that establish, refresh, switch and tear it down
//! - `Account` / `Session`: the authorized addresses and auth token
//! - `CredentialStore`: OS keychain storage for the Pinata JWT
//!
//! The wallet session is never written to disk; every launch starts
//! unauthorized.

pub mod account;
pub mod credentials;
pub mod error;
pub mod session;
pub mod store;

pub use account::{Account, AuthToken, AuthorizedAccount, Base64Address};
pub use credentials::CredentialStore;
pub use error::AuthError;
pub use session::Session;
pub use store::{AuthorizationSnapshot, AuthorizationStore};
