//! daysnap core library.
//!
//! Everything the daysnap front ends share: the wallet authorization
//! session, the mobile wallet facade, IPFS pinning and digital asset
//! clients, the daily snapshot flow, configuration and the local cache.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod snapshot;
pub mod utils;
pub mod wallet;

pub use auth::{Account, AuthError, AuthorizationSnapshot, AuthorizationStore};
pub use config::Config;
pub use snapshot::{NextAction, SnapshotError, SnapshotService};
pub use solana_pubkey::Pubkey;
pub use wallet::{AppIdentity, MobileWallet, WalletApi, WalletTransport};
