//! The daily snapshot flow.
//!
//! `SnapshotService` ties the wallet session to the collaborators that do
//! the actual work: a `SnapshotStorage` for pinning images and metadata, an
//! `AssetReader` for listing minted assets, and an `AssetMinter` for
//! creating the NFT itself.

mod browse;
mod service;

use std::path::Path;

use async_trait::async_trait;
use solana_pubkey::Pubkey;
use thiserror::Error;

use crate::api::ApiError;
use crate::models::{CreateNftRequest, DigitalAsset, SnapshotMetadata};
use crate::wallet::{TransactionSigner, WalletError};

pub use browse::browse_snapshots;
pub use service::SnapshotService;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("No wallet connected")]
    NotConnected,

    #[error("Another snapshot operation is in progress")]
    Busy,

    #[error("A snapshot was already minted today")]
    AlreadyMintedToday,

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Minting failed: {0}")]
    Mint(anyhow::Error),
}

/// What the user should be offered next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    Wait,
    Connect,
    FetchSnapshots,
    CreateSnapshot,
    AllDone,
}

impl NextAction {
    pub fn label(&self) -> &'static str {
        match self {
            NextAction::Wait => "Loading...",
            NextAction::Connect => "Connect Wallet",
            NextAction::FetchSnapshots => "Fetch Snapshots",
            NextAction::CreateSnapshot => "Create Snapshot",
            NextAction::AllDone => "All Done!",
        }
    }
}

/// Content-addressed storage for snapshot images and metadata.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Pin an image file, returning its CID
    async fn pin_file(&self, path: &Path) -> Result<String, ApiError>;

    /// Pin a metadata document, returning its CID
    async fn pin_metadata(&self, metadata: &SnapshotMetadata) -> Result<String, ApiError>;

    async fn fetch_metadata(&self, uri: &str) -> Result<SnapshotMetadata, ApiError>;

    fn gateway_url(&self, cid: &str) -> String;
}

#[async_trait]
pub trait AssetReader: Send + Sync {
    async fn fetch_assets_by_creator(&self, creator: &Pubkey) -> Result<Vec<DigitalAsset>, ApiError>;

    async fn fetch_asset(&self, id: &str) -> Result<DigitalAsset, ApiError>;
}

/// Creates NFTs on chain, paying and signing through the given signer.
#[async_trait]
pub trait AssetMinter: Send + Sync {
    /// Returns the mint address of the new asset
    async fn create_nft(
        &self,
        signer: &dyn TransactionSigner,
        request: &CreateNftRequest,
    ) -> anyhow::Result<String>;
}
