//! Data models for daysnap.
//!
//! - `DigitalAsset`, `AssetCreator`: on-chain NFTs as read from the DAS API
//! - `CreateNftRequest`: what the minter needs to create one
//! - `Snapshot`, `SnapshotMetadata`: the daily photo and its pinned document
//! - `Cluster`: which Solana network to talk to

pub mod asset;
pub mod cluster;
pub mod snapshot;

pub use asset::{AssetCreator, CreateNftRequest, DigitalAsset};
pub use cluster::Cluster;
pub use snapshot::{Snapshot, SnapshotMetadata};
