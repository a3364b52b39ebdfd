//! HTTP clients for the services daysnap talks to.
//!
//! - `PinataClient`: pins snapshot images and metadata documents to IPFS
//!   through the Pinata REST API (JWT bearer auth)
//! - `DasClient`: reads digital assets through the Solana DAS JSON-RPC
//!   methods (`getAssetsByCreator`, `getAsset`)

pub mod das;
pub mod error;
mod http;
pub mod pinata;

pub use das::DasClient;
pub use error::ApiError;
pub use pinata::PinataClient;
