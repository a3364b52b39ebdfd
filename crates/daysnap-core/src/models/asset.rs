use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCreator {
    pub address: String,
    #[serde(default)]
    pub share: u8,
    #[serde(default)]
    pub verified: bool,
}

/// An NFT as the app sees it: mint address, name and metadata URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalAsset {
    /// Mint address (base58)
    pub id: String,
    pub name: String,
    pub symbol: String,
    /// URI of the off-chain JSON metadata
    pub uri: String,
    pub creators: Vec<AssetCreator>,
}

impl DigitalAsset {
    /// Both a name and a metadata URI are needed to build a snapshot
    pub fn has_metadata(&self) -> bool {
        !self.name.is_empty() && !self.uri.is_empty()
    }

    pub fn is_created_by(&self, creator: &str) -> bool {
        self.creators.iter().any(|c| c.address == creator)
    }
}

/// Parameters for minting a new snapshot NFT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNftRequest {
    pub name: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
}

impl CreateNftRequest {
    /// Snapshots are minted without royalties.
    pub fn without_royalties(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            seller_fee_basis_points: 0,
        }
    }
}
