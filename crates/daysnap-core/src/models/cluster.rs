use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Cluster {
    /// Public RPC endpoint for the cluster
    pub fn api_url(&self) -> &'static str {
        match self {
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::MainnetBeta => "mainnet-beta",
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Cluster {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "mainnet" | "mainnet-beta" => Ok(Cluster::MainnetBeta),
            other => Err(format!("Unknown cluster: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_from_str() {
        assert_eq!("devnet".parse::<Cluster>(), Ok(Cluster::Devnet));
        assert_eq!("Testnet".parse::<Cluster>(), Ok(Cluster::Testnet));
        assert_eq!("mainnet".parse::<Cluster>(), Ok(Cluster::MainnetBeta));
        assert_eq!("mainnet-beta".parse::<Cluster>(), Ok(Cluster::MainnetBeta));
        assert!("localnet".parse::<Cluster>().is_err());
    }

    #[test]
    fn test_cluster_serde_names() {
        assert_eq!(serde_json::to_string(&Cluster::MainnetBeta).unwrap(), "\"mainnet-beta\"");
        let parsed: Cluster = serde_json::from_str("\"devnet\"").unwrap();
        assert_eq!(parsed, Cluster::Devnet);
    }
}
