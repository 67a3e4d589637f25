use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::fmt;
use std::str::FromStr;

use super::constants::EXPLORER_BASE_URL;

/// Cluster a launch runs against, used for explorer links
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cluster {
    Devnet,
    Testnet,
    MainnetBeta,
    /// Any other endpoint (local validator, private RPC); carries the RPC URL
    Custom(String),
}

impl Cluster {
    /// Guess the cluster from an RPC endpoint URL
    pub fn from_rpc_url(url: &str) -> Self {
        let lower = url.to_ascii_lowercase();
        if lower.contains("devnet") {
            Self::Devnet
        } else if lower.contains("testnet") {
            Self::Testnet
        } else if lower.contains("mainnet") {
            Self::MainnetBeta
        } else {
            Self::Custom(url.to_string())
        }
    }

    fn query(&self) -> String {
        match self {
            Self::Devnet => "?cluster=devnet".to_string(),
            Self::Testnet => "?cluster=testnet".to_string(),
            Self::MainnetBeta => String::new(),
            Self::Custom(url) => format!("?cluster=custom&customUrl={}", url),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Devnet => write!(f, "devnet"),
            Self::Testnet => write!(f, "testnet"),
            Self::MainnetBeta => write!(f, "mainnet-beta"),
            Self::Custom(url) => write!(f, "custom ({})", url),
        }
    }
}

impl FromStr for Cluster {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            "mainnet" | "mainnet-beta" => Ok(Self::MainnetBeta),
            other if other.starts_with("http") => Ok(Self::Custom(s.trim().to_string())),
            other => Err(format!("unknown cluster '{}'", other)),
        }
    }
}

/// Builds explorer URLs for transactions and accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explorer {
    base_url: String,
    cluster: Cluster,
}

impl Explorer {
    pub fn new(cluster: Cluster) -> Self {
        Self {
            base_url: EXPLORER_BASE_URL.to_string(),
            cluster,
        }
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    pub fn transaction_url(&self, signature: &Signature) -> String {
        format!("{}/tx/{}{}", self.base_url, signature, self.cluster.query())
    }

    pub fn address_url(&self, address: &Pubkey) -> String {
        format!("{}/address/{}{}", self.base_url, address, self.cluster.query())
    }
}

impl Default for Explorer {
    fn default() -> Self {
        Self::new(Cluster::Devnet)
    }
}
