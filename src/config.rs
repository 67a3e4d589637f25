use anyhow::{Context, Result};
use solana_sdk::commitment_config::CommitmentConfig;
use std::str::FromStr;
use tokio::time::Duration;

use crate::chain::constants::DEFAULT_RPC_URL;
use crate::chain::{Cluster, Explorer};

/// Main configuration struct containing all launchpad settings
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc: RpcConfig,
    pub wallet: WalletConfig,
    pub execution: ExecutionConfig,
    pub monitoring: MonitoringConfig,
}

/// RPC endpoint configuration
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub url: String,
    pub commitment_level: String,
    pub confirmation_timeout_ms: u64,
    /// Explorer cluster; inferred from `url` when unset
    pub cluster: Option<String>,
}

/// Wallet configuration
#[derive(Debug, Clone)]
pub struct WalletConfig {
    pub keypair_path: Option<String>,
    pub private_key: Option<String>,
    /// Ask the operator to approve every transaction before signing
    pub require_approval: bool,
    pub min_balance_sol: f64,
}

/// Transaction execution configuration
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Priority fee in micro-lamports per compute unit; 0 disables it
    pub compute_unit_price: u64,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    pub log_level: String,
    /// Emit log lines as JSON instead of plain text
    pub json_logs: bool,
}

impl Config {
    /// Load configuration from a `.env` file and environment variables
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from the process environment only
    pub fn from_env() -> Result<Self> {
        let rpc = RpcConfig {
            url: get_env_or_default("RPC_URL", DEFAULT_RPC_URL),
            commitment_level: get_env_or_default("COMMITMENT_LEVEL", "confirmed"),
            confirmation_timeout_ms: get_u64_env("CONFIRMATION_TIMEOUT_MS", 60_000)?,
            cluster: get_optional_env("CLUSTER"),
        };

        let wallet = WalletConfig {
            keypair_path: get_optional_env("WALLET_KEYPAIR_PATH"),
            private_key: get_optional_env("WALLET_PRIVATE_KEY"),
            require_approval: get_bool_env("REQUIRE_APPROVAL", false),
            min_balance_sol: std::env::var("MIN_BALANCE_SOL")
                .unwrap_or_else(|_| "0.05".to_string())
                .parse()
                .unwrap_or(0.05),
        };

        let execution = ExecutionConfig {
            compute_unit_price: get_u64_env("COMPUTE_UNIT_PRICE", 0)?,
        };

        let monitoring = MonitoringConfig {
            log_level: get_env_or_default("LOG_LEVEL", "info"),
            json_logs: get_env_or_default("LOG_FORMAT", "text").eq_ignore_ascii_case("json"),
        };

        Ok(Config {
            rpc,
            wallet,
            execution,
            monitoring,
        })
    }

    pub fn commitment(&self) -> Result<CommitmentConfig> {
        CommitmentConfig::from_str(&self.rpc.commitment_level).context(format!(
            "Failed to parse COMMITMENT_LEVEL '{}'",
            self.rpc.commitment_level
        ))
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc.confirmation_timeout_ms)
    }

    pub fn explorer(&self) -> Result<Explorer> {
        let cluster = match &self.rpc.cluster {
            Some(name) => Cluster::from_str(name)
                .map_err(anyhow::Error::msg)
                .context("Failed to parse CLUSTER")?,
            None => Cluster::from_rpc_url(&self.rpc.url),
        };
        Ok(Explorer::new(cluster))
    }

    /// Priority fee to attach to launch transactions, if any
    pub fn priority_fee(&self) -> Option<u64> {
        Some(self.execution.compute_unit_price).filter(|price| *price > 0)
    }
}

// ============================================================================
// Helper Functions for Environment Variable Parsing
// ============================================================================

/// Get environment variable or return default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get environment variable, treating empty values as unset
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Get boolean environment variable with default
fn get_bool_env(key: &str, default: bool) -> bool {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or(default)
}

/// Get u64 environment variable with default
fn get_u64_env(key: &str, default: u64) -> Result<u64> {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .context(format!("Failed to parse {} as u64", key))
}
