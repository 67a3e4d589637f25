// Solana Token Launchpad Library
//
// Creates Token-2022 mints that carry their own metadata, from a connected
// wallet:
// - Connection capability over JSON-RPC (rent, blockhash, submit, confirm, balance)
// - Wallet capability backed by a local keypair, with optional approval prompt
// - Ordered mint + metadata setup, associated account creation and mint-to
// - Launch reports with explorer links

pub mod chain;
pub mod config;
pub mod error;
pub mod reporting;
pub mod token;
pub mod utils;
pub mod wallet;

pub use error::{ConnectionError, LaunchError, LaunchStage, WalletError};
pub use token::{LaunchRequest, TokenLaunchpad, TokenMetadataInput};
