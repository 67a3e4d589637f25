//! Error types for the launch flow.
//!
//! The launchpad surfaces three failure categories distinctly:
//! a missing wallet (reported before any network call), a signing
//! rejection from the wallet, and a network/query failure at one of the
//! await points of the flow.

use solana_client::client_error::ClientError;
use solana_sdk::{program_error::ProgramError, signature::Signature, signer::SignerError};
use std::fmt;
use thiserror::Error;

/// Step of the launch flow an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStage {
    RentQuery,
    CreateMint,
    CreateAssociatedAccount,
    MintTo,
    Verify,
}

impl fmt::Display for LaunchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RentQuery => write!(f, "rent query"),
            Self::CreateMint => write!(f, "mint creation"),
            Self::CreateAssociatedAccount => write!(f, "associated account creation"),
            Self::MintTo => write!(f, "mint-to"),
            Self::Verify => write!(f, "balance verification"),
        }
    }
}

/// Failures raised by a [`crate::chain::LedgerConnection`]
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("RPC request failed: {0}")]
    Rpc(#[from] ClientError),

    #[error("transaction {signature} failed on-chain: {reason}")]
    TransactionFailed { signature: Signature, reason: String },

    #[error("transaction {signature} not confirmed within {timeout_ms}ms")]
    ConfirmationTimeout { signature: Signature, timeout_ms: u64 },

    #[error("unexpected RPC response: {0}")]
    InvalidResponse(String),
}

/// Failures raised by a [`crate::wallet::WalletAdapter`]
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet is not connected")]
    NotConnected,

    #[error("signing rejected: {0}")]
    Rejected(String),

    #[error("transaction submission failed: {0}")]
    Submission(#[from] ConnectionError),
}

/// Errors returned by [`crate::token::TokenLaunchpad::create_token`]
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("wallet is not connected; connect a wallet before creating a token")]
    WalletNotConnected,

    #[error("a token launch is already in progress")]
    LaunchInFlight,

    #[error("wallet rejected the {stage} transaction: {reason}")]
    SigningRejected { stage: LaunchStage, reason: String },

    #[error("network request failed during {stage}: {source}")]
    Network {
        stage: LaunchStage,
        #[source]
        source: ConnectionError,
    },

    #[error("failed to build {stage} instructions: {source}")]
    Instruction {
        stage: LaunchStage,
        #[source]
        source: ProgramError,
    },

    #[error("failed to co-sign the {stage} transaction: {source}")]
    CoSigning {
        stage: LaunchStage,
        #[source]
        source: SignerError,
    },
}

impl LaunchError {
    pub(crate) fn network(stage: LaunchStage) -> impl FnOnce(ConnectionError) -> Self {
        move |source| Self::Network { stage, source }
    }

    pub(crate) fn instruction(stage: LaunchStage) -> impl FnOnce(ProgramError) -> Self {
        move |source| Self::Instruction { stage, source }
    }

    pub(crate) fn co_signing(stage: LaunchStage) -> impl FnOnce(SignerError) -> Self {
        move |source| Self::CoSigning { stage, source }
    }

    /// Map a wallet failure onto the launch taxonomy
    pub(crate) fn from_wallet(stage: LaunchStage, err: WalletError) -> Self {
        match err {
            WalletError::NotConnected => Self::WalletNotConnected,
            WalletError::Rejected(reason) => Self::SigningRejected { stage, reason },
            WalletError::Submission(source) => Self::Network { stage, source },
        }
    }

    /// Stage the error was raised in, if it was raised inside the flow
    pub fn stage(&self) -> Option<LaunchStage> {
        match self {
            Self::WalletNotConnected | Self::LaunchInFlight => None,
            Self::SigningRejected { stage, .. }
            | Self::Network { stage, .. }
            | Self::Instruction { stage, .. }
            | Self::CoSigning { stage, .. } => Some(*stage),
        }
    }
}
