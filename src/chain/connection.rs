// Ledger connection capability
//
// The launch flow only needs five things from the network: a rent quote,
// a recent blockhash, raw submission (used by the wallet), confirmation of
// a signature and a token balance. `LedgerConnection` is that capability
// set; `RpcConnection` backs it with the nonblocking RPC client.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_account_decoder::parse_token::UiTokenAmount;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::{
    commitment_config::{CommitmentConfig, CommitmentLevel},
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::Transaction,
};
use solana_transaction_status::TransactionConfirmationStatus;
use std::sync::Arc;
use tokio::time::{sleep, timeout, Duration, Instant};
use tracing::{debug, info};

use crate::error::ConnectionError;

/// Balance of a token account as reported by the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    /// Raw amount in base units
    pub amount: u64,
    pub decimals: u8,
    /// Human-readable amount, e.g. "1"
    pub ui_amount_string: String,
}

impl TryFrom<UiTokenAmount> for TokenBalance {
    type Error = ConnectionError;

    fn try_from(ui_amount: UiTokenAmount) -> Result<Self, Self::Error> {
        let amount = ui_amount.amount.parse::<u64>().map_err(|_| {
            ConnectionError::InvalidResponse(format!(
                "token amount '{}' is not a u64",
                ui_amount.amount
            ))
        })?;

        Ok(Self {
            amount,
            decimals: ui_amount.decimals,
            ui_amount_string: ui_amount.ui_amount_string,
        })
    }
}

/// Read/submit access to the ledger used by the launch flow
#[async_trait]
pub trait LedgerConnection: Send + Sync {
    /// Lamports an account of `data_len` bytes must hold to be rent exempt
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize)
        -> Result<u64, ConnectionError>;

    async fn latest_blockhash(&self) -> Result<Hash, ConnectionError>;

    /// Submit a fully signed transaction without waiting for confirmation
    async fn submit_transaction(&self, transaction: Transaction)
        -> Result<Signature, ConnectionError>;

    /// Wait until `signature` reaches the connection's commitment level
    async fn confirm_transaction(&self, signature: Signature) -> Result<(), ConnectionError>;

    async fn token_account_balance(&self, account: Pubkey)
        -> Result<TokenBalance, ConnectionError>;
}

/// `LedgerConnection` over a JSON-RPC endpoint
pub struct RpcConnection {
    rpc_client: Arc<RpcClient>,
    commitment: CommitmentConfig,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl RpcConnection {
    pub fn new(url: String, commitment: CommitmentConfig, confirmation_timeout: Duration) -> Self {
        info!(
            "Initialized RPC connection: url={}, commitment={:?}, confirmation_timeout={}ms",
            url,
            commitment.commitment,
            confirmation_timeout.as_millis()
        );

        Self {
            rpc_client: Arc::new(RpcClient::new_with_commitment(url, commitment)),
            commitment,
            confirmation_timeout,
            poll_interval: Duration::from_millis(400),
        }
    }

    pub fn url(&self) -> String {
        self.rpc_client.url()
    }

    /// Native SOL balance in lamports
    pub async fn balance(&self, address: &Pubkey) -> Result<u64, ConnectionError> {
        Ok(self.rpc_client.get_balance(address).await?)
    }
}

#[async_trait]
impl LedgerConnection for RpcConnection {
    async fn minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, ConnectionError> {
        let lamports = self
            .rpc_client
            .get_minimum_balance_for_rent_exemption(data_len)
            .await?;
        debug!("Rent exemption for {} bytes: {} lamports", data_len, lamports);
        Ok(lamports)
    }

    async fn latest_blockhash(&self) -> Result<Hash, ConnectionError> {
        Ok(self.rpc_client.get_latest_blockhash().await?)
    }

    async fn submit_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Signature, ConnectionError> {
        let config = RpcSendTransactionConfig {
            preflight_commitment: Some(self.commitment.commitment),
            ..Default::default()
        };

        let signature = self
            .rpc_client
            .send_transaction_with_config(&transaction, config)
            .await?;
        debug!("Transaction submitted: {}", signature);
        Ok(signature)
    }

    async fn confirm_transaction(&self, signature: Signature) -> Result<(), ConnectionError> {
        let start_time = Instant::now();
        let target = self.commitment.commitment;

        let result = timeout(self.confirmation_timeout, async {
            loop {
                let response = self.rpc_client.get_signature_statuses(&[signature]).await?;

                if let Some(Some(status)) = response.value.first() {
                    if let Some(err) = &status.err {
                        return Err(ConnectionError::TransactionFailed {
                            signature,
                            reason: format!("{:?}", err),
                        });
                    }

                    if let Some(confirmation_status) = &status.confirmation_status {
                        if reaches_commitment(confirmation_status, target) {
                            return Ok(status.slot);
                        }
                    }
                }

                sleep(self.poll_interval).await;
            }
        })
        .await;

        match result {
            Ok(Ok(slot)) => {
                debug!(
                    "Transaction {} confirmed in slot {} after {}ms",
                    signature,
                    slot,
                    start_time.elapsed().as_millis()
                );
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ConnectionError::ConfirmationTimeout {
                signature,
                timeout_ms: self.confirmation_timeout.as_millis() as u64,
            }),
        }
    }

    async fn token_account_balance(
        &self,
        account: Pubkey,
    ) -> Result<TokenBalance, ConnectionError> {
        let ui_amount = self.rpc_client.get_token_account_balance(&account).await?;
        TokenBalance::try_from(ui_amount)
    }
}

/// Whether a reported confirmation status satisfies the requested commitment
fn reaches_commitment(status: &TransactionConfirmationStatus, target: CommitmentLevel) -> bool {
    match target {
        CommitmentLevel::Finalized => matches!(status, TransactionConfirmationStatus::Finalized),
        CommitmentLevel::Confirmed => matches!(
            status,
            TransactionConfirmationStatus::Confirmed | TransactionConfirmationStatus::Finalized
        ),
        _ => true,
    }
}
