//! Wallet capability consumed by the launch flow.
//!
//! The launchpad never owns a key: it asks a [`WalletAdapter`] for its
//! public key and hands it unsigned (or partially signed) transactions.
//! [`KeypairWallet`] is the local-keypair adapter used by the CLI.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::chain::LedgerConnection;
use crate::config::WalletConfig;
use crate::error::WalletError;

/// A connected (or disconnected) wallet that signs and submits transactions
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Public key of the connected account, `None` when disconnected
    fn public_key(&self) -> Option<Pubkey>;

    /// Sign `transaction` with the wallet key and submit it through `connection`
    ///
    /// Fails with [`WalletError::NotConnected`] when there is no account and
    /// with [`WalletError::Rejected`] when signing is declined.
    async fn send_transaction(
        &self,
        transaction: Transaction,
        connection: &dyn LedgerConnection,
    ) -> Result<Signature, WalletError>;
}

/// How a [`KeypairWallet`] decides whether to sign
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    /// Sign every transaction
    Automatic,
    /// Ask before signing each transaction
    Prompt,
}

type PromptInput = Arc<Mutex<dyn BufRead + Send>>;

/// Wallet backed by a local keypair
pub struct KeypairWallet {
    keypair: Option<Keypair>,
    approval: Approval,
    /// Source of approval answers; stdin when unset
    prompt_input: Option<PromptInput>,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair: Some(keypair),
            approval: Approval::Automatic,
            prompt_input: None,
        }
    }

    /// A wallet with no account; every send fails with `NotConnected`
    pub fn disconnected() -> Self {
        Self {
            keypair: None,
            approval: Approval::Automatic,
            prompt_input: None,
        }
    }

    pub fn with_approval(mut self, approval: Approval) -> Self {
        self.approval = approval;
        self
    }

    /// Read approval answers from `input` instead of stdin
    pub fn with_prompt_input<R: BufRead + Send + 'static>(mut self, input: R) -> Self {
        let input: PromptInput = Arc::new(Mutex::new(input));
        self.prompt_input = Some(input);
        self
    }

    /// Build a wallet from configuration
    ///
    /// A keypair file takes precedence over a base58 private key. With
    /// neither configured the wallet starts disconnected.
    pub fn from_config(config: &WalletConfig) -> Result<Self> {
        let approval = if config.require_approval {
            Approval::Prompt
        } else {
            Approval::Automatic
        };

        let wallet = match load_keypair(config)? {
            Some(keypair) => {
                info!("✅ Wallet connected: {}", keypair.pubkey());
                Self::new(keypair)
            }
            None => {
                warn!("⚠️  No wallet configured (set WALLET_KEYPAIR_PATH or WALLET_PRIVATE_KEY)");
                Self::disconnected()
            }
        };

        Ok(wallet.with_approval(approval))
    }
}

#[async_trait]
impl WalletAdapter for KeypairWallet {
    fn public_key(&self) -> Option<Pubkey> {
        self.keypair.as_ref().map(|keypair| keypair.pubkey())
    }

    async fn send_transaction(
        &self,
        mut transaction: Transaction,
        connection: &dyn LedgerConnection,
    ) -> Result<Signature, WalletError> {
        let keypair = self.keypair.as_ref().ok_or(WalletError::NotConnected)?;

        if self.approval == Approval::Prompt {
            let summary = describe(&transaction);
            let input = self.prompt_input.clone();
            let approved = tokio::task::spawn_blocking(move || ask_operator(&summary, input))
                .await
                .map_err(|e| WalletError::Rejected(format!("approval prompt failed: {}", e)))?;
            if !approved {
                return Err(WalletError::Rejected("declined by operator".to_string()));
            }
        }

        let recent_blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[keypair], recent_blockhash)
            .map_err(|e| WalletError::Rejected(e.to_string()))?;

        if !transaction.is_signed() {
            return Err(WalletError::Rejected(
                "transaction is missing required signatures".to_string(),
            ));
        }

        debug!(
            "Wallet {} signed transaction with {} instructions",
            keypair.pubkey(),
            transaction.message.instructions.len()
        );

        Ok(connection.submit_transaction(transaction).await?)
    }
}

fn load_keypair(config: &WalletConfig) -> Result<Option<Keypair>> {
    if let Some(path) = &config.keypair_path {
        let keypair = read_keypair_file(path)
            .map_err(|e| anyhow!("{}", e))
            .context(format!("Failed to read keypair file {}", path))?;
        return Ok(Some(keypair));
    }

    if let Some(private_key) = &config.private_key {
        let bytes = bs58::decode(private_key)
            .into_vec()
            .context("WALLET_PRIVATE_KEY is not valid base58")?;
        let keypair = Keypair::from_bytes(&bytes)
            .map_err(|e| anyhow!("{}", e))
            .context("WALLET_PRIVATE_KEY is not a valid keypair")?;
        return Ok(Some(keypair));
    }

    Ok(None)
}

fn describe(transaction: &Transaction) -> String {
    let message = &transaction.message;
    let programs: Vec<String> = message
        .instructions
        .iter()
        .map(|ix| {
            message
                .account_keys
                .get(ix.program_id_index as usize)
                .map(|key| key.to_string())
                .unwrap_or_else(|| "?".to_string())
        })
        .collect();

    format!(
        "fee payer {}, {} instruction(s): {}",
        message.account_keys.first().map(|k| k.to_string()).unwrap_or_default(),
        message.instructions.len(),
        programs.join(", ")
    )
}

fn ask_operator(summary: &str, input: Option<PromptInput>) -> bool {
    let Some(input) = input else {
        return prompt_approval(summary, std::io::stdin().lock(), std::io::stdout());
    };
    let mut reader = match input.lock() {
        Ok(reader) => reader,
        Err(_) => return false,
    };
    prompt_approval(summary, &mut *reader, std::io::stdout())
}

/// Show `summary` on `output` and read a y/N answer from `input`
///
/// Anything other than "y" or "yes", including EOF, declines.
fn prompt_approval(summary: &str, mut input: impl BufRead, mut output: impl Write) -> bool {
    let _ = writeln!(output, "Transaction: {}", summary);
    let _ = write!(output, "Approve and sign? [y/N] ");
    let _ = output.flush();

    let mut answer = String::new();
    if input.read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
