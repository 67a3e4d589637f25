// Token launch flow
//
// One `create_token` call performs four network round-trips in a fixed
// happens-before chain:
//   1. mint account + metadata (one atomic transaction, co-signed by the mint)
//   2. associated token account for the wallet
//   3. mint 1.0 token into that account
//   4. read the balance back
// Each transaction is confirmed before the next is built. Nothing is rolled
// back if a later step fails: a confirmed mint stays on the ledger.

use chrono::Utc;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::instructions::{
    associated_token_address, create_associated_account_instruction, mint_to_instruction,
    MintSetupPlan,
};
use super::layout::MintAccountLayout;
use super::metadata::TokenMetadataInput;
use crate::chain::constants::{MINT_AMOUNT, TOKEN_DECIMALS};
use crate::chain::{Explorer, LedgerConnection};
use crate::error::{LaunchError, LaunchStage};
use crate::reporting::{balance_matches, LaunchReport, TransactionRecord};
use crate::utils::TransactionBuilder;
use crate::wallet::WalletAdapter;

/// Input collected from the launch form
#[derive(Debug, Clone, Default)]
pub struct LaunchRequest {
    pub metadata: TokenMetadataInput,
    /// Accepted from the form but not applied; every launch mints `MINT_AMOUNT`
    pub initial_supply: Option<String>,
}

/// Orchestrates token creation against a wallet and a ledger connection
pub struct TokenLaunchpad {
    connection: Arc<dyn LedgerConnection>,
    wallet: Arc<dyn WalletAdapter>,
    explorer: Explorer,
    priority_fee: Option<u64>,
    in_flight: AtomicBool,
}

impl TokenLaunchpad {
    pub fn new(
        connection: Arc<dyn LedgerConnection>,
        wallet: Arc<dyn WalletAdapter>,
        explorer: Explorer,
    ) -> Self {
        Self {
            connection,
            wallet,
            explorer,
            priority_fee: None,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Attach a compute unit price (micro-lamports) to every launch transaction
    pub fn with_priority_fee(mut self, compute_unit_price: Option<u64>) -> Self {
        self.priority_fee = compute_unit_price;
        self
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Create a new Token-2022 mint with metadata and mint 1.0 token to the wallet
    pub async fn create_token(&self, request: &LaunchRequest) -> Result<LaunchReport, LaunchError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(LaunchError::LaunchInFlight)?;

        let owner = self
            .wallet
            .public_key()
            .ok_or(LaunchError::WalletNotConnected)?;

        if let Some(supply) = &request.initial_supply {
            warn!(
                "⚠️  Initial supply '{}' is not applied; minting {} base units",
                supply, MINT_AMOUNT
            );
        }

        let mint_keypair = Keypair::new();
        let mint = mint_keypair.pubkey();
        info!("🪙 Creating token {} ({}) with mint {}", request.metadata.name, request.metadata.symbol, mint);

        // Size and rent
        let token_metadata = request
            .metadata
            .to_token_metadata(mint, owner)
            .map_err(LaunchError::instruction(LaunchStage::RentQuery))?;
        let layout = MintAccountLayout::for_metadata(&token_metadata)
            .map_err(LaunchError::instruction(LaunchStage::RentQuery))?;
        let lamports = self
            .connection
            .minimum_balance_for_rent_exemption(layout.rent_exempt_size())
            .await
            .map_err(LaunchError::network(LaunchStage::RentQuery))?;
        debug!(
            "Mint layout: {} bytes allocated, {} bytes metadata, {} lamports rent",
            layout.mint_len, layout.metadata_len, lamports
        );

        // Transaction 1: mint account + metadata
        let plan = MintSetupPlan {
            payer: owner,
            mint,
            authority: owner,
            decimals: TOKEN_DECIMALS,
            lamports,
            layout,
            metadata: &request.metadata,
        };
        let setup = plan
            .instructions()
            .map_err(LaunchError::instruction(LaunchStage::CreateMint))?;
        let mint_signature = self
            .submit(LaunchStage::CreateMint, setup, owner, &[&mint_keypair])
            .await?;
        info!("✅ Mint account created: {}", self.explorer.transaction_url(&mint_signature));

        // Transaction 2: associated token account
        let associated_account = associated_token_address(&owner, &mint);
        let create_account = create_associated_account_instruction(&owner, &owner, &mint);
        let account_signature = self
            .submit(LaunchStage::CreateAssociatedAccount, vec![create_account], owner, &[])
            .await?;
        info!(
            "✅ Associated Token Account created: {}",
            self.explorer.transaction_url(&account_signature)
        );

        // Transaction 3: mint-to
        let mint_to = mint_to_instruction(&mint, &associated_account, &owner, MINT_AMOUNT)
            .map_err(LaunchError::instruction(LaunchStage::MintTo))?;
        let mint_to_signature = self
            .submit(LaunchStage::MintTo, vec![mint_to], owner, &[])
            .await?;
        info!("✅ Tokens minted: {}", self.explorer.transaction_url(&mint_to_signature));

        // Verification
        let balance = self
            .connection
            .token_account_balance(associated_account)
            .await
            .map_err(LaunchError::network(LaunchStage::Verify))?;
        info!("💰 Token Balance in wallet: {}", balance.ui_amount_string);

        let balance_verified = balance_matches(&balance, MINT_AMOUNT, TOKEN_DECIMALS);
        if !balance_verified {
            warn!(
                "⚠️  Balance {} ({} base units) does not match minted amount {}",
                balance.ui_amount_string, balance.amount, MINT_AMOUNT
            );
        }

        Ok(LaunchReport {
            mint,
            associated_token_account: associated_account,
            name: request.metadata.name.clone(),
            symbol: request.metadata.symbol.clone(),
            uri: request.metadata.uri.clone(),
            decimals: TOKEN_DECIMALS,
            minted_amount: MINT_AMOUNT,
            balance: balance.ui_amount_string,
            balance_verified,
            transactions: vec![
                TransactionRecord::new("mint account", mint_signature, &self.explorer),
                TransactionRecord::new("associated token account", account_signature, &self.explorer),
                TransactionRecord::new("mint-to", mint_to_signature, &self.explorer),
            ],
            mint_explorer_url: self.explorer.address_url(&mint),
            created_at: Utc::now(),
        })
    }

    /// Build, hand to the wallet, and confirm one transaction
    async fn submit(
        &self,
        stage: LaunchStage,
        instructions: Vec<Instruction>,
        fee_payer: Pubkey,
        co_signers: &[&Keypair],
    ) -> Result<Signature, LaunchError> {
        let recent_blockhash = self
            .connection
            .latest_blockhash()
            .await
            .map_err(LaunchError::network(stage))?;

        let mut builder = TransactionBuilder::new(fee_payer);
        builder.add_instructions(instructions);
        if let Some(price) = self.priority_fee {
            builder.set_compute_unit_price(price);
        }
        let transaction = builder
            .build(recent_blockhash, co_signers)
            .map_err(LaunchError::co_signing(stage))?;

        debug!("Sending {} transaction to wallet", stage);
        let signature = self
            .wallet
            .send_transaction(transaction, self.connection.as_ref())
            .await
            .map_err(|e| LaunchError::from_wallet(stage, e))?;

        debug!("Waiting for {} confirmation: {}", stage, signature);
        self.connection
            .confirm_transaction(signature)
            .await
            .map_err(LaunchError::network(stage))?;

        Ok(signature)
    }
}

/// Holds the in-flight flag for the duration of one launch
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
