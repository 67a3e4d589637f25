//! Launch flow orchestration tests
//!
//! The ledger is a mockall mock so every network call is an explicit
//! expectation; anything unexpected fails the test. Wallets are either the
//! real `KeypairWallet` or small fakes that reject signing.

use async_trait::async_trait;
use mockall::{mock, predicate::eq, Sequence};
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    system_program,
    transaction::Transaction,
};
use spl_token_2022::instruction::TokenInstruction;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use token_launchpad::chain::constants::ASSOCIATED_TOKEN_PROGRAM_ID;
use token_launchpad::chain::{Explorer, LedgerConnection, TokenBalance, TOKEN_2022_PROGRAM_ID};
use token_launchpad::wallet::{KeypairWallet, WalletAdapter};
use token_launchpad::{
    ConnectionError, LaunchError, LaunchRequest, LaunchStage, TokenLaunchpad,
    TokenMetadataInput, WalletError,
};

mock! {
    pub Ledger {}

    #[async_trait]
    impl LedgerConnection for Ledger {
        async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64, ConnectionError>;
        async fn latest_blockhash(&self) -> Result<Hash, ConnectionError>;
        async fn submit_transaction(&self, transaction: Transaction) -> Result<Signature, ConnectionError>;
        async fn confirm_transaction(&self, signature: Signature) -> Result<(), ConnectionError>;
        async fn token_account_balance(&self, account: Pubkey) -> Result<TokenBalance, ConnectionError>;
    }
}

// ============================================================================
// HELPERS
// ============================================================================

const RENT_LAMPORTS: u64 = 3_500_000;

/// 165 base + 1 account type + 4 TLV header + 64 metadata pointer
const MINT_WITH_POINTER_LEN: usize = 234;

fn expected_rent_size(metadata: &TokenMetadataInput) -> usize {
    let packed = 32 // update authority
        + 32 // mint
        + 4 + metadata.name.len()
        + 4 + metadata.symbol.len()
        + 4 + metadata.uri.len()
        + 4; // empty additional metadata
    MINT_WITH_POINTER_LEN + 2 + 2 + packed
}

fn program_ids(tx: &Transaction) -> Vec<Pubkey> {
    tx.message
        .instructions
        .iter()
        .map(|ix| tx.message.account_keys[ix.program_id_index as usize])
        .collect()
}

fn one_token() -> TokenBalance {
    TokenBalance {
        amount: 1_000_000_000,
        decimals: 9,
        ui_amount_string: "1".to_string(),
    }
}

fn launchpad(ledger: MockLedger, wallet: Arc<dyn WalletAdapter>) -> TokenLaunchpad {
    TokenLaunchpad::new(Arc::new(ledger), wallet, Explorer::default())
}

/// Expect `launches` full, successful launches with no ordering constraints
fn expect_full_launches(ledger: &mut MockLedger, launches: usize) {
    ledger
        .expect_minimum_balance_for_rent_exemption()
        .times(launches)
        .returning(|_| Ok(RENT_LAMPORTS));
    ledger
        .expect_latest_blockhash()
        .times(3 * launches)
        .returning(|| Ok(Hash::new_unique()));
    ledger
        .expect_submit_transaction()
        .times(3 * launches)
        .returning(|tx| Ok(tx.signatures[0]));
    ledger
        .expect_confirm_transaction()
        .times(3 * launches)
        .returning(|_| Ok(()));
    ledger
        .expect_token_account_balance()
        .times(launches)
        .returning(|_| Ok(one_token()));
}

/// Wallet that has an account but declines to sign
struct RejectingWallet {
    owner: Pubkey,
    attempts: AtomicUsize,
}

#[async_trait]
impl WalletAdapter for RejectingWallet {
    fn public_key(&self) -> Option<Pubkey> {
        Some(self.owner)
    }

    async fn send_transaction(
        &self,
        _transaction: Transaction,
        _connection: &dyn LedgerConnection,
    ) -> Result<Signature, WalletError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(WalletError::Rejected("User rejected the request".to_string()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[tokio::test]
async fn test_no_wallet_fails_before_any_network_call() {
    // No expectations: any ledger call panics the mock
    let ledger = MockLedger::new();
    let launchpad = launchpad(ledger, Arc::new(KeypairWallet::disconnected()));

    let result = launchpad.create_token(&LaunchRequest::default()).await;

    assert!(matches!(result, Err(LaunchError::WalletNotConnected)));
    assert!(!launchpad.is_in_flight());
}

#[tokio::test]
async fn test_transactions_submitted_in_order_each_confirmed() {
    let wallet_keypair = Keypair::new();
    let owner = wallet_keypair.pubkey();
    let metadata = TokenMetadataInput::from_fields(
        Some("Launch"),
        Some("LCH"),
        Some("https://example.com/launch.json"),
    );
    let rent_size = expected_rent_size(&metadata);

    let mut ledger = MockLedger::new();
    let mut seq = Sequence::new();

    ledger
        .expect_minimum_balance_for_rent_exemption()
        .with(eq(rent_size))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(RENT_LAMPORTS));

    // Transaction 1: create account, metadata pointer, mint, metadata
    ledger
        .expect_latest_blockhash()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(Hash::new_unique()));
    ledger
        .expect_submit_transaction()
        .withf(move |tx: &Transaction| {
            tx.is_signed()
                && tx.message.account_keys[0] == owner
                && program_ids(tx)
                    == vec![
                        system_program::id(),
                        TOKEN_2022_PROGRAM_ID,
                        TOKEN_2022_PROGRAM_ID,
                        TOKEN_2022_PROGRAM_ID,
                    ]
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|tx| Ok(tx.signatures[0]));
    ledger
        .expect_confirm_transaction()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    // Transaction 2: associated token account
    ledger
        .expect_latest_blockhash()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(Hash::new_unique()));
    ledger
        .expect_submit_transaction()
        .withf(|tx: &Transaction| {
            tx.is_signed() && program_ids(tx) == vec![ASSOCIATED_TOKEN_PROGRAM_ID]
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|tx| Ok(tx.signatures[0]));
    ledger
        .expect_confirm_transaction()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    // Transaction 3: mint-to, always 1.0 token regardless of initial supply
    ledger
        .expect_latest_blockhash()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(Hash::new_unique()));
    ledger
        .expect_submit_transaction()
        .withf(|tx: &Transaction| {
            program_ids(tx) == vec![TOKEN_2022_PROGRAM_ID]
                && matches!(
                    TokenInstruction::unpack(&tx.message.instructions[0].data),
                    Ok(TokenInstruction::MintTo { amount: 1_000_000_000 })
                )
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|tx| Ok(tx.signatures[0]));
    ledger
        .expect_confirm_transaction()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    ledger
        .expect_token_account_balance()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(one_token()));

    let launchpad = launchpad(ledger, Arc::new(KeypairWallet::new(wallet_keypair)));
    let request = LaunchRequest {
        metadata: metadata.clone(),
        initial_supply: Some("5000".to_string()),
    };

    let report = launchpad.create_token(&request).await.unwrap();

    assert_eq!(report.minted_amount, 1_000_000_000);
    assert_eq!(report.balance, "1");
    assert!(report.balance_verified);
    assert_eq!(report.name, "Launch");
    assert_eq!(report.transactions.len(), 3);
    assert_eq!(
        report.associated_token_account,
        token_launchpad::token::associated_token_address(&owner, &report.mint)
    );
    assert!(report.transactions[0]
        .explorer_url
        .starts_with("https://explorer.solana.com/tx/"));
    assert!(!launchpad.is_in_flight());
}

#[tokio::test]
async fn test_rejection_on_first_transaction_stops_the_flow() {
    let mut ledger = MockLedger::new();
    ledger
        .expect_minimum_balance_for_rent_exemption()
        .times(1)
        .returning(|_| Ok(RENT_LAMPORTS));
    ledger
        .expect_latest_blockhash()
        .times(1)
        .returning(|| Ok(Hash::new_unique()));
    ledger.expect_submit_transaction().never();
    ledger.expect_confirm_transaction().never();
    ledger.expect_token_account_balance().never();

    let wallet = Arc::new(RejectingWallet {
        owner: Pubkey::new_unique(),
        attempts: AtomicUsize::new(0),
    });
    let launchpad = launchpad(ledger, wallet.clone());

    let result = launchpad.create_token(&LaunchRequest::default()).await;

    match result {
        Err(LaunchError::SigningRejected { stage, reason }) => {
            assert_eq!(stage, LaunchStage::CreateMint);
            assert!(reason.contains("rejected"));
        }
        other => panic!("expected signing rejection, got {:?}", other),
    }
    assert_eq!(wallet.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_confirmation_failure_on_second_transaction_skips_mint_to() {
    let mut ledger = MockLedger::new();
    ledger
        .expect_minimum_balance_for_rent_exemption()
        .returning(|_| Ok(RENT_LAMPORTS));
    ledger
        .expect_latest_blockhash()
        .times(2)
        .returning(|| Ok(Hash::new_unique()));
    ledger
        .expect_submit_transaction()
        .times(2)
        .returning(|tx| Ok(tx.signatures[0]));

    let confirmations = AtomicUsize::new(0);
    ledger
        .expect_confirm_transaction()
        .times(2)
        .returning(move |signature| {
            if confirmations.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(())
            } else {
                Err(ConnectionError::ConfirmationTimeout {
                    signature,
                    timeout_ms: 60_000,
                })
            }
        });
    ledger.expect_token_account_balance().never();

    let launchpad = launchpad(ledger, Arc::new(KeypairWallet::new(Keypair::new())));
    let result = launchpad.create_token(&LaunchRequest::default()).await;

    assert!(matches!(
        result,
        Err(LaunchError::Network {
            stage: LaunchStage::CreateAssociatedAccount,
            source: ConnectionError::ConfirmationTimeout { .. },
        })
    ));
}

#[tokio::test]
async fn test_rent_query_failure_is_a_network_error() {
    let mut ledger = MockLedger::new();
    ledger
        .expect_minimum_balance_for_rent_exemption()
        .returning(|_| Err(ConnectionError::InvalidResponse("node unavailable".to_string())));
    ledger.expect_latest_blockhash().never();

    let launchpad = launchpad(ledger, Arc::new(KeypairWallet::new(Keypair::new())));
    let err = launchpad
        .create_token(&LaunchRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(LaunchStage::RentQuery));
    assert!(matches!(err, LaunchError::Network { .. }));
}

#[tokio::test]
async fn test_each_launch_uses_a_fresh_mint() {
    let mut ledger = MockLedger::new();
    expect_full_launches(&mut ledger, 2);

    let launchpad = launchpad(ledger, Arc::new(KeypairWallet::new(Keypair::new())));
    let first = launchpad.create_token(&LaunchRequest::default()).await.unwrap();
    let second = launchpad.create_token(&LaunchRequest::default()).await.unwrap();

    assert_ne!(first.mint, second.mint);
    assert_ne!(first.associated_token_account, second.associated_token_account);
}

#[tokio::test]
async fn test_balance_mismatch_is_reported_not_fatal() {
    let mut ledger = MockLedger::new();
    ledger
        .expect_minimum_balance_for_rent_exemption()
        .returning(|_| Ok(RENT_LAMPORTS));
    ledger
        .expect_latest_blockhash()
        .returning(|| Ok(Hash::new_unique()));
    ledger
        .expect_submit_transaction()
        .returning(|tx| Ok(tx.signatures[0]));
    ledger.expect_confirm_transaction().returning(|_| Ok(()));
    ledger.expect_token_account_balance().returning(|_| {
        Ok(TokenBalance {
            amount: 0,
            decimals: 9,
            ui_amount_string: "0".to_string(),
        })
    });

    let launchpad = launchpad(ledger, Arc::new(KeypairWallet::new(Keypair::new())));
    let report = launchpad.create_token(&LaunchRequest::default()).await.unwrap();

    assert_eq!(report.balance, "0");
    assert!(!report.balance_verified);
}

/// Ledger whose rent query parks until released, to hold a launch in flight
struct ParkedLedger {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl LedgerConnection for ParkedLedger {
    async fn minimum_balance_for_rent_exemption(
        &self,
        _data_len: usize,
    ) -> Result<u64, ConnectionError> {
        self.entered.notify_one();
        self.release.notified().await;
        Err(ConnectionError::InvalidResponse("released".to_string()))
    }

    async fn latest_blockhash(&self) -> Result<Hash, ConnectionError> {
        unreachable!("flow ends at the rent query")
    }

    async fn submit_transaction(&self, _transaction: Transaction) -> Result<Signature, ConnectionError> {
        unreachable!("flow ends at the rent query")
    }

    async fn confirm_transaction(&self, _signature: Signature) -> Result<(), ConnectionError> {
        unreachable!("flow ends at the rent query")
    }

    async fn token_account_balance(&self, _account: Pubkey) -> Result<TokenBalance, ConnectionError> {
        unreachable!("flow ends at the rent query")
    }
}

#[tokio::test]
async fn test_overlapping_launch_is_refused() {
    let ledger = Arc::new(ParkedLedger {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let launchpad = Arc::new(TokenLaunchpad::new(
        ledger.clone(),
        Arc::new(KeypairWallet::new(Keypair::new())),
        Explorer::default(),
    ));

    let first = tokio::spawn({
        let launchpad = Arc::clone(&launchpad);
        async move { launchpad.create_token(&LaunchRequest::default()).await }
    });

    ledger.entered.notified().await;
    assert!(launchpad.is_in_flight());

    let second = launchpad.create_token(&LaunchRequest::default()).await;
    assert!(matches!(second, Err(LaunchError::LaunchInFlight)));

    ledger.release.notify_one();
    let first = first.await.unwrap();
    assert!(matches!(
        first,
        Err(LaunchError::Network { stage: LaunchStage::RentQuery, .. })
    ));
    assert!(!launchpad.is_in_flight());
}
