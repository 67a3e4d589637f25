// Well-known program ids and launch constants.
//
// Program ids come from the SPL crates' `declare_id!` so they cannot drift
// from the instruction builders that target them.

use solana_sdk::pubkey::Pubkey;

/// Token-2022 (Token Extensions) program
pub const TOKEN_2022_PROGRAM_ID: Pubkey = spl_token_2022::ID;

/// Associated Token Account program
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = spl_associated_token_account::ID;

/// Default RPC endpoint (devnet)
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// Decimal places of every launched mint
pub const TOKEN_DECIMALS: u8 = 9;

/// Base units minted to the creator: 1.0 token at 9 decimals
pub const MINT_AMOUNT: u64 = 1_000_000_000;

/// Block explorer used for transaction and address links
pub const EXPLORER_BASE_URL: &str = "https://explorer.solana.com";
