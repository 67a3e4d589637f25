// Instruction builders for the three launch transactions.
//
// Transaction 1 initializes the mint and its metadata atomically. Each of
// its instructions depends on state left by the previous one, so the order
// lives in `MintSetupStep::ORDER` rather than in call order.

use solana_sdk::{
    instruction::Instruction, program_error::ProgramError, pubkey::Pubkey, system_instruction,
    system_program,
};
use spl_associated_token_account::{
    get_associated_token_address_with_program_id,
    instruction::create_associated_token_account,
};
use spl_token_2022::extension::metadata_pointer;

use super::layout::MintAccountLayout;
use super::metadata::TokenMetadataInput;
use crate::chain::constants::TOKEN_2022_PROGRAM_ID;

/// One instruction of the mint setup transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintSetupStep {
    /// Allocate the mint account, owned by Token-2022
    CreateAccount,
    /// Point the mint's metadata at the mint itself
    InitializeMetadataPointer,
    InitializeMint,
    /// Write name/symbol/uri into the mint account
    InitializeMetadata,
}

impl MintSetupStep {
    /// Order required by the token program within one transaction
    pub const ORDER: [MintSetupStep; 4] = [
        MintSetupStep::CreateAccount,
        MintSetupStep::InitializeMetadataPointer,
        MintSetupStep::InitializeMint,
        MintSetupStep::InitializeMetadata,
    ];

    pub fn program_id(&self) -> Pubkey {
        match self {
            Self::CreateAccount => system_program::id(),
            _ => TOKEN_2022_PROGRAM_ID,
        }
    }
}

/// Everything needed to build the mint setup transaction
#[derive(Debug, Clone)]
pub struct MintSetupPlan<'a> {
    /// Funds the mint account and pays fees
    pub payer: Pubkey,
    pub mint: Pubkey,
    /// Mint authority, metadata-pointer authority and metadata update authority
    pub authority: Pubkey,
    pub decimals: u8,
    /// Rent-exempt balance for the full layout
    pub lamports: u64,
    pub layout: MintAccountLayout,
    pub metadata: &'a TokenMetadataInput,
}

impl MintSetupPlan<'_> {
    /// Instructions for every step, in `MintSetupStep::ORDER`
    pub fn instructions(&self) -> Result<Vec<Instruction>, ProgramError> {
        MintSetupStep::ORDER
            .iter()
            .map(|step| self.build(*step))
            .collect()
    }

    pub fn build(&self, step: MintSetupStep) -> Result<Instruction, ProgramError> {
        match step {
            MintSetupStep::CreateAccount => Ok(system_instruction::create_account(
                &self.payer,
                &self.mint,
                self.lamports,
                self.layout.mint_len as u64,
                &TOKEN_2022_PROGRAM_ID,
            )),
            MintSetupStep::InitializeMetadataPointer => metadata_pointer::instruction::initialize(
                &TOKEN_2022_PROGRAM_ID,
                &self.mint,
                Some(self.authority),
                Some(self.mint),
            ),
            MintSetupStep::InitializeMint => spl_token_2022::instruction::initialize_mint(
                &TOKEN_2022_PROGRAM_ID,
                &self.mint,
                &self.authority,
                None,
                self.decimals,
            ),
            MintSetupStep::InitializeMetadata => {
                Ok(spl_token_metadata_interface::instruction::initialize(
                    &TOKEN_2022_PROGRAM_ID,
                    &self.mint,
                    &self.authority,
                    &self.mint,
                    &self.authority,
                    self.metadata.name.clone(),
                    self.metadata.symbol.clone(),
                    self.metadata.uri.clone(),
                ))
            }
        }
    }
}

/// Token-2022 associated token account of `owner` for `mint`
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(owner, mint, &TOKEN_2022_PROGRAM_ID)
}

/// Create `owner`'s associated token account for `mint`, funded by `payer`
pub fn create_associated_account_instruction(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Instruction {
    create_associated_token_account(payer, owner, mint, &TOKEN_2022_PROGRAM_ID)
}

/// Mint `amount` base units of `mint` into `destination`
pub fn mint_to_instruction(
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    spl_token_2022::instruction::mint_to(
        &TOKEN_2022_PROGRAM_ID,
        mint,
        destination,
        authority,
        &[],
        amount,
    )
}
