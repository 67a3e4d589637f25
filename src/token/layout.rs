use solana_sdk::program_error::ProgramError;
use spl_token_2022::{
    extension::ExtensionType,
    state::Mint,
};
use spl_token_metadata_interface::state::TokenMetadata;
use spl_type_length_value::variable_len_pack::VariableLenPack;

/// Size of the TLV type discriminator in a Token-2022 account
pub const TYPE_SIZE: usize = 2;
/// Size of the TLV length field in a Token-2022 account
pub const LENGTH_SIZE: usize = 2;

/// Extensions allocated when the mint account is created
pub const MINT_EXTENSIONS: [ExtensionType; 1] = [ExtensionType::MetadataPointer];

/// Storage needed by a mint carrying its own metadata
///
/// The account is created with `mint_len` bytes; the metadata TLV entry is
/// appended by the token program when metadata is initialized, so rent must
/// be funded for both up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintAccountLayout {
    pub mint_len: usize,
    pub metadata_len: usize,
}

impl MintAccountLayout {
    pub fn for_metadata(metadata: &TokenMetadata) -> Result<Self, ProgramError> {
        let mint_len = ExtensionType::try_calculate_account_len::<Mint>(&MINT_EXTENSIONS)?;
        let metadata_len = TYPE_SIZE + LENGTH_SIZE + metadata.get_packed_len()?;

        Ok(Self {
            mint_len,
            metadata_len,
        })
    }

    /// Byte count the rent-exemption quote is requested for
    pub fn rent_exempt_size(&self) -> usize {
        self.mint_len + self.metadata_len
    }
}
