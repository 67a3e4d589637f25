use solana_sdk::{program_error::ProgramError, pubkey::Pubkey};
use spl_pod::optional_keys::OptionalNonZeroPubkey;
use spl_token_metadata_interface::state::TokenMetadata;

pub const DEFAULT_TOKEN_NAME: &str = "ADITYA";
pub const DEFAULT_TOKEN_SYMBOL: &str = "ADI";
pub const DEFAULT_TOKEN_URI: &str = "https://adityapsingh-dev.github.io/tokenJson/example.json";

/// Name, symbol and URI entered for a new token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadataInput {
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

impl Default for TokenMetadataInput {
    fn default() -> Self {
        Self {
            name: DEFAULT_TOKEN_NAME.to_string(),
            symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
            uri: DEFAULT_TOKEN_URI.to_string(),
        }
    }
}

impl TokenMetadataInput {
    /// Build from optional form fields; blank or missing fields fall back to defaults
    pub fn from_fields(name: Option<&str>, symbol: Option<&str>, uri: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            name: non_blank(name).unwrap_or(defaults.name),
            symbol: non_blank(symbol).unwrap_or(defaults.symbol),
            uri: non_blank(uri).unwrap_or(defaults.uri),
        }
    }

    /// The on-mint metadata record, with an empty additional-metadata list
    pub fn to_token_metadata(
        &self,
        mint: Pubkey,
        update_authority: Pubkey,
    ) -> Result<TokenMetadata, ProgramError> {
        Ok(TokenMetadata {
            update_authority: OptionalNonZeroPubkey::try_from(Some(update_authority))?,
            mint,
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            uri: self.uri.clone(),
            additional_metadata: Vec::new(),
        })
    }
}

fn non_blank(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
