pub mod instructions;
pub mod launchpad;
pub mod layout;
pub mod metadata;

pub use instructions::{associated_token_address, MintSetupPlan, MintSetupStep};
pub use launchpad::{LaunchRequest, TokenLaunchpad};
pub use layout::MintAccountLayout;
pub use metadata::TokenMetadataInput;
