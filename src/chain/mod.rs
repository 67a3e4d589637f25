pub mod connection;
pub mod constants;
pub mod explorer;

pub use connection::{LedgerConnection, RpcConnection, TokenBalance};
pub use constants::{MINT_AMOUNT, TOKEN_2022_PROGRAM_ID, TOKEN_DECIMALS};
pub use explorer::{Cluster, Explorer};
