pub mod transaction;

pub use transaction::TransactionBuilder;
