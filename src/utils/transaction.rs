use solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    hash::Hash,
    instruction::Instruction,
    message::Message,
    pubkey::Pubkey,
    signature::Keypair,
    signer::SignerError,
    transaction::Transaction,
};
use tracing::debug;

/// Builds legacy transactions for a wallet fee payer
///
/// The result is only partially signed: co-signers (such as a freshly
/// generated mint account) sign here and the fee payer's signature is left
/// to the wallet.
pub struct TransactionBuilder {
    instructions: Vec<Instruction>,
    payer: Pubkey,
    compute_unit_price: Option<u64>,
}

impl TransactionBuilder {
    pub fn new(payer: Pubkey) -> Self {
        Self {
            instructions: Vec::new(),
            payer,
            compute_unit_price: None,
        }
    }

    /// Add an instruction to the transaction
    pub fn add_instruction(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    /// Add multiple instructions to the transaction
    pub fn add_instructions(&mut self, instructions: Vec<Instruction>) -> &mut Self {
        self.instructions.extend(instructions);
        self
    }

    /// Set compute unit price (micro-lamports per compute unit)
    pub fn set_compute_unit_price(&mut self, price: u64) -> &mut Self {
        self.compute_unit_price = Some(price);
        self
    }

    /// Build the transaction with `recent_blockhash` and sign it with `co_signers`
    pub fn build(
        &self,
        recent_blockhash: Hash,
        co_signers: &[&Keypair],
    ) -> Result<Transaction, SignerError> {
        let mut instructions = Vec::with_capacity(self.instructions.len() + 1);

        if let Some(price) = self.compute_unit_price {
            instructions.push(ComputeBudgetInstruction::set_compute_unit_price(price));
        }
        instructions.extend(self.instructions.iter().cloned());

        let message = Message::new(&instructions, Some(&self.payer));
        let mut transaction = Transaction::new_unsigned(message);
        transaction.message.recent_blockhash = recent_blockhash;

        if !co_signers.is_empty() {
            transaction.try_partial_sign(co_signers, recent_blockhash)?;
        }

        debug!(
            "Built transaction with {} instructions, {} co-signer(s)",
            instructions.len(),
            co_signers.len()
        );

        Ok(transaction)
    }
}
