//! # Transaction Builder Service
//!
//! Creates Solana transactions for the four vault instructions.
//!
//! ## Transaction Structure
//!
//! ```text
//! Transaction
//! ├── Recent Blockhash (for expiration)
//! ├── Fee Payer (the vault owner)
//! └── Instructions[]
//!     └── Vault Instruction
//!         ├── Program ID
//!         ├── Accounts[]: owner (signer), vault_state, vault, system_program
//!         └── Data: 8-byte discriminator [+ u64 amount, little endian]
//! ```
//!
//! ## Unsigned vs Signed Transactions
//!
//! Transactions leave the builder **unsigned**. Either the backend signs them
//! with a keypair it was pointed at (`TransactionSubmitter`), or they go back
//! to the caller base64 encoded:
//!
//! ```text
//! 1. Backend builds unsigned transaction
//!              ↓
//! 2. Caller receives it (base64 bincode)
//!              ↓
//! 3. Owner signs with their wallet
//!              ↓
//! 4. Signed transaction comes back through POST /vault/submit
//! ```

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    message::Message,
    pubkey::Pubkey,
    system_program,
    transaction::Transaction,
};
use tracing::debug;

use crate::services::addresses::VaultAddresses;
use crate::solana::{LedgerError, SolanaClient};

// ==========================================
// INSTRUCTION DISCRIMINATORS
// ==========================================
// Anchor: sha256("global:<instruction_name>")[..8]

pub const INITIALIZE_DISCRIMINATOR: [u8; 8] = [175, 175, 109, 31, 13, 152, 155, 237];
pub const DEPOSIT_DISCRIMINATOR: [u8; 8] = [242, 35, 198, 137, 82, 225, 242, 182];
pub const WITHDRAW_DISCRIMINATOR: [u8; 8] = [183, 18, 70, 156, 148, 109, 161, 34];
pub const CLOSE_DISCRIMINATOR: [u8; 8] = [98, 165, 201, 177, 108, 65, 206, 96];

/// Errors that can occur when building transactions.
#[derive(Debug, thiserror::Error)]
pub enum TransactionBuilderError {
    /// Failed to get recent blockhash.
    #[error("Failed to get blockhash: {0}")]
    BlockhashError(#[from] LedgerError),

    /// Failed to serialize or deserialize a transaction.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Vault operations a transaction can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultInstruction {
    Initialize,
    Deposit(u64),
    Withdraw(u64),
    Close,
}

impl VaultInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            VaultInstruction::Initialize => "initialize",
            VaultInstruction::Deposit(_) => "deposit",
            VaultInstruction::Withdraw(_) => "withdraw",
            VaultInstruction::Close => "close",
        }
    }

    /// Anchor instruction data.
    pub fn data(&self) -> Vec<u8> {
        match self {
            VaultInstruction::Initialize => INITIALIZE_DISCRIMINATOR.to_vec(),
            VaultInstruction::Deposit(amount) => with_amount(DEPOSIT_DISCRIMINATOR, *amount),
            VaultInstruction::Withdraw(amount) => with_amount(WITHDRAW_DISCRIMINATOR, *amount),
            VaultInstruction::Close => CLOSE_DISCRIMINATOR.to_vec(),
        }
    }
}

fn with_amount(discriminator: [u8; 8], amount: u64) -> Vec<u8> {
    let mut data = discriminator.to_vec();
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

/// The Transaction Builder service.
///
/// ## Usage
///
/// ```rust,ignore
/// let builder = TransactionBuilder::new(solana_client);
/// let tx = builder.build(&owner, VaultInstruction::Deposit(1_000_000_000)).await?;
/// let tx_base64 = TransactionBuilder::encode(&tx)?;
/// ```
#[derive(Clone)]
pub struct TransactionBuilder {
    /// Solana RPC client.
    solana: SolanaClient,

    /// The vault program ID.
    program_id: Pubkey,
}

impl TransactionBuilder {
    pub fn new(solana: SolanaClient) -> Self {
        let program_id = *solana.program_id();
        Self { solana, program_id }
    }

    /// Build the instruction for `owner`.
    ///
    /// All four instructions take the same accounts:
    ///
    /// 1. Owner (signer, fee payer)
    /// 2. VaultState PDA
    /// 3. VaultAccount PDA
    /// 4. System Program
    pub fn instruction(&self, owner: &Pubkey, operation: VaultInstruction) -> Instruction {
        let addresses = VaultAddresses::derive(owner, &self.program_id);

        Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(*owner, true),
                AccountMeta::new(addresses.vault_state, false),
                AccountMeta::new(addresses.vault, false),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
            data: operation.data(),
        }
    }

    /// Build an unsigned transaction with a fresh blockhash, paid for by `owner`.
    pub async fn build(
        &self,
        owner: &Pubkey,
        operation: VaultInstruction,
    ) -> Result<Transaction, TransactionBuilderError> {
        let instruction = self.instruction(owner, operation);
        let recent_blockhash = self.solana.get_latest_blockhash().await?;

        let message = Message::new_with_blockhash(&[instruction], Some(owner), &recent_blockhash);
        debug!("Built {} transaction for {}", operation.name(), owner);

        Ok(Transaction::new_unsigned(message))
    }

    /// Base64 encoding of the bincode-serialized transaction.
    pub fn encode(transaction: &Transaction) -> Result<String, TransactionBuilderError> {
        let bytes = bincode::serialize(transaction)
            .map_err(|e| TransactionBuilderError::SerializationError(e.to_string()))?;
        Ok(BASE64.encode(bytes))
    }

    pub fn decode(transaction_base64: &str) -> Result<Transaction, TransactionBuilderError> {
        let bytes = BASE64
            .decode(transaction_base64)
            .map_err(|e| TransactionBuilderError::SerializationError(e.to_string()))?;
        bincode::deserialize(&bytes)
            .map_err(|e| TransactionBuilderError::SerializationError(format!("Failed to deserialize: {}", e)))
    }
}
