//! # Transaction Submitter Service
//!
//! Signs vault transactions with a keypair file and submits them, or submits
//! transactions the owner already signed elsewhere.

use std::fs;

use solana_sdk::{
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use tracing::{error, info};

use crate::services::transaction_builder::TransactionBuilder;
use crate::solana::{LedgerError, SolanaClient};

/// Errors that can occur when submitting transactions.
#[derive(Debug, thiserror::Error)]
pub enum TransactionSubmitterError {
    /// Failed to load keypair.
    #[error("Failed to load keypair: {0}")]
    KeypairError(String),

    /// Failed to decode transaction.
    #[error("Failed to decode transaction: {0}")]
    DecodeError(String),

    /// Failed to sign transaction.
    #[error("Failed to sign transaction: {0}")]
    SigningError(String),

    /// The ledger refused or could not process the transaction.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Load a Solana CLI keypair file (JSON array of 64 bytes).
///
/// `~` and environment variables in the path are expanded.
pub fn load_keypair(keypair_path: &str) -> Result<Keypair, TransactionSubmitterError> {
    let expanded = shellexpand::full(keypair_path)
        .map_err(|e| TransactionSubmitterError::KeypairError(format!("Invalid path: {}", e)))?;

    let contents = fs::read_to_string(expanded.as_ref())
        .map_err(|e| TransactionSubmitterError::KeypairError(format!("Failed to read keypair: {}", e)))?;

    let keypair_bytes: Vec<u8> = serde_json::from_str(&contents)
        .map_err(|e| TransactionSubmitterError::KeypairError(format!("Failed to parse keypair: {}", e)))?;

    Keypair::from_bytes(&keypair_bytes)
        .map_err(|e| TransactionSubmitterError::KeypairError(format!("Invalid keypair bytes: {}", e)))
}

/// Transaction Submitter service.
#[derive(Clone)]
pub struct TransactionSubmitter {
    solana: SolanaClient,
}

impl TransactionSubmitter {
    pub fn new(solana: SolanaClient) -> Self {
        Self { solana }
    }

    /// Sign `transaction` with `keypair` and submit it.
    ///
    /// The blockhash is refreshed right before signing.
    ///
    /// ## Returns
    ///
    /// Transaction signature once the ledger confirmed it.
    pub async fn sign_and_submit(
        &self,
        mut transaction: Transaction,
        keypair: &Keypair,
    ) -> Result<Signature, TransactionSubmitterError> {
        info!("Signing and submitting transaction as {}", keypair.pubkey());

        let recent_blockhash = self.solana.get_latest_blockhash().await?;
        transaction
            .try_sign(&[keypair], recent_blockhash)
            .map_err(|e| TransactionSubmitterError::SigningError(e.to_string()))?;

        self.submit(transaction).await
    }

    /// Submit an already-signed, base64-encoded transaction.
    pub async fn submit_signed_transaction(
        &self,
        signed_tx_base64: &str,
    ) -> Result<Signature, TransactionSubmitterError> {
        info!("Submitting signed transaction...");

        let transaction = TransactionBuilder::decode(signed_tx_base64)
            .map_err(|e| TransactionSubmitterError::DecodeError(e.to_string()))?;

        if !transaction.is_signed() {
            return Err(TransactionSubmitterError::DecodeError(
                "transaction is missing signatures".to_string(),
            ));
        }

        self.submit(transaction).await
    }

    async fn submit(&self, transaction: Transaction) -> Result<Signature, TransactionSubmitterError> {
        match self.solana.send_transaction(transaction).await {
            Ok(signature) => {
                info!("✅ Transaction submitted: {}", signature);
                Ok(signature)
            }
            Err(e) => {
                error!("Transaction failed: {}", e);
                Err(e.into())
            }
        }
    }
}
