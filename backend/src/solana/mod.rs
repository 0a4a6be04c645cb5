//! # Solana Client Module
//!
//! Everything the backend knows about the host ledger goes through here.
//!
//! ## Layers
//!
//! | Type | Role |
//! |------|------|
//! | `Ledger` | Blocking trait over the handful of RPC calls the vault needs |
//! | `RpcLedger` | `Ledger` backed by `solana_client::RpcClient` |
//! | `SolanaClient` | Async wrapper: blocking pool, timeouts, retries for reads |
//!
//! ## Account Data Flow
//!
//! ```text
//! 1. VaultManager asks for the vault state of an owner
//!              ↓
//! 2. SolanaClient.get_vault_state(state_pda)      (retried read)
//!              ↓
//! 3. Ledger.get_account() on the blocking pool
//!              ↓
//! 4. Check owner program + Anchor discriminator, decode fields
//!              ↓
//! 5. Return typed VaultStateData
//! ```

#[cfg(test)]
pub mod mock;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use solana_client::client_error::ClientError;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, TransactionError},
};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::AppConfig;

/// Anchor account discriminator of `VaultState`: `sha256("account:VaultState")[..8]`.
pub const VAULT_STATE_DISCRIMINATOR: [u8; 8] = [228, 196, 82, 165, 98, 210, 235, 152];

/// Serialized size of `VaultState`, discriminator included.
pub const VAULT_STATE_LEN: usize = 66;

/// Fee charged per signature. Vault transactions carry one signature.
pub const SIGNATURE_FEE_LAMPORTS: u64 = 5_000;

const INITIAL_RETRY_DELAY_MS: u64 = 200;
const MAX_RETRY_DELAY_MS: u64 = 10_000;

/// Exponential backoff before retry `attempt + 1`, capped at 10 s.
fn retry_delay(attempt: u32) -> Duration {
    let factor = 1u64 << attempt.min(16);
    Duration::from_millis(INITIAL_RETRY_DELAY_MS.saturating_mul(factor).min(MAX_RETRY_DELAY_MS))
}

/// Errors returned by the host ledger.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LedgerError {
    /// Transport or node error. Usually transient.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The ledger executed the transaction and rejected it.
    #[error("Transaction rejected: {0}")]
    Rejected(TransactionError),

    /// Every attempt timed out.
    #[error("RPC operation timed out after {0} attempts")]
    Timeout(u32),

    /// The blocking task running the RPC call panicked or was cancelled.
    #[error("Blocking task failed: {0}")]
    Task(String),

    /// An account exists but does not hold a `VaultState`.
    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),
}

impl LedgerError {
    /// Rejections are final; anything else may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        !matches!(self, LedgerError::Rejected(_) | LedgerError::InvalidAccountData(_))
    }
}

impl From<ClientError> for LedgerError {
    fn from(err: ClientError) -> Self {
        match err.get_transaction_error() {
            Some(tx_err) => LedgerError::Rejected(tx_err),
            None => LedgerError::Rpc(err.to_string()),
        }
    }
}

/// The RPC surface the vault backend depends on.
///
/// Methods block; `SolanaClient` moves them onto the Tokio blocking pool.
pub trait Ledger: Send + Sync {
    fn get_slot(&self) -> Result<u64, LedgerError>;

    /// `Ok(None)` when the account does not exist.
    fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError>;

    fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64, LedgerError>;

    fn get_latest_blockhash(&self) -> Result<Hash, LedgerError>;

    /// Submit and wait for confirmation.
    fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature, LedgerError>;
}

/// `Ledger` backed by a JSON-RPC node.
pub struct RpcLedger {
    client: RpcClient,
}

impl RpcLedger {
    pub fn new(rpc_url: &str) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url.to_string(), CommitmentConfig::confirmed()),
        }
    }
}

impl Ledger for RpcLedger {
    fn get_slot(&self) -> Result<u64, LedgerError> {
        Ok(self.client.get_slot()?)
    }

    fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError> {
        let response = self
            .client
            .get_account_with_commitment(address, CommitmentConfig::confirmed())?;
        Ok(response.value)
    }

    fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64, LedgerError> {
        Ok(self.client.get_minimum_balance_for_rent_exemption(data_len)?)
    }

    fn get_latest_blockhash(&self) -> Result<Hash, LedgerError> {
        Ok(self.client.get_latest_blockhash()?)
    }

    fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature, LedgerError> {
        Ok(self.client.send_and_confirm_transaction(transaction)?)
    }
}

/// Decoded `VaultState` account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultStateData {
    pub owner: Pubkey,
    pub state_bump: u8,
    pub vault_bump: u8,
    pub created_at: i64,
    pub total_deposited: u64,
    pub total_withdrawn: u64,
    /// Lamports held by the state account itself (its rent).
    pub lamports: u64,
}

impl VaultStateData {
    /// Decode raw account bytes.
    ///
    /// ## Account Structure (Anchor)
    ///
    /// ```text
    /// Offset | Size | Field
    /// -------|------|------
    /// 0      | 8    | Anchor discriminator
    /// 8      | 32   | owner
    /// 40     | 1    | state_bump
    /// 41     | 1    | vault_bump
    /// 42     | 8    | created_at (i64)
    /// 50     | 8    | total_deposited
    /// 58     | 8    | total_withdrawn
    /// ```
    pub fn decode(data: &[u8], lamports: u64) -> Result<Self, LedgerError> {
        if data.len() < VAULT_STATE_LEN {
            return Err(LedgerError::InvalidAccountData(format!(
                "expected {} bytes, got {}",
                VAULT_STATE_LEN,
                data.len()
            )));
        }
        if data[..8] != VAULT_STATE_DISCRIMINATOR {
            return Err(LedgerError::InvalidAccountData(
                "discriminator does not match VaultState".to_string(),
            ));
        }

        let owner = Pubkey::try_from(&data[8..40])
            .map_err(|_| LedgerError::InvalidAccountData("invalid owner".to_string()))?;

        Ok(Self {
            owner,
            state_bump: data[40],
            vault_bump: data[41],
            created_at: i64::from_le_bytes(read_array(data, 42)?),
            total_deposited: u64::from_le_bytes(read_array(data, 50)?),
            total_withdrawn: u64::from_le_bytes(read_array(data, 58)?),
            lamports,
        })
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created_at, 0).single()
    }
}

fn read_array(data: &[u8], offset: usize) -> Result<[u8; 8], LedgerError> {
    data.get(offset..offset + 8)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| LedgerError::InvalidAccountData(format!("truncated field at offset {}", offset)))
}

/// Async client for the host ledger.
///
/// ## Usage
///
/// ```rust,ignore
/// let client = SolanaClient::new(&config);
/// let lamports = client.get_lamports(&vault_pda).await?;
/// let healthy = client.get_health().await;
/// ```
#[derive(Clone)]
pub struct SolanaClient {
    ledger: Arc<dyn Ledger>,

    program_id: Pubkey,

    rpc_timeout: Duration,

    max_retries: u32,
}

impl SolanaClient {
    /// Client talking to the RPC node named in the configuration.
    pub fn new(config: &AppConfig) -> Self {
        info!("Solana client initialized:");
        info!("  RPC: {}", config.solana_rpc_url);
        info!("  Program: {}", config.vault_program_id);

        Self::with_ledger(Arc::new(RpcLedger::new(&config.solana_rpc_url)), config)
    }

    pub fn with_ledger(ledger: Arc<dyn Ledger>, config: &AppConfig) -> Self {
        Self {
            ledger,
            program_id: config.vault_program_id,
            rpc_timeout: Duration::from_secs(config.rpc_timeout_secs),
            max_retries: config.rpc_max_retries,
        }
    }

    /// Get the vault program ID.
    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    async fn run_blocking<T, F>(&self, operation: F) -> Result<T, LedgerError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn Ledger) -> Result<T, LedgerError> + Send + 'static,
    {
        let ledger = self.ledger.clone();
        tokio::task::spawn_blocking(move || operation(ledger.as_ref()))
            .await
            .map_err(|e| LedgerError::Task(e.to_string()))?
    }

    /// Run a read with a per-attempt timeout and exponential backoff
    /// (200ms, 400ms, 800ms, ...). Rejections are returned immediately.
    async fn retry_read<T, F>(&self, operation: F) -> Result<T, LedgerError>
    where
        T: Send + 'static,
        F: Fn(&dyn Ledger) -> Result<T, LedgerError> + Clone + Send + 'static,
    {
        let mut last_error = LedgerError::Timeout(self.max_retries + 1);

        for attempt in 0..=self.max_retries {
            match timeout(self.rpc_timeout, self.run_blocking(operation.clone())).await {
                Ok(Ok(result)) => {
                    if attempt > 0 {
                        info!("RPC operation succeeded after {} retries", attempt);
                    }
                    return Ok(result);
                }
                Ok(Err(e)) if !e.is_transient() => return Err(e),
                Ok(Err(e)) => {
                    debug!("RPC operation failed (attempt {}): {}", attempt + 1, e);
                    last_error = e;
                }
                Err(_) => {
                    debug!("RPC operation timed out (attempt {})", attempt + 1);
                    last_error = LedgerError::Timeout(attempt + 1);
                }
            }

            if attempt < self.max_retries {
                tokio::time::sleep(retry_delay(attempt)).await;
            }
        }

        warn!("RPC operation failed after {} attempts: {}", self.max_retries + 1, last_error);
        Err(last_error)
    }

    /// `true` when the node answers a slot query.
    pub async fn get_health(&self) -> bool {
        match self.get_slot().await {
            Ok(slot) => {
                debug!("Solana RPC healthy at slot {}", slot);
                true
            }
            Err(e) => {
                warn!("Solana RPC health check failed: {}", e);
                false
            }
        }
    }

    pub async fn get_slot(&self) -> Result<u64, LedgerError> {
        self.retry_read(|ledger| ledger.get_slot()).await
    }

    pub async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError> {
        let address = *address;
        self.retry_read(move |ledger| ledger.get_account(&address)).await
    }

    /// Lamports held by `address`; 0 when the account does not exist.
    pub async fn get_lamports(&self, address: &Pubkey) -> Result<u64, LedgerError> {
        Ok(self
            .get_account(address)
            .await?
            .map(|account| account.lamports)
            .unwrap_or(0))
    }

    pub async fn rent_exempt_minimum(&self, data_len: usize) -> Result<u64, LedgerError> {
        self.retry_read(move |ledger| ledger.get_minimum_balance_for_rent_exemption(data_len))
            .await
    }

    /// Blockhashes expire after about two minutes, so fetch one per transaction.
    pub async fn get_latest_blockhash(&self) -> Result<Hash, LedgerError> {
        let blockhash = self.retry_read(|ledger| ledger.get_latest_blockhash()).await?;
        debug!("Got recent blockhash: {}", blockhash);
        Ok(blockhash)
    }

    /// Fetch and decode the VaultState at `address`.
    ///
    /// * `Ok(None)` - no account, or an account not owned by the vault program
    /// * `Err(LedgerError::InvalidAccountData)` - program-owned but not a VaultState
    pub async fn get_vault_state(&self, address: &Pubkey) -> Result<Option<VaultStateData>, LedgerError> {
        match self.get_account(address).await? {
            Some(account) if account.owner == self.program_id => {
                VaultStateData::decode(&account.data, account.lamports).map(Some)
            }
            Some(account) => {
                debug!(
                    "Account {} is owned by {}, not the vault program",
                    address, account.owner
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Submit a signed transaction and wait for confirmation. Not retried:
    /// a resubmission could apply the operation twice.
    pub async fn send_transaction(&self, transaction: Transaction) -> Result<Signature, LedgerError> {
        self.run_blocking(move |ledger| ledger.send_and_confirm_transaction(&transaction))
            .await
    }
}
