//! # Vault Manager Service
//!
//! The VaultManager is the central service for vault operations. It checks
//! preconditions against the ledger, builds the transaction, and either
//! submits it or hands it back unsigned.
//!
//! ## Flow Example: Deposit
//!
//! ```text
//! 1. Owner requests deposit via API
//!                ↓
//! 2. VaultManager.deposit() called
//!                ↓
//! 3. Preflight: owner key, amount > 0, vault exists, owner funds
//!                ↓
//! 4. TransactionBuilder builds the Solana tx
//!                ↓
//! 5a. Keypair given:  sign, submit, wait for confirmation → "submitted"
//! 5b. No keypair:     return base64 unsigned tx            → "pending"
//! ```
//!
//! The preflight is advisory: the program enforces the same rules, and a
//! rejection that slips past it (a concurrent withdrawal, say) is mapped
//! back to the same error by its custom error code.

use std::str::FromStr;

use chrono::Utc;
use solana_sdk::{
    instruction::InstructionError,
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    transaction::TransactionError,
};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::models::{
    AmountRequest, CloseVaultRequest, InitializeVaultRequest, OperationResponse, SigningOptions,
    SubmitTransactionRequest, VaultBalanceResponse,
};
use crate::solana::{LedgerError, SolanaClient, VaultStateData, SIGNATURE_FEE_LAMPORTS, VAULT_STATE_LEN};
use crate::utils::{format_sol, truncate_string};

use super::addresses::VaultAddresses;
use super::transaction_builder::{TransactionBuilderError, VaultInstruction};
use super::transaction_submitter::{load_keypair, TransactionSubmitterError};
use super::{TransactionBuilder, TransactionSubmitter};

/// Custom error codes returned by the ledger for vault transactions.
mod program_error {
    /// System program: the VaultState address is already in use.
    pub const ACCOUNT_ALREADY_IN_USE: u32 = 0;
    /// System program: transfer source lacks the lamports.
    pub const RESULT_WITH_NEGATIVE_LAMPORTS: u32 = 1;
    /// Anchor: PDA seeds do not match the signer.
    pub const CONSTRAINT_SEEDS: u32 = 2006;
    /// Anchor: the VaultState account does not exist.
    pub const ACCOUNT_NOT_INITIALIZED: u32 = 3012;

    pub const INVALID_AMOUNT: u32 = 6000;
    pub const INSUFFICIENT_VAULT_FUNDS: u32 = 6001;
    pub const INSUFFICIENT_EXTERNAL_FUNDS: u32 = 6002;
    pub const UNAUTHORIZED: u32 = 6003;
    pub const OVERFLOW: u32 = 6004;
}

/// Errors that can occur in vault operations.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// A vault already exists for the owner.
    #[error("Vault already initialized for owner: {0}")]
    AlreadyInitialized(String),

    /// No vault exists for the owner.
    #[error("Vault not initialized for owner: {0}")]
    NotInitialized(String),

    /// The signer is not the vault owner.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The vault cannot cover the withdrawal.
    #[error("Insufficient vault funds: {0}")]
    InsufficientVaultFunds(String),

    /// The owner's wallet cannot cover the deposit or fees.
    #[error("Insufficient external funds: {0}")]
    InsufficientExternalFunds(String),

    /// Amount must be greater than zero.
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Solana transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionError(String),

    /// The RPC node could not be reached.
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),
}

impl VaultError {
    /// Error code used in the API envelope.
    pub fn code(&self) -> &'static str {
        match self {
            VaultError::AlreadyInitialized(_) => "ALREADY_INITIALIZED",
            VaultError::NotInitialized(_) => "NOT_INITIALIZED",
            VaultError::Unauthorized(_) => "UNAUTHORIZED",
            VaultError::InsufficientVaultFunds(_) => "INSUFFICIENT_VAULT_FUNDS",
            VaultError::InsufficientExternalFunds(_) => "INSUFFICIENT_EXTERNAL_FUNDS",
            VaultError::InvalidAmount => "INVALID_AMOUNT",
            VaultError::InvalidInput(_) => "INVALID_INPUT",
            VaultError::TransactionError(_) => "TRANSACTION_FAILED",
            VaultError::LedgerUnavailable(_) => "LEDGER_UNAVAILABLE",
        }
    }

    /// Map a ledger rejection back onto the vault error taxonomy.
    pub fn from_transaction_error(err: TransactionError) -> Self {
        use program_error::*;

        match err {
            TransactionError::InstructionError(_, InstructionError::Custom(code)) => match code {
                ACCOUNT_ALREADY_IN_USE => {
                    VaultError::AlreadyInitialized("vault state account already in use".to_string())
                }
                RESULT_WITH_NEGATIVE_LAMPORTS => {
                    VaultError::InsufficientExternalFunds("insufficient lamports for transfer".to_string())
                }
                CONSTRAINT_SEEDS | UNAUTHORIZED => {
                    VaultError::Unauthorized("signer does not own this vault".to_string())
                }
                ACCOUNT_NOT_INITIALIZED => {
                    VaultError::NotInitialized("vault state account does not exist".to_string())
                }
                INVALID_AMOUNT => VaultError::InvalidAmount,
                INSUFFICIENT_VAULT_FUNDS => {
                    VaultError::InsufficientVaultFunds("rejected by the vault program".to_string())
                }
                INSUFFICIENT_EXTERNAL_FUNDS => {
                    VaultError::InsufficientExternalFunds("rejected by the vault program".to_string())
                }
                OVERFLOW => VaultError::TransactionError("lifetime counter overflow".to_string()),
                other => VaultError::TransactionError(format!("custom program error {}", other)),
            },
            TransactionError::InstructionError(_, InstructionError::MissingRequiredSignature) => {
                VaultError::Unauthorized("missing owner signature".to_string())
            }
            TransactionError::InsufficientFundsForFee => {
                VaultError::InsufficientExternalFunds("cannot pay the transaction fee".to_string())
            }
            TransactionError::InsufficientFundsForRent { account_index } => {
                VaultError::InsufficientExternalFunds(format!(
                    "account {} would be left below the rent-exempt minimum",
                    account_index
                ))
            }
            other => VaultError::TransactionError(other.to_string()),
        }
    }
}

impl From<LedgerError> for VaultError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Rejected(tx_err) => VaultError::from_transaction_error(tx_err),
            LedgerError::InvalidAccountData(msg) => VaultError::TransactionError(msg),
            other => VaultError::LedgerUnavailable(other.to_string()),
        }
    }
}

impl From<TransactionBuilderError> for VaultError {
    fn from(err: TransactionBuilderError) -> Self {
        match err {
            TransactionBuilderError::BlockhashError(e) => e.into(),
            TransactionBuilderError::SerializationError(msg) => VaultError::TransactionError(msg),
        }
    }
}

impl From<TransactionSubmitterError> for VaultError {
    fn from(err: TransactionSubmitterError) -> Self {
        match err {
            TransactionSubmitterError::KeypairError(msg) => VaultError::InvalidInput(msg),
            TransactionSubmitterError::DecodeError(msg) => VaultError::InvalidInput(msg),
            TransactionSubmitterError::SigningError(msg) => VaultError::Unauthorized(msg),
            TransactionSubmitterError::Ledger(e) => e.into(),
        }
    }
}

/// Parse a base58 public key from a request.
pub fn parse_pubkey(value: &str) -> Result<Pubkey, VaultError> {
    Pubkey::from_str(value).map_err(|_| VaultError::InvalidInput(format!("Invalid public key: {}", value)))
}

/// The main service for vault operations.
///
/// Holds no ledger state: every call reads what it needs.
///
/// ## Usage
///
/// ```rust,ignore
/// let manager = VaultManager::new(solana, config);
///
/// // Get vault balance
/// let balance = manager.get_vault_balance("7xKt9Fj2...").await?;
///
/// // Process a deposit
/// let result = manager.deposit(request).await?;
/// ```
#[derive(Clone)]
pub struct VaultManager {
    /// Solana client for ledger reads.
    solana: SolanaClient,

    /// Application configuration.
    config: AppConfig,

    /// Transaction builder for creating Solana transactions.
    tx_builder: TransactionBuilder,

    /// Transaction submitter for signing and submitting transactions.
    tx_submitter: TransactionSubmitter,
}

impl VaultManager {
    /// Create a new VaultManager instance.
    ///
    /// ## Arguments
    ///
    /// * `solana` - Solana client
    /// * `config` - Application configuration
    pub fn new(solana: SolanaClient, config: AppConfig) -> Self {
        let tx_builder = TransactionBuilder::new(solana.clone());
        let tx_submitter = TransactionSubmitter::new(solana.clone());

        Self {
            solana,
            config,
            tx_builder,
            tx_submitter,
        }
    }

    // ==========================================
    // VAULT QUERIES
    // ==========================================

    /// Derived vault addresses of `owner`.
    pub fn addresses(&self, owner: &str) -> Result<VaultAddresses, VaultError> {
        let owner = parse_pubkey(owner)?;
        Ok(VaultAddresses::derive(&owner, self.solana.program_id()))
    }

    /// Get the current balance of a vault, straight from the ledger.
    ///
    /// ## Returns
    ///
    /// * `Ok(VaultBalanceResponse)` - Balances; all zero with
    ///   `initialized: false` when the owner has no vault
    /// * `Err(VaultError::InvalidInput)` - Malformed owner key
    pub async fn get_vault_balance(&self, owner: &str) -> Result<VaultBalanceResponse, VaultError> {
        debug!("Getting vault balance for: {}", owner);

        let addresses = self.addresses(owner)?;
        let state = self.solana.get_vault_state(&addresses.vault_state).await?;
        let vault_balance = self.solana.get_lamports(&addresses.vault).await?;

        let reserve = match state {
            Some(_) => self.solana.rent_exempt_minimum(0).await?,
            None => 0,
        };
        let withdrawable = vault_balance.saturating_sub(reserve);

        Ok(VaultBalanceResponse {
            owner: addresses.owner.to_string(),
            initialized: state.is_some(),
            vault_state_address: addresses.vault_state.to_string(),
            vault_address: addresses.vault.to_string(),
            vault_balance,
            reserve,
            withdrawable,
            state_balance: state.as_ref().map(|s| s.lamports).unwrap_or(0),
            total_deposited: state.as_ref().map(|s| s.total_deposited).unwrap_or(0),
            total_withdrawn: state.as_ref().map(|s| s.total_withdrawn).unwrap_or(0),
            formatted_balance: format_sol(vault_balance),
            formatted_withdrawable: format_sol(withdrawable),
            created_at: state.as_ref().and_then(|s| s.created_at_utc()),
        })
    }

    // ==========================================
    // VAULT OPERATIONS
    // ==========================================

    /// Initialize a vault for the owner.
    ///
    /// ## Errors
    ///
    /// * `AlreadyInitialized` - The owner already has a vault
    /// * `InsufficientExternalFunds` - Owner cannot pay the state rent and reserve
    pub async fn initialize_vault(&self, request: InitializeVaultRequest) -> Result<OperationResponse, VaultError> {
        info!("Initializing vault for owner: {}", request.owner_pubkey);

        let owner = parse_pubkey(&request.owner_pubkey)?;
        let addresses = VaultAddresses::derive(&owner, self.solana.program_id());

        if self.solana.get_vault_state(&addresses.vault_state).await?.is_some() {
            return Err(VaultError::AlreadyInitialized(owner.to_string()));
        }

        let required = self.solana.rent_exempt_minimum(VAULT_STATE_LEN).await?
            + self.solana.rent_exempt_minimum(0).await?;
        self.require_owner_funds(&owner, required).await?;

        self.execute(owner, VaultInstruction::Initialize, &request.signing).await
    }

    /// Deposit lamports from the owner's wallet into the vault.
    pub async fn deposit(&self, request: AmountRequest) -> Result<OperationResponse, VaultError> {
        info!("Processing deposit for {}", request.owner_pubkey);

        let owner = parse_pubkey(&request.owner_pubkey)?;
        let amount = parse_amount(&request)?;
        self.require_vault(&owner).await?;
        self.require_owner_funds(&owner, amount).await?;

        self.execute(owner, VaultInstruction::Deposit(amount), &request.signing).await
    }

    /// Withdraw lamports from the vault back to the owner.
    ///
    /// The rent reserve is never withdrawable; only `close` returns it.
    pub async fn withdraw(&self, request: AmountRequest) -> Result<OperationResponse, VaultError> {
        info!("Processing withdrawal for {}", request.owner_pubkey);

        let owner = parse_pubkey(&request.owner_pubkey)?;
        let amount = parse_amount(&request)?;
        let addresses = self.require_vault(&owner).await?.0;

        let vault_balance = self.solana.get_lamports(&addresses.vault).await?;
        let reserve = self.solana.rent_exempt_minimum(0).await?;
        let withdrawable = vault_balance.saturating_sub(reserve);

        if withdrawable < amount {
            return Err(VaultError::InsufficientVaultFunds(format!(
                "available {}, requested {}",
                withdrawable, amount
            )));
        }

        self.execute(owner, VaultInstruction::Withdraw(amount), &request.signing).await
    }

    /// Close the vault, returning every lamport (reserve and state rent
    /// included) to the owner.
    pub async fn close_vault(&self, request: CloseVaultRequest) -> Result<OperationResponse, VaultError> {
        info!("Closing vault for owner: {}", request.owner_pubkey);

        let owner = parse_pubkey(&request.owner_pubkey)?;
        self.require_vault(&owner).await?;

        self.execute(owner, VaultInstruction::Close, &request.signing).await
    }

    /// Relay a transaction the owner signed in their wallet.
    pub async fn submit_signed(&self, request: SubmitTransactionRequest) -> Result<OperationResponse, VaultError> {
        let signature = self
            .tx_submitter
            .submit_signed_transaction(&request.signed_transaction)
            .await?;

        Ok(OperationResponse {
            operation: "submit".to_string(),
            status: "submitted".to_string(),
            owner: None,
            amount: None,
            unsigned_transaction: None,
            signature: Some(signature.to_string()),
            message: "Transaction confirmed".to_string(),
            timestamp: Utc::now(),
        })
    }

    // ==========================================
    // HELPERS
    // ==========================================

    /// The owner's vault, or `NotInitialized`.
    async fn require_vault(&self, owner: &Pubkey) -> Result<(VaultAddresses, VaultStateData), VaultError> {
        let addresses = VaultAddresses::derive(owner, self.solana.program_id());

        let state = self
            .solana
            .get_vault_state(&addresses.vault_state)
            .await?
            .ok_or_else(|| VaultError::NotInitialized(owner.to_string()))?;

        if state.owner != *owner {
            return Err(VaultError::Unauthorized(format!(
                "vault state {} belongs to {}",
                addresses.vault_state, state.owner
            )));
        }

        Ok((addresses, state))
    }

    /// The owner must cover `spend` plus the fee and end up either empty or
    /// still rent-exempt; the runtime rejects anything in between.
    async fn require_owner_funds(&self, owner: &Pubkey, spend: u64) -> Result<(), VaultError> {
        let available = self.solana.get_lamports(owner).await?;
        let floor = self.solana.rent_exempt_minimum(0).await?;

        let remaining = available
            .checked_sub(spend)
            .and_then(|left| left.checked_sub(SIGNATURE_FEE_LAMPORTS));

        match remaining {
            Some(left) if left == 0 || left >= floor => Ok(()),
            Some(left) => Err(VaultError::InsufficientExternalFunds(format!(
                "{} lamports would remain, below the rent-exempt minimum {}",
                left, floor
            ))),
            None => Err(VaultError::InsufficientExternalFunds(format!(
                "available {}, requested {} plus {} fee",
                available, spend, SIGNATURE_FEE_LAMPORTS
            ))),
        }
    }

    /// Keypair to sign with, if the request asked for backend signing.
    fn resolve_keypair(&self, signing: &SigningOptions) -> Result<Option<Keypair>, VaultError> {
        let path = match (&signing.keypair_path, signing.auto_sign) {
            (Some(path), _) => path.as_str(),
            (None, true) => self.config.keypair_path.as_str(),
            (None, false) => return Ok(None),
        };

        Ok(Some(load_keypair(path)?))
    }

    /// Build the transaction, then submit it or return it unsigned.
    async fn execute(
        &self,
        owner: Pubkey,
        operation: VaultInstruction,
        signing: &SigningOptions,
    ) -> Result<OperationResponse, VaultError> {
        let keypair = self.resolve_keypair(signing)?;

        if let Some(keypair) = &keypair {
            if keypair.pubkey() != owner {
                warn!("Keypair {} does not match vault owner {}", keypair.pubkey(), owner);
                return Err(VaultError::Unauthorized(format!(
                    "keypair {} is not the vault owner",
                    keypair.pubkey()
                )));
            }
        }

        let transaction = self.tx_builder.build(&owner, operation).await?;
        let amount = match operation {
            VaultInstruction::Deposit(amount) | VaultInstruction::Withdraw(amount) => Some(amount),
            _ => None,
        };

        match keypair {
            Some(keypair) => {
                let signature = self.tx_submitter.sign_and_submit(transaction, &keypair).await?;
                info!(
                    "✅ {} confirmed for {}: {}",
                    operation.name(),
                    owner,
                    truncate_string(&signature.to_string(), 24)
                );

                Ok(OperationResponse {
                    operation: operation.name().to_string(),
                    status: "submitted".to_string(),
                    owner: Some(owner.to_string()),
                    amount,
                    unsigned_transaction: None,
                    signature: Some(signature.to_string()),
                    message: format!("{} confirmed", operation.name()),
                    timestamp: Utc::now(),
                })
            }
            None => {
                let unsigned = TransactionBuilder::encode(&transaction)?;
                debug!("Returning unsigned {} transaction for {}", operation.name(), owner);

                Ok(OperationResponse {
                    operation: operation.name().to_string(),
                    status: "pending".to_string(),
                    owner: Some(owner.to_string()),
                    amount,
                    unsigned_transaction: Some(unsigned),
                    signature: None,
                    message: "Please sign and submit the transaction".to_string(),
                    timestamp: Utc::now(),
                })
            }
        }
    }
}

fn parse_amount(request: &AmountRequest) -> Result<u64, VaultError> {
    let amount = request.lamports().map_err(VaultError::InvalidInput)?;
    if amount == 0 {
        return Err(VaultError::InvalidAmount);
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use solana_sdk::native_token::LAMPORTS_PER_SOL;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::solana::mock::{rent, MockLedger, FEE_LAMPORTS};

    const STARTING_LAMPORTS: u64 = 10_000_000_000;

    struct Owner {
        keypair: Keypair,
        file: NamedTempFile,
    }

    impl Owner {
        fn pubkey(&self) -> String {
            self.keypair.pubkey().to_string()
        }

        fn signing(&self) -> SigningOptions {
            SigningOptions {
                keypair_path: Some(self.file.path().to_string_lossy().into_owned()),
                auto_sign: false,
            }
        }

        fn initialize(&self) -> InitializeVaultRequest {
            InitializeVaultRequest {
                owner_pubkey: self.pubkey(),
                signing: self.signing(),
            }
        }

        fn amount(&self, lamports: u64) -> AmountRequest {
            AmountRequest {
                owner_pubkey: self.pubkey(),
                amount: Some(lamports),
                amount_sol: None,
                signing: self.signing(),
            }
        }

        fn close(&self) -> CloseVaultRequest {
            CloseVaultRequest {
                owner_pubkey: self.pubkey(),
                signing: self.signing(),
            }
        }
    }

    fn setup() -> (Arc<MockLedger>, VaultManager) {
        let config = AppConfig {
            rpc_max_retries: 0,
            ..AppConfig::default()
        };
        let ledger = Arc::new(MockLedger::new(config.vault_program_id));
        let solana = SolanaClient::with_ledger(ledger.clone(), &config);
        (ledger, VaultManager::new(solana, config))
    }

    fn funded_owner(ledger: &MockLedger, lamports: u64) -> Owner {
        let keypair = Keypair::new();
        ledger.airdrop(&keypair.pubkey(), lamports);

        let mut file = NamedTempFile::new().unwrap();
        let bytes = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();
        file.write_all(bytes.as_bytes()).unwrap();

        Owner { keypair, file }
    }

    async fn vault_balance(manager: &VaultManager, owner: &Owner) -> u64 {
        manager.get_vault_balance(&owner.pubkey()).await.unwrap().vault_balance
    }

    #[tokio::test]
    async fn test_initialize_once() {
        let (ledger, manager) = setup();
        let owner = funded_owner(&ledger, STARTING_LAMPORTS);

        let response = manager.initialize_vault(owner.initialize()).await.unwrap();
        assert_eq!(response.status, "submitted");
        assert!(response.signature.is_some());

        let balance = manager.get_vault_balance(&owner.pubkey()).await.unwrap();
        assert!(balance.initialized);
        assert_eq!(balance.vault_balance, rent(0));
        assert_eq!(balance.withdrawable, 0);
        assert_eq!(balance.state_balance, rent(VAULT_STATE_LEN));

        let second = manager.initialize_vault(owner.initialize()).await;
        assert!(matches!(second, Err(VaultError::AlreadyInitialized(_))));
        assert_eq!(ledger.submitted_count(), 1);
    }

    #[tokio::test]
    async fn test_deposit_raises_balance_by_amount() {
        let (ledger, manager) = setup();
        let owner = funded_owner(&ledger, STARTING_LAMPORTS);
        manager.initialize_vault(owner.initialize()).await.unwrap();

        let before = vault_balance(&manager, &owner).await;
        let response = manager.deposit(owner.amount(123_456)).await.unwrap();

        assert_eq!(response.amount, Some(123_456));
        assert_eq!(vault_balance(&manager, &owner).await, before + 123_456);

        let balance = manager.get_vault_balance(&owner.pubkey()).await.unwrap();
        assert_eq!(balance.total_deposited, 123_456);
        assert_eq!(balance.withdrawable, 123_456);
    }

    #[tokio::test]
    async fn test_withdraw_beyond_withdrawable_fails() {
        let (ledger, manager) = setup();
        let owner = funded_owner(&ledger, STARTING_LAMPORTS);
        manager.initialize_vault(owner.initialize()).await.unwrap();
        manager.deposit(owner.amount(1_000)).await.unwrap();

        let before = vault_balance(&manager, &owner).await;
        let result = manager.withdraw(owner.amount(1_001)).await;

        assert!(matches!(result, Err(VaultError::InsufficientVaultFunds(_))));
        assert_eq!(vault_balance(&manager, &owner).await, before);

        manager.withdraw(owner.amount(400)).await.unwrap();
        assert_eq!(vault_balance(&manager, &owner).await, before - 400);
    }

    #[tokio::test]
    async fn test_deposit_then_withdraw_restores_balance() {
        let (ledger, manager) = setup();
        let owner = funded_owner(&ledger, STARTING_LAMPORTS);
        manager.initialize_vault(owner.initialize()).await.unwrap();

        let before = vault_balance(&manager, &owner).await;
        manager.deposit(owner.amount(LAMPORTS_PER_SOL)).await.unwrap();
        manager.withdraw(owner.amount(LAMPORTS_PER_SOL)).await.unwrap();

        assert_eq!(vault_balance(&manager, &owner).await, before);
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let (ledger, manager) = setup();
        let owner = funded_owner(&ledger, STARTING_LAMPORTS);

        manager.initialize_vault(owner.initialize()).await.unwrap();
        let initial = vault_balance(&manager, &owner).await;

        manager.deposit(owner.amount(1_000_000_000)).await.unwrap();
        assert_eq!(vault_balance(&manager, &owner).await, initial + 1_000_000_000);

        manager.withdraw(owner.amount(1_000_000_000)).await.unwrap();
        assert_eq!(vault_balance(&manager, &owner).await, initial);

        manager.close_vault(owner.close()).await.unwrap();

        let balance = manager.get_vault_balance(&owner.pubkey()).await.unwrap();
        assert!(!balance.initialized);
        assert_eq!(balance.vault_balance, 0);
        assert_eq!(balance.state_balance, 0);
        assert_eq!(ledger.lamports(&owner.keypair.pubkey()), STARTING_LAMPORTS - 4 * FEE_LAMPORTS);

        // Closed vaults can be opened again.
        manager.initialize_vault(owner.initialize()).await.unwrap();
    }

    #[tokio::test]
    async fn test_operations_require_a_vault() {
        let (ledger, manager) = setup();
        let owner = funded_owner(&ledger, STARTING_LAMPORTS);

        assert!(matches!(
            manager.deposit(owner.amount(1)).await,
            Err(VaultError::NotInitialized(_))
        ));
        assert!(matches!(
            manager.withdraw(owner.amount(1)).await,
            Err(VaultError::NotInitialized(_))
        ));
        assert!(matches!(
            manager.close_vault(owner.close()).await,
            Err(VaultError::NotInitialized(_))
        ));
    }

    #[tokio::test]
    async fn test_input_validation() {
        let (ledger, manager) = setup();
        let owner = funded_owner(&ledger, STARTING_LAMPORTS);
        manager.initialize_vault(owner.initialize()).await.unwrap();

        assert!(matches!(
            manager.deposit(owner.amount(0)).await,
            Err(VaultError::InvalidAmount)
        ));

        let mut bad_key = owner.amount(1);
        bad_key.owner_pubkey = "not-a-pubkey".to_string();
        assert!(matches!(manager.deposit(bad_key).await, Err(VaultError::InvalidInput(_))));

        let mut missing_file = owner.amount(1);
        missing_file.signing.keypair_path = Some("/nonexistent/id.json".to_string());
        assert!(matches!(
            manager.deposit(missing_file).await,
            Err(VaultError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_deposit_beyond_wallet_fails() {
        let (ledger, manager) = setup();
        let owner = funded_owner(&ledger, STARTING_LAMPORTS);
        manager.initialize_vault(owner.initialize()).await.unwrap();

        let result = manager.deposit(owner.amount(STARTING_LAMPORTS)).await;
        assert!(matches!(result, Err(VaultError::InsufficientExternalFunds(_))));
    }

    #[tokio::test]
    async fn test_initialize_needs_rent() {
        let (ledger, manager) = setup();
        let owner = funded_owner(&ledger, 1_000);

        let result = manager.initialize_vault(owner.initialize()).await;
        assert!(matches!(result, Err(VaultError::InsufficientExternalFunds(_))));
    }

    #[tokio::test]
    async fn test_initialize_funding_boundary() {
        let required = rent(VAULT_STATE_LEN) + rent(0);
        let (ledger, manager) = setup();

        // Rent alone leaves nothing for the fee.
        let short = funded_owner(&ledger, required);
        let result = manager.initialize_vault(short.initialize()).await;
        assert!(matches!(result, Err(VaultError::InsufficientExternalFunds(_))));

        // One lamport left over would be below the rent floor.
        let dusty = funded_owner(&ledger, required + FEE_LAMPORTS + 1);
        let result = manager.initialize_vault(dusty.initialize()).await;
        assert!(matches!(result, Err(VaultError::InsufficientExternalFunds(_))));
        assert_eq!(ledger.submitted_count(), 0);

        // Rent plus fee drains the wallet exactly.
        let exact = funded_owner(&ledger, required + FEE_LAMPORTS);
        manager.initialize_vault(exact.initialize()).await.unwrap();
        assert_eq!(ledger.lamports(&exact.keypair.pubkey()), 0);
        assert!(manager.get_vault_balance(&exact.pubkey()).await.unwrap().initialized);
    }

    #[tokio::test]
    async fn test_deposit_must_not_leave_wallet_below_rent() {
        let (ledger, manager) = setup();
        let owner = funded_owner(&ledger, STARTING_LAMPORTS);
        manager.initialize_vault(owner.initialize()).await.unwrap();

        let wallet = ledger.lamports(&owner.keypair.pubkey());
        let vault_before = vault_balance(&manager, &owner).await;

        let result = manager.deposit(owner.amount(wallet - FEE_LAMPORTS - 1)).await;
        assert!(matches!(result, Err(VaultError::InsufficientExternalFunds(_))));
        assert_eq!(ledger.submitted_count(), 1);

        let result = manager.deposit(owner.amount(wallet)).await;
        assert!(matches!(result, Err(VaultError::InsufficientExternalFunds(_))));

        // Leaving exactly the rent floor is fine.
        let amount = wallet - FEE_LAMPORTS - rent(0);
        manager.deposit(owner.amount(amount)).await.unwrap();
        assert_eq!(ledger.lamports(&owner.keypair.pubkey()), rent(0));
        assert_eq!(vault_balance(&manager, &owner).await, vault_before + amount);
    }

    #[tokio::test]
    async fn test_rent_rejection_on_chain_is_external_funds() {
        let (ledger, manager) = setup();
        let owner = funded_owner(&ledger, STARTING_LAMPORTS);
        manager.initialize_vault(owner.initialize()).await.unwrap();

        // Relayed transactions skip the preflight; the ledger catches it.
        let wallet = ledger.lamports(&owner.keypair.pubkey());
        let mut transaction = manager
            .tx_builder
            .build(&owner.keypair.pubkey(), VaultInstruction::Deposit(wallet - FEE_LAMPORTS - 1))
            .await
            .unwrap();
        let blockhash = transaction.message.recent_blockhash;
        transaction.try_sign(&[&owner.keypair], blockhash).unwrap();

        let result = manager
            .submit_signed(SubmitTransactionRequest {
                signed_transaction: TransactionBuilder::encode(&transaction).unwrap(),
            })
            .await;

        assert!(matches!(result, Err(VaultError::InsufficientExternalFunds(_))));
        assert_eq!(ledger.lamports(&owner.keypair.pubkey()), wallet);
    }

    #[tokio::test]
    async fn test_foreign_keypair_is_unauthorized() {
        let (ledger, manager) = setup();
        let owner = funded_owner(&ledger, STARTING_LAMPORTS);
        let intruder = funded_owner(&ledger, STARTING_LAMPORTS);
        manager.initialize_vault(owner.initialize()).await.unwrap();
        manager.deposit(owner.amount(5_000)).await.unwrap();

        let mut request = owner.amount(5_000);
        request.signing = intruder.signing();

        assert!(matches!(
            manager.withdraw(request).await,
            Err(VaultError::Unauthorized(_))
        ));
        assert_eq!(manager.get_vault_balance(&owner.pubkey()).await.unwrap().withdrawable, 5_000);
    }

    #[tokio::test]
    async fn test_unsigned_transaction_round_trip() {
        let (ledger, manager) = setup();
        let owner = funded_owner(&ledger, STARTING_LAMPORTS);

        let request = InitializeVaultRequest {
            owner_pubkey: owner.pubkey(),
            signing: SigningOptions::default(),
        };
        let response = manager.initialize_vault(request).await.unwrap();

        assert_eq!(response.status, "pending");
        assert!(response.signature.is_none());
        assert_eq!(ledger.submitted_count(), 0);

        let mut transaction =
            TransactionBuilder::decode(response.unsigned_transaction.as_deref().unwrap()).unwrap();
        let blockhash = transaction.message.recent_blockhash;
        transaction.try_sign(&[&owner.keypair], blockhash).unwrap();

        let submitted = manager
            .submit_signed(SubmitTransactionRequest {
                signed_transaction: TransactionBuilder::encode(&transaction).unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(submitted.status, "submitted");
        assert!(manager.get_vault_balance(&owner.pubkey()).await.unwrap().initialized);
    }

    #[tokio::test]
    async fn test_on_chain_rejection_is_mapped() {
        let (ledger, manager) = setup();
        let owner = funded_owner(&ledger, STARTING_LAMPORTS);
        manager.initialize_vault(owner.initialize()).await.unwrap();

        // Built before the vault is emptied, so the preflight cannot catch it.
        manager.deposit(owner.amount(500)).await.unwrap();
        let pending = manager
            .withdraw(AmountRequest {
                signing: SigningOptions::default(),
                ..owner.amount(500)
            })
            .await
            .unwrap();
        manager.withdraw(owner.amount(500)).await.unwrap();

        let mut transaction =
            TransactionBuilder::decode(pending.unsigned_transaction.as_deref().unwrap()).unwrap();
        let blockhash = transaction.message.recent_blockhash;
        transaction.try_sign(&[&owner.keypair], blockhash).unwrap();

        let result = manager
            .submit_signed(SubmitTransactionRequest {
                signed_transaction: TransactionBuilder::encode(&transaction).unwrap(),
            })
            .await;
        assert!(matches!(result, Err(VaultError::InsufficientVaultFunds(_))));
    }

    #[tokio::test]
    async fn test_unreachable_ledger() {
        let (ledger, manager) = setup();
        ledger.fail_next_reads.store(1, Ordering::SeqCst);

        let result = manager.get_vault_balance(&Pubkey::new_unique().to_string()).await;
        assert!(matches!(result, Err(VaultError::LedgerUnavailable(_))));
    }

    #[test]
    fn test_program_error_codes() {
        let custom = |code| TransactionError::InstructionError(0, InstructionError::Custom(code));

        assert!(matches!(
            VaultError::from_transaction_error(custom(0)),
            VaultError::AlreadyInitialized(_)
        ));
        assert!(matches!(
            VaultError::from_transaction_error(custom(3012)),
            VaultError::NotInitialized(_)
        ));
        assert!(matches!(VaultError::from_transaction_error(custom(6000)), VaultError::InvalidAmount));
        assert!(matches!(
            VaultError::from_transaction_error(custom(6001)),
            VaultError::InsufficientVaultFunds(_)
        ));
        assert!(matches!(
            VaultError::from_transaction_error(custom(6002)),
            VaultError::InsufficientExternalFunds(_)
        ));
        assert!(matches!(
            VaultError::from_transaction_error(custom(6003)),
            VaultError::Unauthorized(_)
        ));
        assert!(matches!(
            VaultError::from_transaction_error(custom(6004)),
            VaultError::TransactionError(_)
        ));
        assert!(matches!(
            VaultError::from_transaction_error(TransactionError::InsufficientFundsForRent { account_index: 0 }),
            VaultError::InsufficientExternalFunds(_)
        ));
        assert_eq!(
            VaultError::from_transaction_error(TransactionError::InsufficientFundsForRent { account_index: 0 }).code(),
            "INSUFFICIENT_EXTERNAL_FUNDS"
        );
        assert_eq!(VaultError::InvalidAmount.code(), "INVALID_AMOUNT");
    }
}
