//! # API Request Models
//!
//! Structures for incoming API request bodies.
//! Each struct represents the expected JSON body for an endpoint.
//!
//! ## Signing Modes
//!
//! Every vault operation accepts the same optional signing fields:
//!
//! | `keypairPath` | `autoSign` | Result |
//! |---------------|------------|--------|
//! | set | any | Backend signs with that file and submits |
//! | unset | `true` | Backend signs with `KEYPAIR_PATH` and submits |
//! | unset | `false` (default) | Unsigned transaction returned to the caller |
//!
//! Keypair files are for devnet and local testing. In production the owner
//! signs in their own wallet and relays through `POST /vault/submit`.

use serde::{Deserialize, Serialize};

use crate::utils::parse_sol;

/// Optional signing instructions shared by all vault operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningOptions {
    /// Path to a keypair file to sign with. Example: "~/.config/solana/id.json"
    pub keypair_path: Option<String>,

    /// Sign with the backend's configured keypair.
    #[serde(default)]
    pub auto_sign: bool,
}

/// Request to initialize a vault.
///
/// ## Example JSON
///
/// ```json
/// {
///     "ownerPubkey": "7xKt9Fj2abc123...",
///     "keypairPath": "~/.config/solana/id.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeVaultRequest {
    /// The owner's wallet public key (base58 encoded).
    pub owner_pubkey: String,

    #[serde(flatten)]
    pub signing: SigningOptions,
}

/// Request to move lamports into or out of a vault.
///
/// Used by both `POST /vault/deposit` and `POST /vault/withdraw`.
///
/// ## Example JSON
///
/// ```json
/// {
///     "ownerPubkey": "7xKt9Fj2abc123...",
///     "amount": 1000000000
/// }
/// ```
///
/// ## Notes
///
/// - `amount` is in lamports (1 SOL = 1,000,000,000 lamports)
/// - `amountSol` may be given instead, e.g. `"1.5"`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountRequest {
    /// Owner's wallet public key.
    pub owner_pubkey: String,

    /// Amount in lamports.
    pub amount: Option<u64>,

    /// Amount as a decimal SOL string.
    pub amount_sol: Option<String>,

    #[serde(flatten)]
    pub signing: SigningOptions,
}

impl AmountRequest {
    /// The requested amount in lamports. Exactly one of `amount` and
    /// `amountSol` must be present.
    pub fn lamports(&self) -> Result<u64, String> {
        match (self.amount, self.amount_sol.as_deref()) {
            (Some(amount), None) => Ok(amount),
            (None, Some(amount_sol)) => parse_sol(amount_sol),
            (Some(_), Some(_)) => Err("Provide either amount or amountSol, not both".to_string()),
            (None, None) => Err("Missing amount".to_string()),
        }
    }
}

pub type DepositRequest = AmountRequest;
pub type WithdrawRequest = AmountRequest;

/// Request to close a vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseVaultRequest {
    pub owner_pubkey: String,

    #[serde(flatten)]
    pub signing: SigningOptions,
}

/// Request to relay a transaction the owner signed in their wallet.
///
/// ## Example JSON
///
/// ```json
/// {
///     "signedTransaction": "AQAAAAAAAA..."
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTransactionRequest {
    /// Base64-encoded, bincode-serialized signed transaction.
    pub signed_transaction: String,
}
