//! # API Response Models
//!
//! Structures for outgoing API response bodies.
//! All responses are wrapped in a standard format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper.
///
/// ## Success Response
///
/// ```json
/// {
///     "success": true,
///     "data": { ... },
///     "error": null
/// }
/// ```
///
/// ## Error Response
///
/// ```json
/// {
///     "success": false,
///     "data": null,
///     "error": {
///         "code": "INSUFFICIENT_VAULT_FUNDS",
///         "message": "Insufficient vault funds: available 0, requested 5"
///     }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the request was successful.
    pub success: bool,

    /// Response data (null on error).
    pub data: Option<T>,

    /// Error information (null on success).
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

/// API error information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Error code (e.g., "NOT_INITIALIZED").
    pub code: String,

    /// Human-readable error message.
    pub message: String,
}

/// Vault balance response.
///
/// Returned by `GET /vault/balance/{owner}`. A vault that does not exist
/// reads as `initialized: false` with zero balances.
///
/// ## Example Response
///
/// ```json
/// {
///     "success": true,
///     "data": {
///         "owner": "7xKt9Fj2abc123...",
///         "initialized": true,
///         "vaultStateAddress": "3Fgh2Lkabc456...",
///         "vaultAddress": "9Yht3Mkxyz789...",
///         "vaultBalance": 1000890880,
///         "reserve": 890880,
///         "withdrawable": 1000000000,
///         "stateBalance": 1350240,
///         "totalDeposited": 1500000000,
///         "totalWithdrawn": 500000000,
///         "formattedBalance": "1.00089088 SOL",
///         "formattedWithdrawable": "1.00 SOL",
///         "createdAt": "2024-01-15T12:00:00Z"
///     }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultBalanceResponse {
    /// Vault owner's public key.
    pub owner: String,

    /// Whether the VaultState account exists.
    pub initialized: bool,

    /// VaultState PDA address.
    pub vault_state_address: String,

    /// VaultAccount PDA address.
    pub vault_address: String,

    /// Lamports held by the VaultAccount, reserve included.
    pub vault_balance: u64,

    /// Rent-exempt minimum kept in the VaultAccount while the vault is open.
    pub reserve: u64,

    /// `vault_balance - reserve`.
    pub withdrawable: u64,

    /// Lamports held by the VaultState account.
    pub state_balance: u64,

    /// Lifetime total deposits.
    pub total_deposited: u64,

    /// Lifetime total withdrawals.
    pub total_withdrawn: u64,

    /// Human-readable vault balance (e.g., "1.50 SOL").
    pub formatted_balance: String,

    /// Human-readable withdrawable amount.
    pub formatted_withdrawable: String,

    /// When the vault was created.
    pub created_at: Option<DateTime<Utc>>,
}

/// Derived vault addresses.
///
/// Returned by `GET /vault/addresses/{owner}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultAddressesResponse {
    pub owner: String,
    pub program_id: String,
    pub vault_state_address: String,
    pub state_bump: u8,
    pub vault_address: String,
    pub vault_bump: u8,
}

/// Vault operation response.
///
/// Returned by initialize, deposit, withdraw, close and submit.
///
/// ## Example Response (unsigned)
///
/// ```json
/// {
///     "success": true,
///     "data": {
///         "operation": "deposit",
///         "status": "pending",
///         "owner": "7xKt9Fj2abc123...",
///         "amount": 1000000000,
///         "unsignedTransaction": "base64encodedtx...",
///         "signature": null,
///         "message": "Please sign and submit the transaction",
///         "timestamp": "2024-01-15T12:00:00Z"
///     }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    /// Instruction name: initialize, deposit, withdraw, close, or submit.
    pub operation: String,

    /// "pending" (awaiting the owner's signature) or "submitted" (confirmed).
    pub status: String,

    /// Owner public key, when known.
    pub owner: Option<String>,

    /// Lamports moved, for deposit and withdraw.
    pub amount: Option<u64>,

    /// Base64-encoded unsigned transaction (if applicable).
    pub unsigned_transaction: Option<String>,

    /// Solana transaction signature (if already submitted).
    pub signature: Option<String>,

    /// Human-readable status message.
    pub message: String,

    pub timestamp: DateTime<Utc>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status: "healthy" or "unhealthy".
    pub status: String,

    /// Solana RPC connection status.
    pub solana_rpc: bool,

    /// Vault program the backend talks to.
    pub program_id: String,

    /// Service version.
    pub version: String,

    /// Current timestamp.
    pub timestamp: DateTime<Utc>,
}
