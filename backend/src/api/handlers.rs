//! # API Request Handlers
//!
//! Each handler:
//! 1. Extracts request data
//! 2. Calls the VaultManager
//! 3. Returns a formatted response
//!
//! ## Error Handling
//!
//! Every `VaultError` becomes the JSON error envelope with a matching
//! HTTP status:
//!
//! | Error | Status |
//! |-------|--------|
//! | `INVALID_INPUT`, `INVALID_AMOUNT`, `INSUFFICIENT_*`, `TRANSACTION_FAILED` | 400 |
//! | `UNAUTHORIZED` | 403 |
//! | `NOT_INITIALIZED` | 404 |
//! | `ALREADY_INITIALIZED` | 409 |
//! | `LEDGER_UNAVAILABLE` | 502 |

use std::sync::Arc;

use actix_web::{http::StatusCode, web, HttpResponse};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};

use crate::models::{
    ApiResponse, CloseVaultRequest, DepositRequest, HealthResponse, InitializeVaultRequest,
    SubmitTransactionRequest, VaultAddressesResponse, WithdrawRequest,
};
use crate::services::VaultError;
use crate::AppState;

/// HTTP status of a vault error.
fn status_for(err: &VaultError) -> StatusCode {
    match err {
        VaultError::Unauthorized(_) => StatusCode::FORBIDDEN,
        VaultError::NotInitialized(_) => StatusCode::NOT_FOUND,
        VaultError::AlreadyInitialized(_) => StatusCode::CONFLICT,
        VaultError::LedgerUnavailable(_) => StatusCode::BAD_GATEWAY,
        VaultError::InsufficientVaultFunds(_)
        | VaultError::InsufficientExternalFunds(_)
        | VaultError::InvalidAmount
        | VaultError::InvalidInput(_)
        | VaultError::TransactionError(_) => StatusCode::BAD_REQUEST,
    }
}

fn error_response(operation: &str, err: VaultError) -> HttpResponse {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("{} failed: {}", operation, err);
    } else {
        warn!("{} rejected: {}", operation, err);
    }

    HttpResponse::build(status).json(ApiResponse::<()>::error(err.code(), &err.to_string()))
}

/// API information endpoint (root).
///
/// ## Endpoint
///
/// `GET /`
pub async fn api_info() -> HttpResponse {
    let info = json!({
        "name": "SOL Vault API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Backend API for per-owner SOL vaults",
        "endpoints": {
            "health": {
                "method": "GET",
                "path": "/health",
                "description": "Health check endpoint"
            },
            "vault": {
                "initialize": {
                    "method": "POST",
                    "path": "/vault/initialize",
                    "description": "Create the owner's vault"
                },
                "deposit": {
                    "method": "POST",
                    "path": "/vault/deposit",
                    "description": "Deposit lamports into the vault"
                },
                "withdraw": {
                    "method": "POST",
                    "path": "/vault/withdraw",
                    "description": "Withdraw lamports from the vault"
                },
                "close": {
                    "method": "POST",
                    "path": "/vault/close",
                    "description": "Close the vault and reclaim every lamport"
                },
                "submit": {
                    "method": "POST",
                    "path": "/vault/submit",
                    "description": "Relay a transaction signed by the owner"
                },
                "balance": {
                    "method": "GET",
                    "path": "/vault/balance/{owner}",
                    "description": "Get vault balance for an owner"
                },
                "addresses": {
                    "method": "GET",
                    "path": "/vault/addresses/{owner}",
                    "description": "Get derived vault addresses for an owner"
                }
            }
        }
    });

    HttpResponse::Ok().json(ApiResponse::success(info))
}

/// Health check endpoint.
///
/// ## Endpoint
///
/// `GET /health`
///
/// ## Response
///
/// ```json
/// {
///     "success": true,
///     "data": {
///         "status": "healthy",
///         "solanaRpc": true,
///         "programId": "J6GPi9FPnuN5VpxraCF9yHMYfRLw4Ap3UqGK9wT3qUvw",
///         "version": "0.1.0",
///         "timestamp": "2025-12-08T12:00:00Z"
///     }
/// }
/// ```
pub async fn health_check(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let solana_healthy = state.solana.get_health().await;

    let response = HealthResponse {
        status: if solana_healthy { "healthy" } else { "unhealthy" }.to_string(),
        solana_rpc: solana_healthy,
        program_id: state.config.vault_program_id.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    };

    let status_code = if solana_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    HttpResponse::build(status_code).json(ApiResponse::success(response))
}

/// Initialize a vault.
///
/// ## Endpoint
///
/// `POST /vault/initialize`
///
/// ## Option A: Auto-Submit (Devnet/Testing)
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/vault/initialize \
///   -H "Content-Type: application/json" \
///   -d '{
///     "ownerPubkey": "YOUR_WALLET_ADDRESS",
///     "keypairPath": "~/.config/solana/id.json"
///   }'
/// ```
///
/// ## Option B: Manual Sign & Submit
///
/// Without `keypairPath` the response carries `unsignedTransaction`; sign it
/// in your wallet and send it to `POST /vault/submit`.
pub async fn initialize_vault(
    state: web::Data<Arc<AppState>>,
    body: web::Json<InitializeVaultRequest>,
) -> HttpResponse {
    info!("Initialize vault request for: {}", body.owner_pubkey);

    match state.vault_manager.initialize_vault(body.into_inner()).await {
        Ok(result) => HttpResponse::Ok().json(ApiResponse::success(result)),
        Err(e) => error_response("Initialize vault", e),
    }
}

/// Deposit lamports into the vault.
///
/// ## Endpoint
///
/// `POST /vault/deposit`
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/vault/deposit \
///   -H "Content-Type: application/json" \
///   -d '{
///     "ownerPubkey": "YOUR_WALLET_ADDRESS",
///     "amount": 1000000000,
///     "keypairPath": "~/.config/solana/id.json"
///   }'
/// ```
pub async fn deposit(state: web::Data<Arc<AppState>>, body: web::Json<DepositRequest>) -> HttpResponse {
    info!("Deposit request for {}", body.owner_pubkey);

    match state.vault_manager.deposit(body.into_inner()).await {
        Ok(result) => HttpResponse::Ok().json(ApiResponse::success(result)),
        Err(e) => error_response("Deposit", e),
    }
}

/// Withdraw lamports from the vault.
///
/// ## Endpoint
///
/// `POST /vault/withdraw`
///
/// Only the amount above the rent reserve can be withdrawn; see
/// `withdrawable` in the balance response.
pub async fn withdraw(state: web::Data<Arc<AppState>>, body: web::Json<WithdrawRequest>) -> HttpResponse {
    info!("Withdraw request for {}", body.owner_pubkey);

    match state.vault_manager.withdraw(body.into_inner()).await {
        Ok(result) => HttpResponse::Ok().json(ApiResponse::success(result)),
        Err(e) => error_response("Withdraw", e),
    }
}

/// Close the vault.
///
/// ## Endpoint
///
/// `POST /vault/close`
pub async fn close_vault(state: web::Data<Arc<AppState>>, body: web::Json<CloseVaultRequest>) -> HttpResponse {
    info!("Close vault request for {}", body.owner_pubkey);

    match state.vault_manager.close_vault(body.into_inner()).await {
        Ok(result) => HttpResponse::Ok().json(ApiResponse::success(result)),
        Err(e) => error_response("Close vault", e),
    }
}

/// Relay a transaction the owner signed in their wallet.
///
/// ## Endpoint
///
/// `POST /vault/submit`
pub async fn submit_transaction(
    state: web::Data<Arc<AppState>>,
    body: web::Json<SubmitTransactionRequest>,
) -> HttpResponse {
    info!("Submit signed transaction request");

    match state.vault_manager.submit_signed(body.into_inner()).await {
        Ok(result) => HttpResponse::Ok().json(ApiResponse::success(result)),
        Err(e) => error_response("Submit transaction", e),
    }
}

/// Get vault balance.
///
/// ## Endpoint
///
/// `GET /vault/balance/{owner}`
///
/// ```bash
/// curl http://127.0.0.1:8080/vault/balance/YOUR_WALLET_ADDRESS
/// ```
pub async fn get_balance(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let owner = path.into_inner();
    info!("Balance request for: {}", owner);

    match state.vault_manager.get_vault_balance(&owner).await {
        Ok(balance) => HttpResponse::Ok().json(ApiResponse::success(balance)),
        Err(e) => error_response("Get balance", e),
    }
}

/// Get the derived vault addresses.
///
/// ## Endpoint
///
/// `GET /vault/addresses/{owner}`
pub async fn get_addresses(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let owner = path.into_inner();

    match state.vault_manager.addresses(&owner) {
        Ok(addresses) => HttpResponse::Ok().json(ApiResponse::success(VaultAddressesResponse {
            owner: addresses.owner.to_string(),
            program_id: state.config.vault_program_id.to_string(),
            vault_state_address: addresses.vault_state.to_string(),
            state_bump: addresses.state_bump,
            vault_address: addresses.vault.to_string(),
            vault_bump: addresses.vault_bump,
        })),
        Err(e) => error_response("Get addresses", e),
    }
}
