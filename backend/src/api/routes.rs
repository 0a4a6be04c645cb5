//! # API Route Configuration

use actix_web::{error::InternalError, web, HttpResponse};

use super::handlers;
use crate::models::ApiResponse;

/// Configure all API routes.
///
/// ## Route Structure
///
/// ```text
/// /
/// ├── /health                GET  - Health check
/// └── /vault
///     ├── /initialize        POST - Create vault
///     ├── /deposit           POST - Deposit lamports
///     ├── /withdraw          POST - Withdraw lamports
///     ├── /close             POST - Close vault
///     ├── /submit            POST - Relay signed transaction
///     ├── /balance/{owner}   GET  - Get balance
///     └── /addresses/{owner} GET  - Derived addresses
/// ```
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Malformed bodies get the standard error envelope
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            let message = err.to_string();
            InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(ApiResponse::<()>::error("INVALID_INPUT", &message)),
            )
            .into()
        }))

        // Root endpoint - API information
        .route("/", web::get().to(handlers::api_info))

        // Health check endpoint
        .route("/health", web::get().to(handlers::health_check))

        // Vault endpoints
        .service(
            web::scope("/vault")
                .route("/initialize", web::post().to(handlers::initialize_vault))
                .route("/deposit", web::post().to(handlers::deposit))
                .route("/withdraw", web::post().to(handlers::withdraw))
                .route("/close", web::post().to(handlers::close_vault))

                // Owner-signed transactions
                .route("/submit", web::post().to(handlers::submit_transaction))

                .route("/balance/{owner}", web::get().to(handlers::get_balance))
                .route("/addresses/{owner}", web::get().to(handlers::get_addresses)),
        );
}
