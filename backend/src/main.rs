//! # SOL Vault Backend Service
//!
//! Entry point of the backend that drives the vault program. It provides:
//!
//! - REST API for owners (initialize, deposit, withdraw, close, balances)
//! - Unsigned transactions for wallet signing, or keypair-signed submission
//! - Relay of transactions signed elsewhere
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        BACKEND SERVICE                           │
//! │                                                                  │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │  REST API (Actix)                                          │  │
//! │  │  /vault/initialize  /vault/deposit  /vault/withdraw        │  │
//! │  │  /vault/close  /vault/submit  /vault/balance  /health      │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                          │                                       │
//! │  ┌───────────────────────┴───────────────────────────────────┐  │
//! │  │                    SERVICE LAYER                           │  │
//! │  │  ┌──────────────┐ ┌──────────────┐ ┌──────────────────┐   │  │
//! │  │  │VaultManager  │ │TxBuilder     │ │TxSubmitter       │   │  │
//! │  │  └──────────────┘ └──────────────┘ └──────────────────┘   │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                          │                                       │
//! │                   ┌──────┴──────┐                                │
//! │                   │   Solana    │                                │
//! │                   │   RPC       │                                │
//! │                   └─────────────┘                                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! 1. Start a local validator and deploy the `vault` program
//! 2. Copy `.env.example` to `.env` and configure
//! 3. Start the server: `cargo run`
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod api;
mod config;
mod models;
mod services;
mod solana;
mod utils;

use config::AppConfig;
use services::VaultManager;
use solana::SolanaClient;

/// Application state shared across all handlers.
pub struct AppState {
    /// Solana client for ledger reads and health checks
    pub solana: SolanaClient,

    /// Vault management service
    pub vault_manager: VaultManager,

    /// Application configuration
    pub config: AppConfig,
}

/// Log filter from `RUST_LOG`, `info` when unset.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Main entry point for the backend service.
///
/// This function:
/// 1. Sets up logging
/// 2. Loads configuration from environment
/// 3. Sets up the Solana client and services
/// 4. Launches the HTTP server
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // =========================================
    // STEP 1: Initialize Logging
    // =========================================
    // .env may set RUST_LOG, so it is loaded before the filter is built.
    dotenvy::dotenv().ok(); // It's okay if .env doesn't exist

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("🚀 Starting SOL Vault Backend Service");

    // =========================================
    // STEP 2: Load Configuration
    // =========================================
    let config = AppConfig::from_env()
        .expect("Failed to load configuration");

    info!("📋 Configuration loaded");
    info!("   Solana RPC: {}", config.solana_rpc_url);
    info!("   Program ID: {}", config.vault_program_id);

    // =========================================
    // STEP 3: Initialize Solana Client
    // =========================================
    let solana = SolanaClient::new(&config);

    if !solana.get_health().await {
        tracing::warn!("⚠️  Solana RPC not reachable yet; requests will fail until it is");
    }

    // =========================================
    // STEP 4: Initialize Services
    // =========================================
    let vault_manager = VaultManager::new(solana.clone(), config.clone());

    info!("🔧 Services initialized");

    let app_state = Arc::new(AppState {
        solana,
        vault_manager,
        config: config.clone(),
    });

    // =========================================
    // STEP 5: Start HTTP Server
    // =========================================
    let server_host = config.server_host.clone();
    let server_port = config.server_port;

    info!("🌐 Starting HTTP server on {}:{}", server_host, server_port);

    HttpServer::new(move || {
        App::new()
            // Attach shared application state
            .app_data(web::Data::new(app_state.clone()))

            // Browser wallets call the API cross-origin
            .wrap(Cors::permissive())

            // Add logging middleware
            .wrap(middleware::Logger::default())

            // Configure API routes
            .configure(api::configure_routes)
    })
    .bind(format!("{}:{}", server_host, server_port))?
    .run()
    .await
}
