//! # Configuration Module
//!
//! Loads the backend settings from environment variables (optionally from a
//! `.env` file loaded by `dotenvy` in `main`).
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SOLANA_RPC_URL` | Solana RPC endpoint | `http://127.0.0.1:8899` |
//! | `VAULT_PROGRAM_ID` | Deployed vault program | `J6GPi9FPnuN5VpxraCF9yHMYfRLw4Ap3UqGK9wT3qUvw` |
//! | `KEYPAIR_PATH` | Default signer keypair | `~/.config/solana/id.json` |
//! | `SERVER_HOST` | HTTP server host | `127.0.0.1` |
//! | `SERVER_PORT` | HTTP server port | `8080` |
//! | `RPC_TIMEOUT_SECS` | Timeout of a single RPC read | `10` |
//! | `RPC_MAX_RETRIES` | Retries of a failed RPC read | `3` |

use std::env;
use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Program ID of the deployed vault program.
pub const DEFAULT_PROGRAM_ID: &str = "J6GPi9FPnuN5VpxraCF9yHMYfRLw4Ap3UqGK9wT3qUvw";

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment variable has an invalid value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    /// Failed to parse a value
    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // ==========================================
    // SOLANA SETTINGS
    // ==========================================

    /// Solana RPC endpoint URL.
    ///
    /// Common values:
    /// - Local validator: `http://127.0.0.1:8899`
    /// - Devnet: `https://api.devnet.solana.com`
    pub solana_rpc_url: String,

    /// The deployed vault program ID. All PDAs are derived against it.
    pub vault_program_id: Pubkey,

    /// Keypair used when a request asks for auto-signing without naming a
    /// keypair file of its own.
    pub keypair_path: String,

    // ==========================================
    // SERVER SETTINGS
    // ==========================================

    pub server_host: String,

    pub server_port: u16,

    // ==========================================
    // RPC SETTINGS
    // ==========================================

    /// Timeout of a single RPC read attempt, in seconds.
    pub rpc_timeout_secs: u64,

    /// How many times a failed RPC read is retried. Submissions never are.
    pub rpc_max_retries: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let program_id = get_env_or_default("VAULT_PROGRAM_ID", DEFAULT_PROGRAM_ID);

        Ok(Self {
            solana_rpc_url: get_env_or_default("SOLANA_RPC_URL", "http://127.0.0.1:8899"),
            vault_program_id: Pubkey::from_str(&program_id).map_err(|e| {
                ConfigError::InvalidValue("VAULT_PROGRAM_ID".to_string(), e.to_string())
            })?,
            keypair_path: get_env_or_default("KEYPAIR_PATH", "~/.config/solana/id.json"),

            server_host: get_env_or_default("SERVER_HOST", "127.0.0.1"),
            server_port: parse_env("SERVER_PORT", "8080")?,

            rpc_timeout_secs: parse_env("RPC_TIMEOUT_SECS", "10")?,
            rpc_max_retries: parse_env("RPC_MAX_RETRIES", "3")?,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            solana_rpc_url: "http://127.0.0.1:8899".to_string(),
            vault_program_id: Pubkey::from_str(DEFAULT_PROGRAM_ID).unwrap_or_default(),
            keypair_path: "~/.config/solana/id.json".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            rpc_timeout_secs: 10,
            rpc_max_retries: 3,
        }
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse()
        .map_err(|e: T::Err| ConfigError::ParseError(key.to_string(), e.to_string()))
}
