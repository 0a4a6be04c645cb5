//! # Services Module
//!
//! Core business logic of the vault backend.
//!
//! ## Services Overview
//!
//! | Service | Responsibility |
//! |---------|---------------|
//! | `VaultManager` | Preflight checks, vault operations, balance reads |
//! | `TransactionBuilder` | Vault instructions and unsigned transactions |
//! | `TransactionSubmitter` | Keypair loading, signing, submission |
//! | `addresses` | VaultState / VaultAccount PDA derivation |
//!
//! ## Service Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        SERVICES LAYER                            │
//! │                                                                  │
//! │  ┌──────────────────────────────────────────────────────────┐   │
//! │  │                    VaultManager                           │   │
//! │  │  • initialize_vault()  • deposit()  • withdraw()          │   │
//! │  │  • close_vault()       • submit_signed()                  │   │
//! │  └──────────────────────────────────────────────────────────┘   │
//! │                              │                                   │
//! │              ┌───────────────┴───────────────┐                  │
//! │              ▼                               ▼                  │
//! │  ┌──────────────────────┐        ┌──────────────────────┐       │
//! │  │ TransactionBuilder   │        │ TransactionSubmitter │       │
//! │  │                      │        │                      │       │
//! │  │ Build txs            │        │ Sign txs             │       │
//! │  │ Encode base64        │        │ Submit + confirm     │       │
//! │  └──────────────────────┘        └──────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod addresses;
pub mod transaction_builder;
pub mod transaction_submitter;
pub mod vault_manager;

pub use addresses::VaultAddresses;
pub use transaction_builder::TransactionBuilder;
pub use transaction_submitter::TransactionSubmitter;
pub use vault_manager::{VaultError, VaultManager};
