//! # Events Module
//!
//! Events emitted by the vault program. They land in the transaction logs
//! and let indexers follow vault activity without polling balances.
//!
//! ```text
//! initialize ──> VaultInitializedEvent
//! deposit    ──> DepositEvent
//! withdraw   ──> WithdrawEvent
//! close      ──> VaultClosedEvent
//! ```

use anchor_lang::prelude::*;

/// Emitted once when an owner creates their vault.
#[event]
pub struct VaultInitializedEvent {
    /// The wallet that owns the vault
    pub owner: Pubkey,
    /// The VaultState PDA
    pub vault_state: Pubkey,
    /// The VaultAccount PDA holding the lamports
    pub vault: Pubkey,
    /// Lamports moved into the vault to keep it rent exempt
    pub reserve: u64,
    /// Unix timestamp of initialization
    pub timestamp: i64,
}

/// # DepositEvent
///
/// ## Example Log:
/// ```text
/// DepositEvent {
///     owner: "7xKt9Fj2...",
///     vault: "9Yht3Mk7...",
///     amount: 1_000_000_000,      // 1 SOL
///     vault_balance: 1_000_890_880,
///     timestamp: 1699123456
/// }
/// ```
#[event]
pub struct DepositEvent {
    pub owner: Pubkey,
    pub vault: Pubkey,
    /// Lamports deposited
    pub amount: u64,
    /// Vault lamports after the deposit (reserve included)
    pub vault_balance: u64,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawEvent {
    pub owner: Pubkey,
    pub vault: Pubkey,
    /// Lamports withdrawn
    pub amount: u64,
    /// Vault lamports after the withdrawal (reserve included)
    pub vault_balance: u64,
    pub timestamp: i64,
}

/// Emitted when the owner closes the vault. `returned` covers the vault
/// lamports only; the state account rent is refunded by Anchor's `close`.
#[event]
pub struct VaultClosedEvent {
    pub owner: Pubkey,
    pub vault: Pubkey,
    pub returned: u64,
    pub timestamp: i64,
}
