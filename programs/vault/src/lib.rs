// Suppress warnings from Anchor/Solana version mismatches
#![allow(unexpected_cfgs)]
#![allow(ambiguous_glob_reexports)]

//! # SOL Vault
//!
//! A Solana program (Anchor) that keeps SOL in custody for a single owner.
//!
//! Every owner gets exactly one pair of PDAs:
//!
//! ```text
//! owner ──seeds["state", owner]──────────> VaultState   (program-owned, metadata)
//!                                               │
//!         seeds["vault", vault_state] <─────────┘
//!                     │
//!                     ▼
//!                VaultAccount   (system-owned, holds the lamports)
//! ```
//!
//! ## Instructions Summary
//!
//! | Instruction | Who Can Call | Description |
//! |-------------|--------------|-------------|
//! | `initialize` | Any wallet (once) | Create the state/vault pair |
//! | `deposit` | Vault owner | Move lamports from owner into the vault |
//! | `withdraw` | Vault owner | Move lamports from the vault back to owner |
//! | `close` | Vault owner | Drain the vault and reclaim the state account |
//!
//! ## Example Usage
//!
//! ```typescript
//! await program.methods.initialize().rpc();
//! await program.methods.deposit(new BN(LAMPORTS_PER_SOL)).rpc();
//! await program.methods.withdraw(new BN(LAMPORTS_PER_SOL)).rpc();
//! await program.methods.close().rpc();
//! ```

use anchor_lang::prelude::*;

pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

pub use errors::*;
pub use events::*;
pub use instructions::*;
pub use state::*;

declare_id!("J6GPi9FPnuN5VpxraCF9yHMYfRLw4Ap3UqGK9wT3qUvw");

#[program]
pub mod vault {
    use super::*;

    /// Create the VaultState record for the signer and fund the VaultAccount
    /// with its rent-exempt reserve.
    ///
    /// ## Errors:
    /// - Account already in use (the signer already has a vault)
    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        instructions::initialize(ctx)
    }

    /// Deposit `amount` lamports from the signer into their vault.
    ///
    /// ## Errors:
    /// - `InvalidAmount`: amount is 0
    /// - `InsufficientExternalFunds`: signer cannot cover `amount`
    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        instructions::deposit(ctx, amount)
    }

    /// Withdraw `amount` lamports from the vault back to the signer.
    ///
    /// ## Errors:
    /// - `InvalidAmount`: amount is 0
    /// - `InsufficientVaultFunds`: vault holds less than `amount` above its reserve
    pub fn withdraw(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
        instructions::withdraw(ctx, amount)
    }

    /// Return every lamport in the vault to the signer and close the state
    /// account.
    pub fn close(ctx: Context<Close>) -> Result<()> {
        instructions::close(ctx)
    }
}
