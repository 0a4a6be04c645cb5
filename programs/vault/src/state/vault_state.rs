//! # Vault State Account
//!
//! The metadata record for one owner's vault. The lamports themselves live in
//! a separate system-owned PDA (the VaultAccount) so transfers out of it are
//! plain System Program transfers signed with the vault seeds.

use anchor_lang::prelude::*;

use crate::errors::VaultError;

/// # VaultState
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | owner | Pubkey | Wallet that created the vault |
/// | state_bump | u8 | Bump of `["state", owner]` |
/// | vault_bump | u8 | Bump of `["vault", vault_state]` |
/// | created_at | i64 | Unix timestamp of `initialize` |
/// | total_deposited | u64 | Lifetime deposits (lamports) |
/// | total_withdrawn | u64 | Lifetime withdrawals (lamports) |
///
/// Both addresses are re-derivable from the owner key alone; the bumps are
/// stored so later instructions skip the bump search.
#[account]
#[derive(Default)]
pub struct VaultState {
    /// Only this wallet may deposit, withdraw or close.
    pub owner: Pubkey,

    pub state_bump: u8,

    pub vault_bump: u8,

    pub created_at: i64,

    /// Only increases. Used for analytics.
    pub total_deposited: u64,

    /// Only increases. Used for analytics.
    pub total_withdrawn: u64,
}

impl VaultState {
    /// 8 (discriminator) + 32 + 1 + 1 + 8 + 8 + 8 = 66 bytes
    pub const LEN: usize = 8 + 32 + 1 + 1 + 8 + 8 + 8;

    /// Seed prefix of the VaultState PDA: `["state", owner]`.
    pub const SEED_PREFIX: &'static [u8] = b"state";

    /// Seed prefix of the VaultAccount PDA: `["vault", vault_state]`.
    pub const VAULT_SEED_PREFIX: &'static [u8] = b"vault";

    /// Lamports that may leave the vault without dropping it below `reserve`.
    pub fn withdrawable(vault_lamports: u64, reserve: u64) -> u64 {
        vault_lamports.saturating_sub(reserve)
    }

    pub fn record_deposit(&mut self, amount: u64) -> Result<()> {
        self.total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;
        Ok(())
    }

    pub fn record_withdrawal(&mut self, amount: u64) -> Result<()> {
        self.total_withdrawn = self
            .total_withdrawn
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;
        Ok(())
    }
}
