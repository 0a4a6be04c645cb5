//! # Error Handling Module
//!
//! Custom errors returned by the vault program. Anchor numbers them from
//! 6000 (0x1770) in declaration order, and off-chain clients match on those
//! codes, so new variants go at the end.
//!
//! Two conditions are not listed here because Anchor and the System Program
//! detect them before our handlers run:
//!
//! | Condition | Raised by |
//! |-----------|-----------|
//! | Vault already initialized | System Program `create_account` (account in use) |
//! | Vault not initialized | Anchor `AccountNotInitialized` (3012) |

use anchor_lang::prelude::*;

#[error_code]
pub enum VaultError {
    /// Deposits and withdrawals of 0 lamports are rejected.
    #[msg("Amount must be greater than zero")]
    InvalidAmount, // 6000

    /// The vault does not hold `amount` lamports above its rent reserve.
    #[msg("Vault does not hold enough lamports for this withdrawal")]
    InsufficientVaultFunds, // 6001

    /// The owner's wallet cannot cover the deposit.
    #[msg("Owner does not have enough lamports for this deposit")]
    InsufficientExternalFunds, // 6002

    /// The signer is not the owner recorded in the vault state.
    #[msg("Signer is not the owner of this vault")]
    Unauthorized, // 6003

    /// Lifetime counters overflowed u64.
    #[msg("Arithmetic overflow")]
    Overflow, // 6004
}
