//! # Deposit Instruction
//!
//! Moves lamports from the owner's wallet into their VaultAccount with a
//! System Program transfer. The owner signs the transaction, so no PDA
//! signature is involved.
//!
//! ```text
//! Owner Wallet                         VaultAccount
//! └── lamports: 5 SOL   ──1 SOL──>     └── lamports: reserve + 1 SOL
//! ```

use anchor_lang::prelude::*;
use anchor_lang::system_program::{transfer, Transfer};

use crate::errors::VaultError;
use crate::events::DepositEvent;
use crate::state::VaultState;

/// # deposit
///
/// ## Returns
///
/// * `Ok(())` - Deposit successful
/// * `Err(VaultError::InvalidAmount)` - Amount is zero
/// * `Err(VaultError::InsufficientExternalFunds)` - Owner cannot cover `amount`
/// * `Err(VaultError::Unauthorized)` - Signer is not the recorded owner
pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
    require!(amount > 0, VaultError::InvalidAmount);

    // Fees are charged before the instruction runs, so this is what is left.
    require!(
        ctx.accounts.signer.lamports() >= amount,
        VaultError::InsufficientExternalFunds
    );

    let cpi_context = CpiContext::new(
        ctx.accounts.system_program.to_account_info(),
        Transfer {
            from: ctx.accounts.signer.to_account_info(),
            to: ctx.accounts.vault.to_account_info(),
        },
    );
    transfer(cpi_context, amount)?;

    ctx.accounts.vault_state.record_deposit(amount)?;

    let clock = Clock::get()?;
    let vault_balance = ctx.accounts.vault.lamports();

    emit!(DepositEvent {
        owner: ctx.accounts.signer.key(),
        vault: ctx.accounts.vault.key(),
        amount,
        vault_balance,
        timestamp: clock.unix_timestamp,
    });

    msg!("Deposited {} lamports. Vault balance: {}", amount, vault_balance);

    Ok(())
}

/// # Deposit Accounts
///
/// ```text
/// signer (Signer)
///   │
///   └── seeds ──> vault_state (["state", signer])
///                    │
///                    └── seeds ──> vault (["vault", vault_state])
/// ```
///
/// A missing `vault_state` fails Anchor's deserialization with
/// `AccountNotInitialized`.
#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(mut)]
    pub signer: Signer<'info>,

    #[account(
        mut,
        seeds = [VaultState::SEED_PREFIX, signer.key().as_ref()],
        bump = vault_state.state_bump,
        constraint = vault_state.owner == signer.key() @ VaultError::Unauthorized
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [VaultState::VAULT_SEED_PREFIX, vault_state.key().as_ref()],
        bump = vault_state.vault_bump
    )]
    pub vault: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}
