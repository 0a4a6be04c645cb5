//! # Withdraw Instruction
//!
//! Moves lamports from the VaultAccount back to the owner. The VaultAccount
//! is a PDA, so the program signs the System Program transfer with the vault
//! seeds:
//!
//! ```text
//! seeds = ["vault", vault_state, vault_bump]
//! ```
//!
//! The rent reserve funded at `initialize` never leaves the vault here; only
//! `close` drains it.

use anchor_lang::prelude::*;
use anchor_lang::system_program::{transfer, Transfer};

use crate::errors::VaultError;
use crate::events::WithdrawEvent;
use crate::state::VaultState;

/// # withdraw
///
/// ## Returns
///
/// * `Ok(())` - Withdrawal successful
/// * `Err(VaultError::InvalidAmount)` - Amount is zero
/// * `Err(VaultError::InsufficientVaultFunds)` - Not enough above the reserve
/// * `Err(VaultError::Unauthorized)` - Signer is not the recorded owner
pub fn withdraw(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
    require!(amount > 0, VaultError::InvalidAmount);

    let vault_info = ctx.accounts.vault.to_account_info();
    let reserve = Rent::get()?.minimum_balance(vault_info.data_len());
    let available = VaultState::withdrawable(vault_info.lamports(), reserve);

    require!(available >= amount, VaultError::InsufficientVaultFunds);

    let vault_state_key = ctx.accounts.vault_state.key();
    let seeds = &[
        VaultState::VAULT_SEED_PREFIX,
        vault_state_key.as_ref(),
        &[ctx.accounts.vault_state.vault_bump],
    ];
    let signer_seeds = &[&seeds[..]];

    let cpi_context = CpiContext::new_with_signer(
        ctx.accounts.system_program.to_account_info(),
        Transfer {
            from: vault_info,
            to: ctx.accounts.signer.to_account_info(),
        },
        signer_seeds,
    );
    transfer(cpi_context, amount)?;

    ctx.accounts.vault_state.record_withdrawal(amount)?;

    let clock = Clock::get()?;
    let vault_balance = ctx.accounts.vault.lamports();

    emit!(WithdrawEvent {
        owner: ctx.accounts.signer.key(),
        vault: ctx.accounts.vault.key(),
        amount,
        vault_balance,
        timestamp: clock.unix_timestamp,
    });

    msg!("Withdrew {} lamports. Vault balance: {}", amount, vault_balance);

    Ok(())
}

/// # Withdraw Accounts
///
/// Same account set as `Deposit`; the transfer runs in the other direction.
#[derive(Accounts)]
pub struct Withdraw<'info> {
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
