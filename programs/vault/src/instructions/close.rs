//! # Close Instruction
//!
//! Tears the vault down:
//!
//! 1. Every lamport in the VaultAccount (reserve included) goes back to the
//!    owner. With zero lamports the runtime garbage-collects the account.
//! 2. Anchor's `close = signer` constraint zeroes the VaultState data and
//!    refunds its rent to the owner once the handler returns.
//!
//! Afterwards both addresses read 0 lamports and `initialize` may be called
//! again.

use anchor_lang::prelude::*;
use anchor_lang::system_program::{transfer, Transfer};

use crate::errors::VaultError;
use crate::events::VaultClosedEvent;
use crate::state::VaultState;

pub fn close(ctx: Context<Close>) -> Result<()> {
    let vault_info = ctx.accounts.vault.to_account_info();
    let returned = vault_info.lamports();

    if returned > 0 {
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
        transfer(cpi_context, returned)?;
    }

    let clock = Clock::get()?;

    emit!(VaultClosedEvent {
        owner: ctx.accounts.signer.key(),
        vault: ctx.accounts.vault.key(),
        returned,
        timestamp: clock.unix_timestamp,
    });

    msg!("Vault closed. Returned {} lamports to owner", returned);

    Ok(())
}

#[derive(Accounts)]
pub struct Close<'info> {
    /// Receives the vault lamports and the state account rent.
    #[account(mut)]
    pub signer: Signer<'info>,

    #[account(
        mut,
        seeds = [VaultState::SEED_PREFIX, signer.key().as_ref()],
        bump = vault_state.state_bump,
        constraint = vault_state.owner == signer.key() @ VaultError::Unauthorized,
        close = signer
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
