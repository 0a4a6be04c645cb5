//! # Initialize Instruction
//!
//! Creates the VaultState record for the signer and brings the VaultAccount
//! into existence by funding it with the rent-exempt minimum of a zero-byte
//! account.
//!
//! ```text
//! BEFORE:                          AFTER:
//!
//! Owner Wallet                     Owner Wallet
//! └── lamports: X                  └── lamports: X - state rent - reserve - fee
//!
//!                                  VaultState PDA (created)
//!                                  ├── owner: Owner
//!                                  └── state_bump / vault_bump
//!
//!                                  VaultAccount PDA (funded)
//!                                  └── lamports: reserve
//! ```
//!
//! A second call for the same owner fails inside `create_account` because the
//! state address is already in use.

use anchor_lang::prelude::*;
use anchor_lang::system_program::{transfer, Transfer};

use crate::events::VaultInitializedEvent;
use crate::state::VaultState;

pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
    let clock = Clock::get()?;

    // The vault carries no data, so its reserve is the zero-byte minimum.
    let reserve = Rent::get()?.minimum_balance(ctx.accounts.vault.to_account_info().data_len());

    let cpi_context = CpiContext::new(
        ctx.accounts.system_program.to_account_info(),
        Transfer {
            from: ctx.accounts.signer.to_account_info(),
            to: ctx.accounts.vault.to_account_info(),
        },
    );
    transfer(cpi_context, reserve)?;

    let vault_state_key = ctx.accounts.vault_state.key();
    let vault_key = ctx.accounts.vault.key();

    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.owner = ctx.accounts.signer.key();
    vault_state.state_bump = ctx.bumps.vault_state;
    vault_state.vault_bump = ctx.bumps.vault;
    vault_state.created_at = clock.unix_timestamp;
    vault_state.total_deposited = 0;
    vault_state.total_withdrawn = 0;

    emit!(VaultInitializedEvent {
        owner: vault_state.owner,
        vault_state: vault_state_key,
        vault: vault_key,
        reserve,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "Vault initialized for owner: {} (vault: {})",
        vault_state.owner,
        vault_key
    );

    Ok(())
}

/// # Initialize Accounts
///
/// ## Constraints:
///
/// ### `init` on `vault_state`
/// Creates the account and fails if it already exists, which is what makes
/// initialization a one-shot per owner.
///
/// ### `seeds` on `vault`
/// The vault is only checked against its derivation here; it becomes a real
/// account once the reserve transfer lands.
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// The owner creating the vault. Pays rent for both accounts.
    #[account(mut)]
    pub signer: Signer<'info>,

    #[account(
        init,
        payer = signer,
        seeds = [VaultState::SEED_PREFIX, signer.key().as_ref()],
        bump,
        space = VaultState::LEN
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [VaultState::VAULT_SEED_PREFIX, vault_state.key().as_ref()],
        bump
    )]
    pub vault: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}
