//! # Vault Address Derivation
//!
//! Both vault accounts are program derived addresses, so any client can
//! compute them from the owner's public key alone:
//!
//! ```text
//! owner ──["state", owner]──────────> VaultState PDA
//!                                         │
//! VaultState ──["vault", vault_state]──> VaultAccount PDA
//! ```

use solana_sdk::pubkey::Pubkey;

/// Seed prefix of the VaultState PDA.
pub const STATE_SEED: &[u8] = b"state";

/// Seed prefix of the VaultAccount PDA.
pub const VAULT_SEED: &[u8] = b"vault";

/// The two addresses that make up an owner's vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultAddresses {
    pub owner: Pubkey,

    /// Bookkeeping account.
    pub vault_state: Pubkey,
    pub state_bump: u8,

    /// Lamport-holding account.
    pub vault: Pubkey,
    pub vault_bump: u8,
}

impl VaultAddresses {
    /// Derive the vault addresses of `owner` under `program_id`.
    pub fn derive(owner: &Pubkey, program_id: &Pubkey) -> Self {
        let (vault_state, state_bump) =
            Pubkey::find_program_address(&[STATE_SEED, owner.as_ref()], program_id);
        let (vault, vault_bump) =
            Pubkey::find_program_address(&[VAULT_SEED, vault_state.as_ref()], program_id);

        Self {
            owner: *owner,
            vault_state,
            state_bump,
            vault,
            vault_bump,
        }
    }
}
