//! # State Module
//!
//! Account structures stored by the vault program. Only `VaultState` carries
//! data; the VaultAccount is a plain system account whose lamports are the
//! vault balance.

pub mod vault_state;

pub use vault_state::*;
