//! # Instructions Module
//!
//! | Instruction | Who Can Call | Description |
//! |-------------|--------------|-------------|
//! | `initialize` | Any wallet | Create the owner's vault (once) |
//! | `deposit` | Vault owner | Add lamports to the vault |
//! | `withdraw` | Vault owner | Take lamports out of the vault |
//! | `close` | Vault owner | Drain the vault and reclaim its accounts |
//!
//! ```text
//! initialize ──> deposit / withdraw (any number of times) ──> close
//!     ▲                                                         │
//!     └─────────────────────────────────────────────────────────┘
//! ```

pub mod initialize;
pub mod deposit;
pub mod withdraw;
pub mod close;

pub use initialize::*;
pub use deposit::*;
pub use withdraw::*;
pub use close::*;
