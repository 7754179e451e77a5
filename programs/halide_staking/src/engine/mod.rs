//! Reward-accrual engines.
//!
//! Both engines are pure functions over the state structs plus a caller
//! supplied timestamp, so they can be exercised without a Solana runtime.
//! Instruction handlers own account validation and token movement; the
//! engines own the ledger arithmetic.

pub mod emission;
pub mod index;
pub mod share;
