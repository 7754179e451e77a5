//! Program constants for the Halide Staking program.
//!
//! Defines PDA seeds and the fixed-point scale shared by both accrual
//! engines.

use anchor_lang::prelude::*;

/// Seed for deriving the stake pool PDA
pub const STAKE_POOL_SEED: &[u8] = b"stake_pool";

/// Seed for deriving user stake account PDAs
pub const USER_STAKE_SEED: &[u8] = b"user_stake";

/// Seed for deriving the staking vault PDA (holds deposited principal)
pub const STAKING_VAULT_SEED: &[u8] = b"staking_vault";

/// Seed for deriving the reward vault PDA (holds the emission budget)
pub const REWARD_VAULT_SEED: &[u8] = b"reward_vault";

/// Fixed-point scale for asset indices, user indices and exchange rates.
///
/// Index values are `u128` scaled by `WAD` (18 decimals). Multiplication
/// always happens before the matching division so the only precision loss
/// is the final truncation toward zero.
pub const WAD: u128 = 1_000_000_000_000_000_000;
