//! Error types for the Halide Staking program.
//!
//! This module defines all custom error codes that can be returned by the
//! program. Each error has a unique code and descriptive message.
//!
//! ## Error Code Ranges
//! - 6000-6009: Lifecycle errors
//! - 6010-6019: Parameter validation errors
//! - 6020-6029: Accrual/balance errors
//! - 6030-6039: Math/overflow errors
//! - 6040-6049: Authorization errors
//! - 6050-6059: Account validation errors

use anchor_lang::prelude::*;

/// Custom error codes for the Halide Staking program.
///
/// Error codes start at 6000 (Anchor's custom error offset).
#[error_code]
pub enum StakingError {
    // ========== Lifecycle Errors (6000-6009) ==========

    /// [6000] The pool has not been configured or the distribution window
    /// has not opened yet.
    #[msg("Distribution has not started")]
    NotStarted,

    /// [6001] `set_up` was called on an already configured pool (index
    /// pools: one-shot latch; share pools: distribution still running).
    #[msg("Pool is already configured")]
    AlreadyConfigured,

    /// [6002] The operation requires the distribution to be over.
    #[msg("Distribution is still active")]
    DistributionActive,

    // ========== Parameter Validation Errors (6010-6019) ==========

    /// [6010] Zero amount, zero duration, a start time in the past, or an
    /// emission rate that rounds to zero.
    #[msg("Invalid parameters")]
    InvalidParameters,

    /// [6011] The reward vault cannot cover the configured emission.
    #[msg("Reward vault balance cannot cover the emission schedule")]
    InsufficientVaultBalance,

    // ========== Accrual/Balance Errors (6020-6029) ==========

    /// [6020] Claim attempted with zero net accrued rewards.
    #[msg("No rewards available to claim")]
    NoRewards,

    /// [6021] Unstake attempted with zero staked principal.
    #[msg("Nothing staked")]
    NothingStaked,

    // ========== Math/Overflow Errors (6030-6039) ==========

    /// [6030] Arithmetic overflow occurred during calculation.
    #[msg("Arithmetic overflow occurred during calculation")]
    MathOverflow,

    // ========== Authorization Errors (6040-6049) ==========

    /// [6040] Unauthorized - caller is not the pool authority.
    #[msg("Unauthorized: caller is not the pool authority")]
    Unauthorized,

    /// [6041] Unauthorized - signer does not match stake owner.
    #[msg("Unauthorized: signer does not match stake owner")]
    InvalidStakeOwner,

    // ========== Account Validation Errors (6050-6059) ==========

    /// [6050] The provided mint does not match the pool's configuration.
    #[msg("Token mint mismatch - wrong token for this pool")]
    MintMismatch,

    /// [6051] The provided vault does not match the pool's vaults.
    #[msg("Vault address mismatch")]
    VaultMismatch,

    /// [6052] Vault owner is not the stake pool PDA.
    #[msg("Vault owner must be the stake pool PDA")]
    InvalidVaultOwner,

    /// [6053] User stake account does not belong to this pool.
    #[msg("User stake account does not belong to this pool")]
    StakePoolMismatch,

    /// [6054] The engine kind does not match the pool's configuration.
    #[msg("Engine kind mismatch")]
    EngineMismatch,
}
