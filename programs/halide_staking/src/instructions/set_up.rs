//! SetUp instruction handler.
//!
//! Fixes a pool's emission window and accrual engine. Allowed exactly
//! once per pool lifetime for index pools; share pools may be re-armed
//! with a fresh window once the previous distribution has ended.

use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::constants::*;
use crate::engine::share;
use crate::error::StakingError;
use crate::events::PoolConfigured;
use crate::state::{EngineKind, StakePool};

/// Accounts required for pool configuration.
#[derive(Accounts)]
pub struct SetUp<'info> {
    /// The pool authority.
    #[account(
        constraint = authority.key() == stake_pool.authority @ StakingError::Unauthorized
    )]
    pub authority: Signer<'info>,

    /// The stake pool to configure.
    #[account(
        mut,
        seeds = [STAKE_POOL_SEED, stake_pool.staking_mint.as_ref(), stake_pool.reward_mint.as_ref()],
        bump = stake_pool.bump,
        has_one = authority @ StakingError::Unauthorized,
        has_one = reward_vault @ StakingError::VaultMismatch
    )]
    pub stake_pool: Account<'info, StakePool>,

    /// The reward vault; its balance must cover the full emission.
    pub reward_vault: Account<'info, TokenAccount>,
}

/// Configure the emission window.
///
/// `emission_per_second` is `total_reward_amount / duration`, floored.
/// The pool must never be configured to emit more than the reward vault
/// holds at setup time.
///
/// # Arguments
/// * `ctx` - SetUp accounts context
/// * `start_time` - Unix timestamp the distribution opens (not in the past)
/// * `duration` - Distribution length in seconds
/// * `total_reward_amount` - Reward budget for the whole window
/// * `engine` - Accrual engine for this pool
///
/// # Errors
/// Returns an error if:
/// - The caller is not the pool authority
/// - The pool is already configured (index pools, or a share pool whose
///   distribution is still running)
/// - Parameters are invalid or the emission rate floors to zero
/// - The reward vault cannot cover the emission
pub fn handler(
    ctx: Context<SetUp>,
    start_time: i64,
    duration: u64,
    total_reward_amount: u64,
    engine: EngineKind,
) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    let stake_pool = &mut ctx.accounts.stake_pool;

    // === INPUT VALIDATION ===

    require!(duration > 0, StakingError::InvalidParameters);
    require!(total_reward_amount > 0, StakingError::InvalidParameters);
    require!(start_time >= now, StakingError::InvalidParameters);

    let duration_signed = i64::try_from(duration).map_err(|_| StakingError::InvalidParameters)?;
    let end_time = start_time
        .checked_add(duration_signed)
        .ok_or(StakingError::InvalidParameters)?;

    let emission_per_second = total_reward_amount / duration;
    require!(emission_per_second > 0, StakingError::InvalidParameters);

    // === LIFECYCLE GUARD ===

    if stake_pool.is_set_up {
        // Index pools configure exactly once. Share pools accept a new
        // window, but only after the running one has fully elapsed.
        require!(
            stake_pool.engine == EngineKind::Share,
            StakingError::AlreadyConfigured
        );
        require!(engine == EngineKind::Share, StakingError::EngineMismatch);
        require!(now >= stake_pool.end_time, StakingError::AlreadyConfigured);
        // Settle the old window before replacing it, so its tail
        // emission is not lost.
        share::harvest(stake_pool, now)?;
    }

    // === VAULT COVERAGE ===

    let committed = emission_per_second
        .checked_mul(duration)
        .ok_or(StakingError::MathOverflow)?;
    // A re-armed share pool still owes its unclaimed rewards on top of
    // the new emission.
    let total_committed = committed
        .checked_add(stake_pool.total_rewards)
        .ok_or(StakingError::MathOverflow)?;
    require!(
        ctx.accounts.reward_vault.amount >= total_committed,
        StakingError::InsufficientVaultBalance
    );

    // === STATE INITIALIZATION ===

    if !stake_pool.is_set_up {
        stake_pool.engine = engine;
        stake_pool.asset_index = match engine {
            EngineKind::LinearIndex => 0,
            EngineKind::CompoundIndex => WAD,
            EngineKind::Share => 0,
        };
    }
    stake_pool.start_time = start_time;
    stake_pool.end_time = end_time;
    stake_pool.emission_per_second = emission_per_second;
    stake_pool.last_update_time = start_time;
    stake_pool.is_set_up = true;

    emit!(PoolConfigured {
        pool: stake_pool.key(),
        engine: stake_pool.engine,
        start_time,
        end_time,
        emission_per_second,
        timestamp: now,
    });

    msg!(
        "Pool configured: {} rewards over [{}, {}) at {}/s",
        total_reward_amount,
        start_time,
        end_time,
        emission_per_second
    );

    Ok(())
}
