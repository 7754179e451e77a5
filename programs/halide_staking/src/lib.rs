//! # Halide Staking Program
//!
//! Single-sided staking pools that distribute a fixed-rate reward-token
//! emission to depositors of a staked token, proportionally to their
//! staked balance over time. Each pool runs one of two accrual engines:
//!
//! - **Index** — a cumulative asset index (linear reward-per-staked-unit
//!   or auto-compounding multiplier) with per-user snapshots
//! - **Share** — a vault-style exchange rate where positions are shares
//!   against the pooled asset value
//!
//! ## Features
//! - One contiguous emission window `[start, end)` per pool
//! - Lazy catch-up accounting: accrual is computed on the next
//!   interaction, never by background processing
//! - Emission with no stakers is forgone (tracked, never claimable)
//! - Permissionless reward funding, authority-gated surplus recovery
//! - Safe math with overflow protection; divisions truncate toward zero
//!   so the pool can only ever under-pay by dust

use anchor_lang::prelude::*;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod instructions;
pub mod state;

use instructions::*;
use state::EngineKind;

#[program]
pub mod halide_staking {
    use super::*;

    /// Creates an unconfigured staking pool with its two vaults.
    ///
    /// # Arguments
    /// * `ctx` - The context containing all accounts needed for creation
    ///
    /// # Errors
    /// Returns an error if the pool for this mint pair already exists.
    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        instructions::initialize::handler(ctx)
    }

    /// Configures the emission window and accrual engine.
    ///
    /// # Arguments
    /// * `ctx` - The context containing the pool and reward vault
    /// * `start_time` - Unix timestamp the distribution opens
    /// * `duration` - Distribution length in seconds
    /// * `total_reward_amount` - Reward budget for the whole window
    /// * `engine` - Accrual engine for this pool
    ///
    /// # Errors
    /// Returns an error if:
    /// - Caller is not the pool authority
    /// - The pool is already configured
    /// - Parameters are invalid or the vault cannot cover the emission
    pub fn set_up(
        ctx: Context<SetUp>,
        start_time: i64,
        duration: u64,
        total_reward_amount: u64,
        engine: EngineKind,
    ) -> Result<()> {
        instructions::set_up::handler(ctx, start_time, duration, total_reward_amount, engine)
    }

    /// Stakes tokens into the pool for a beneficiary.
    ///
    /// # Arguments
    /// * `ctx` - The context containing all accounts needed for staking
    /// * `amount` - Amount of staking tokens to deposit
    ///
    /// # Errors
    /// Returns an error if:
    /// - The distribution has not started
    /// - Amount is zero
    /// - Insufficient balance
    pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
        instructions::stake::handler(ctx, amount)
    }

    /// Claims accrued rewards without unstaking.
    ///
    /// # Arguments
    /// * `ctx` - The context containing all accounts needed for claiming
    /// * `amount` - Requested amount; capped at the claimable total
    ///
    /// # Errors
    /// Returns an error if:
    /// - The distribution has not started
    /// - No rewards have accrued
    pub fn claim(ctx: Context<Claim>, amount: u64) -> Result<u64> {
        instructions::claim::handler(ctx, amount)
    }

    /// Withdraws staked principal.
    ///
    /// # Arguments
    /// * `ctx` - The context containing all accounts needed for unstaking
    /// * `amount` - Requested amount; capped at the staked principal
    ///
    /// # Errors
    /// Returns an error if:
    /// - The distribution has not started
    /// - Nothing is staked
    pub fn unstake(ctx: Context<Unstake>, amount: u64) -> Result<u64> {
        instructions::unstake::handler(ctx, amount)
    }

    /// Funds the reward vault. Permissionless.
    ///
    /// # Arguments
    /// * `ctx` - The context containing funding accounts
    /// * `amount` - Amount of reward tokens to deposit
    ///
    /// # Errors
    /// Returns an error if amount is zero or insufficient balance.
    pub fn fund_rewards(ctx: Context<FundRewards>, amount: u64) -> Result<()> {
        instructions::fund_rewards::handler(ctx, amount)
    }

    /// Recovers surplus reward tokens after the distribution ends.
    ///
    /// # Arguments
    /// * `ctx` - The context containing recovery accounts
    /// * `amount` - Requested amount; capped at the sweepable surplus
    ///
    /// # Errors
    /// Returns an error if:
    /// - Caller is not the pool authority
    /// - The distribution is still running
    /// - Nothing is sweepable
    pub fn recover(ctx: Context<Recover>, amount: u64) -> Result<u64> {
        instructions::recover::handler(ctx, amount)
    }

    /// Transfers pool authority to a new address.
    ///
    /// # Arguments
    /// * `ctx` - The context containing admin accounts
    /// * `new_authority` - New authority pubkey
    ///
    /// # Errors
    /// Returns an error if caller is not the current authority.
    pub fn transfer_authority(ctx: Context<AdminControl>, new_authority: Pubkey) -> Result<()> {
        instructions::admin::transfer_authority_handler(ctx, new_authority)
    }
}
