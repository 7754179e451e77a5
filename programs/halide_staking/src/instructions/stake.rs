//! Stake instruction handler.
//!
//! Deposits staked tokens into the pool for a beneficiary, booking the
//! beneficiary's outstanding accrual first.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::engine::{index, share};
use crate::error::StakingError;
use crate::events::{AssetIndexUpdated, RewardsHarvested, Staked};
use crate::state::{EngineKind, StakePool, UserStake};

/// Accounts required for staking.
#[derive(Accounts)]
pub struct Stake<'info> {
    /// The account paying the deposit.
    #[account(mut)]
    pub staker: Signer<'info>,

    /// The account the position is credited to. May equal the staker.
    /// CHECK: Only used as a PDA seed and stored as the position owner.
    pub beneficiary: UncheckedAccount<'info>,

    /// The stake pool.
    #[account(
        mut,
        seeds = [STAKE_POOL_SEED, stake_pool.staking_mint.as_ref(), stake_pool.reward_mint.as_ref()],
        bump = stake_pool.bump,
        has_one = staking_vault @ StakingError::VaultMismatch,
        has_one = staking_mint @ StakingError::MintMismatch
    )]
    pub stake_pool: Account<'info, StakePool>,

    /// Beneficiary's position (created on first deposit).
    #[account(
        init_if_needed,
        payer = staker,
        space = UserStake::LEN,
        seeds = [USER_STAKE_SEED, stake_pool.key().as_ref(), beneficiary.key().as_ref()],
        bump
    )]
    pub user_stake: Account<'info, UserStake>,

    /// The staking token mint.
    pub staking_mint: Account<'info, Mint>,

    /// Staker's token account for the staking token.
    #[account(
        mut,
        constraint = staker_token_account.mint == staking_mint.key() @ StakingError::MintMismatch,
        constraint = staker_token_account.owner == staker.key()
    )]
    pub staker_token_account: Account<'info, TokenAccount>,

    /// Pool's staking vault.
    #[account(
        mut,
        constraint = staking_vault.key() == stake_pool.staking_vault @ StakingError::VaultMismatch
    )]
    pub staking_vault: Account<'info, TokenAccount>,

    /// System program.
    pub system_program: Program<'info, System>,

    /// Token program.
    pub token_program: Program<'info, Token>,

    /// Rent sysvar.
    pub rent: Sysvar<'info, Rent>,
}

/// Stake tokens into the pool.
///
/// # Arguments
/// * `ctx` - Stake accounts context
/// * `amount` - Amount of staking tokens to deposit
///
/// # Errors
/// Returns an error if:
/// - The pool is unconfigured or the distribution has not started
/// - Amount is zero
/// - The staker's balance is insufficient
pub fn handler(ctx: Context<Stake>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    {
        let stake_pool = &ctx.accounts.stake_pool;
        require!(
            stake_pool.is_set_up && now >= stake_pool.start_time,
            StakingError::NotStarted
        );
    }
    require!(amount > 0, StakingError::InvalidParameters);

    // Pull the deposit into the staking vault.
    let cpi_accounts = Transfer {
        from: ctx.accounts.staker_token_account.to_account_info(),
        to: ctx.accounts.staking_vault.to_account_info(),
        authority: ctx.accounts.staker.to_account_info(),
    };
    let cpi_program = ctx.accounts.token_program.to_account_info();
    let cpi_ctx = CpiContext::new(cpi_program, cpi_accounts);
    token::transfer(cpi_ctx, amount)?;

    let pool_key = ctx.accounts.stake_pool.key();
    let user_stake = &mut ctx.accounts.user_stake;

    // First deposit for this beneficiary initializes the position.
    if user_stake.owner == Pubkey::default() {
        user_stake.owner = ctx.accounts.beneficiary.key();
        user_stake.stake_pool = pool_key;
        user_stake.bump = ctx.bumps.user_stake;
    }
    require!(
        user_stake.stake_pool == pool_key,
        StakingError::StakePoolMismatch
    );

    let stake_pool = &mut ctx.accounts.stake_pool;
    let was_empty = user_stake.staked_amount == 0;
    let old_index = stake_pool.asset_index;
    let old_harvested = stake_pool.total_rewards_harvested;

    match stake_pool.engine {
        EngineKind::Share => {
            share::stake(stake_pool, user_stake, amount, now)?;
        }
        _ => {
            index::stake(stake_pool, user_stake, amount, now)?;
        }
    }
    if was_empty {
        stake_pool.staker_count = stake_pool.staker_count.saturating_add(1);
    }

    if stake_pool.asset_index != old_index {
        emit!(AssetIndexUpdated {
            pool: pool_key,
            old_index,
            new_index: stake_pool.asset_index,
            timestamp: now,
        });
    }
    if stake_pool.total_rewards_harvested != old_harvested {
        emit!(RewardsHarvested {
            pool: pool_key,
            amount: stake_pool.total_rewards_harvested - old_harvested,
            total_rewards: stake_pool.total_rewards,
            total_rewards_harvested: stake_pool.total_rewards_harvested,
            timestamp: now,
        });
    }
    emit!(Staked {
        pool: pool_key,
        beneficiary: ctx.accounts.beneficiary.key(),
        amount,
        total_staked: stake_pool.total_staked,
        timestamp: now,
    });

    msg!("Staked {} tokens", amount);
    msg!("Total staked by user: {}", ctx.accounts.user_stake.staked_amount);

    Ok(())
}
