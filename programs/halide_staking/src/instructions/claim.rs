//! Claim instruction handler.
//!
//! Pays out accrued rewards, capped at the caller's claimable total,
//! without touching the staked principal.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::engine::{index, share};
use crate::error::StakingError;
use crate::events::{AssetIndexUpdated, RewardsClaimed, RewardsHarvested};
use crate::state::{EngineKind, StakePool, UserStake};

/// Accounts required for claiming rewards.
#[derive(Accounts)]
pub struct Claim<'info> {
    /// The position owner claiming rewards.
    #[account(mut)]
    pub user: Signer<'info>,

    /// The stake pool.
    #[account(
        mut,
        seeds = [STAKE_POOL_SEED, stake_pool.staking_mint.as_ref(), stake_pool.reward_mint.as_ref()],
        bump = stake_pool.bump,
        has_one = reward_vault @ StakingError::VaultMismatch,
        has_one = reward_mint @ StakingError::MintMismatch
    )]
    pub stake_pool: Account<'info, StakePool>,

    /// User's position.
    #[account(
        mut,
        seeds = [USER_STAKE_SEED, stake_pool.key().as_ref(), user.key().as_ref()],
        bump = user_stake.bump,
        constraint = user_stake.owner == user.key() @ StakingError::InvalidStakeOwner,
        constraint = user_stake.stake_pool == stake_pool.key() @ StakingError::StakePoolMismatch
    )]
    pub user_stake: Account<'info, UserStake>,

    /// The reward token mint.
    pub reward_mint: Account<'info, Mint>,

    /// Destination for the rewards. Any account of the reward mint; the
    /// owner chooses where their rewards go.
    #[account(
        mut,
        constraint = recipient_token_account.mint == reward_mint.key() @ StakingError::MintMismatch
    )]
    pub recipient_token_account: Account<'info, TokenAccount>,

    /// Pool's reward vault.
    #[account(
        mut,
        constraint = reward_vault.key() == stake_pool.reward_vault @ StakingError::VaultMismatch
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Claim accrued rewards.
///
/// # Arguments
/// * `ctx` - Claim accounts context
/// * `amount` - Requested amount; capped at the claimable total
///
/// # Returns
/// The amount actually claimed.
///
/// # Errors
/// Returns an error if:
/// - The pool is unconfigured or the distribution has not started
/// - Amount is zero
/// - Nothing has accrued since the last claim
pub fn handler(ctx: Context<Claim>, amount: u64) -> Result<u64> {
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

    let pool_key = ctx.accounts.stake_pool.key();
    let stake_pool = &mut ctx.accounts.stake_pool;
    let user_stake = &mut ctx.accounts.user_stake;
    let old_index = stake_pool.asset_index;
    let old_harvested = stake_pool.total_rewards_harvested;

    let amount_to_claim = match stake_pool.engine {
        EngineKind::Share => share::claim(stake_pool, user_stake, amount, now)?,
        _ => index::claim(stake_pool, user_stake, amount, now)?,
    };

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

    // Pay rewards out of the reward vault with the pool PDA as signer.
    let staking_mint_key = ctx.accounts.stake_pool.staking_mint;
    let reward_mint_key = ctx.accounts.stake_pool.reward_mint;
    let seeds = &[
        STAKE_POOL_SEED,
        staking_mint_key.as_ref(),
        reward_mint_key.as_ref(),
        &[ctx.accounts.stake_pool.bump],
    ];
    let signer_seeds = &[&seeds[..]];

    let cpi_accounts = Transfer {
        from: ctx.accounts.reward_vault.to_account_info(),
        to: ctx.accounts.recipient_token_account.to_account_info(),
        authority: ctx.accounts.stake_pool.to_account_info(),
    };
    let cpi_program = ctx.accounts.token_program.to_account_info();
    let cpi_ctx = CpiContext::new_with_signer(cpi_program, cpi_accounts, signer_seeds);
    token::transfer(cpi_ctx, amount_to_claim)?;

    emit!(RewardsClaimed {
        pool: pool_key,
        user: ctx.accounts.user.key(),
        recipient: ctx.accounts.recipient_token_account.key(),
        amount: amount_to_claim,
        total_claimed_by_user: ctx.accounts.user_stake.claimed_rewards,
        timestamp: now,
    });

    msg!("Claimed {} reward tokens", amount_to_claim);
    msg!(
        "Total rewards claimed by user: {}",
        ctx.accounts.user_stake.claimed_rewards
    );

    Ok(amount_to_claim)
}
