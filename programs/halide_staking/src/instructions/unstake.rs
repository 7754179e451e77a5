//! Unstake instruction handler.
//!
//! Withdraws staked principal. Index pools book outstanding accrual
//! first so rewards are never lost on exit; share pools leave reward
//! value behind as shares, claimable afterwards.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::engine::{index, share};
use crate::error::StakingError;
use crate::events::{AssetIndexUpdated, Unstaked};
use crate::state::{EngineKind, StakePool, UserStake};

/// Accounts required for unstaking.
#[derive(Accounts)]
pub struct Unstake<'info> {
    /// The position owner unstaking tokens.
    #[account(mut)]
    pub user: Signer<'info>,

    /// The stake pool.
    #[account(
        mut,
        seeds = [STAKE_POOL_SEED, stake_pool.staking_mint.as_ref(), stake_pool.reward_mint.as_ref()],
        bump = stake_pool.bump,
        has_one = staking_vault @ StakingError::VaultMismatch,
        has_one = staking_mint @ StakingError::MintMismatch
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

    /// The staking token mint.
    pub staking_mint: Account<'info, Mint>,

    /// Destination for the withdrawn principal. Any account of the
    /// staking mint.
    #[account(
        mut,
        constraint = recipient_token_account.mint == staking_mint.key() @ StakingError::MintMismatch
    )]
    pub recipient_token_account: Account<'info, TokenAccount>,

    /// Pool's staking vault.
    #[account(
        mut,
        constraint = staking_vault.key() == stake_pool.staking_vault @ StakingError::VaultMismatch
    )]
    pub staking_vault: Account<'info, TokenAccount>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Unstake tokens from the pool.
///
/// # Arguments
/// * `ctx` - Unstake accounts context
/// * `amount` - Requested amount; capped at the staked principal
///
/// # Returns
/// The amount actually unstaked.
///
/// # Errors
/// Returns an error if:
/// - The pool is unconfigured or the distribution has not started
/// - Amount is zero
/// - The user has no staked principal
pub fn handler(ctx: Context<Unstake>, amount: u64) -> Result<u64> {
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

    let amount_to_redeem = match stake_pool.engine {
        EngineKind::Share => share::unstake(stake_pool, user_stake, amount, now)?,
        _ => index::unstake(stake_pool, user_stake, amount, now)?,
    };
    if user_stake.staked_amount == 0 {
        stake_pool.staker_count = stake_pool.staker_count.saturating_sub(1);
    }

    if stake_pool.asset_index != old_index {
        emit!(AssetIndexUpdated {
            pool: pool_key,
            old_index,
            new_index: stake_pool.asset_index,
            timestamp: now,
        });
    }

    // Return principal from the staking vault with the pool PDA signer.
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
        from: ctx.accounts.staking_vault.to_account_info(),
        to: ctx.accounts.recipient_token_account.to_account_info(),
        authority: ctx.accounts.stake_pool.to_account_info(),
    };
    let cpi_program = ctx.accounts.token_program.to_account_info();
    let cpi_ctx = CpiContext::new_with_signer(cpi_program, cpi_accounts, signer_seeds);
    token::transfer(cpi_ctx, amount_to_redeem)?;

    emit!(Unstaked {
        pool: pool_key,
        user: ctx.accounts.user.key(),
        recipient: ctx.accounts.recipient_token_account.key(),
        amount: amount_to_redeem,
        remaining_staked: ctx.accounts.user_stake.staked_amount,
        timestamp: now,
    });

    msg!("Unstaked {} tokens", amount_to_redeem);
    msg!("Remaining staked: {}", ctx.accounts.user_stake.staked_amount);

    Ok(amount_to_redeem)
}
