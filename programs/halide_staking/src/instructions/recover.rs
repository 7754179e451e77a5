//! Recover instruction handler.
//!
//! Lets the pool authority sweep surplus reward tokens once the
//! distribution has ended. Outstanding user entitlements are computed
//! first and can never be swept.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::engine::share;
use crate::error::StakingError;
use crate::events::RewardsRecovered;
use crate::state::{EngineKind, StakePool};

/// Accounts required for recovering surplus rewards.
#[derive(Accounts)]
pub struct Recover<'info> {
    /// The pool authority.
    #[account(
        constraint = authority.key() == stake_pool.authority @ StakingError::Unauthorized
    )]
    pub authority: Signer<'info>,

    /// The stake pool.
    #[account(
        mut,
        seeds = [STAKE_POOL_SEED, stake_pool.staking_mint.as_ref(), stake_pool.reward_mint.as_ref()],
        bump = stake_pool.bump,
        has_one = authority @ StakingError::Unauthorized,
        has_one = reward_vault @ StakingError::VaultMismatch
    )]
    pub stake_pool: Account<'info, StakePool>,

    /// Destination for the recovered tokens.
    #[account(
        mut,
        constraint = recipient_token_account.mint == stake_pool.reward_mint @ StakingError::MintMismatch
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

/// Recover surplus reward tokens after the distribution ends.
///
/// The sweepable surplus is the vault balance minus everything still
/// owed to stakers: for share pools the unclaimed attributed rewards,
/// for index pools the emitted-but-unclaimed remainder (forgone
/// emission is sweepable in both cases).
///
/// # Arguments
/// * `ctx` - Recover accounts context
/// * `amount` - Requested amount; capped at the sweepable surplus
///
/// # Returns
/// The amount actually recovered.
pub fn handler(ctx: Context<Recover>, amount: u64) -> Result<u64> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    require!(amount > 0, StakingError::InvalidParameters);

    let pool_key = ctx.accounts.stake_pool.key();
    let stake_pool = &mut ctx.accounts.stake_pool;
    require!(stake_pool.is_set_up, StakingError::NotStarted);
    require!(now >= stake_pool.end_time, StakingError::DistributionActive);

    let outstanding = match stake_pool.engine {
        EngineKind::Share => {
            // Settle the window so the tail emission is attributed.
            share::harvest(stake_pool, now)?;
            stake_pool.total_rewards
        }
        _ => {
            let window = u64::try_from(stake_pool.end_time - stake_pool.start_time)
                .map_err(|_| StakingError::MathOverflow)?;
            let emitted_total = stake_pool
                .emission_per_second
                .checked_mul(window)
                .ok_or(StakingError::MathOverflow)?;
            emitted_total
                .saturating_sub(stake_pool.rewards_forgone)
                .saturating_sub(stake_pool.total_claimed)
        }
    };

    let surplus = ctx.accounts.reward_vault.amount.saturating_sub(outstanding);
    let amount_to_recover = amount.min(surplus);
    require!(amount_to_recover > 0, StakingError::NoRewards);

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
    token::transfer(cpi_ctx, amount_to_recover)?;

    emit!(RewardsRecovered {
        pool: pool_key,
        authority: ctx.accounts.authority.key(),
        amount: amount_to_recover,
        timestamp: now,
    });

    msg!("Recovered {} surplus reward tokens", amount_to_recover);

    Ok(amount_to_recover)
}
