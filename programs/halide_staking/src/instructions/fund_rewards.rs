//! FundRewards instruction handler.
//!
//! Deposits reward tokens into the reward vault. Permissionless: anyone
//! may top up the emission budget.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::error::StakingError;
use crate::events::RewardsFunded;
use crate::state::StakePool;

/// Accounts required for funding the reward vault.
#[derive(Accounts)]
pub struct FundRewards<'info> {
    /// The funder (anyone can fund - no authority restriction).
    #[account(mut)]
    pub funder: Signer<'info>,

    /// The stake pool.
    #[account(
        seeds = [STAKE_POOL_SEED, stake_pool.staking_mint.as_ref(), stake_pool.reward_mint.as_ref()],
        bump = stake_pool.bump,
        has_one = reward_vault @ StakingError::VaultMismatch,
        has_one = reward_mint @ StakingError::MintMismatch
    )]
    pub stake_pool: Account<'info, StakePool>,

    /// The reward token mint.
    pub reward_mint: Account<'info, Mint>,

    /// Funder's token account.
    #[account(
        mut,
        constraint = funder_token_account.mint == reward_mint.key() @ StakingError::MintMismatch,
        constraint = funder_token_account.owner == funder.key()
    )]
    pub funder_token_account: Account<'info, TokenAccount>,

    /// Pool's reward vault.
    #[account(
        mut,
        constraint = reward_vault.key() == stake_pool.reward_vault @ StakingError::VaultMismatch,
        constraint = reward_vault.owner == stake_pool.key() @ StakingError::InvalidVaultOwner
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Fund the reward vault.
///
/// # Arguments
/// * `ctx` - FundRewards accounts context
/// * `amount` - Amount of reward tokens to deposit
///
/// # Errors
/// Returns an error if amount is zero or the funder balance is
/// insufficient.
pub fn handler(ctx: Context<FundRewards>, amount: u64) -> Result<()> {
    require!(amount > 0, StakingError::InvalidParameters);

    let cpi_accounts = Transfer {
        from: ctx.accounts.funder_token_account.to_account_info(),
        to: ctx.accounts.reward_vault.to_account_info(),
        authority: ctx.accounts.funder.to_account_info(),
    };
    let cpi_program = ctx.accounts.token_program.to_account_info();
    let cpi_ctx = CpiContext::new(cpi_program, cpi_accounts);
    token::transfer(cpi_ctx, amount)?;

    let clock = Clock::get()?;
    ctx.accounts.reward_vault.reload()?;

    emit!(RewardsFunded {
        pool: ctx.accounts.stake_pool.key(),
        funder: ctx.accounts.funder.key(),
        amount,
        timestamp: clock.unix_timestamp,
    });

    msg!("Reward vault funded with {} tokens", amount);
    msg!("New reward vault balance: {}", ctx.accounts.reward_vault.amount);

    Ok(())
}
