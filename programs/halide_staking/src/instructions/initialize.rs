//! Initialize instruction handler.
//!
//! Creates a staking pool and its two vaults. The pool is created
//! unconfigured; emission only starts once `set_up` is called.
//!
//! ## Security Guarantees
//! - Both vaults are PDAs owned by the stake pool
//! - Mint addresses are locked to pool state permanently

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::events::PoolInitialized;
use crate::state::StakePool;

/// Accounts required for pool creation.
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// The authority that will control the pool.
    #[account(mut)]
    pub authority: Signer<'info>,

    /// The stake pool account to be created.
    /// PDA derived from the mint pair ensures one pool per pair.
    #[account(
        init,
        payer = authority,
        space = StakePool::LEN,
        seeds = [STAKE_POOL_SEED, staking_mint.key().as_ref(), reward_mint.key().as_ref()],
        bump
    )]
    pub stake_pool: Account<'info, StakePool>,

    /// The mint of the token users deposit.
    pub staking_mint: Account<'info, Mint>,

    /// The mint of the token the pool emits.
    pub reward_mint: Account<'info, Mint>,

    /// The vault that will hold staked principal.
    /// Authority is the stake pool PDA and cannot be changed.
    #[account(
        init,
        payer = authority,
        seeds = [STAKING_VAULT_SEED, stake_pool.key().as_ref()],
        bump,
        token::mint = staking_mint,
        token::authority = stake_pool
    )]
    pub staking_vault: Account<'info, TokenAccount>,

    /// The vault that will hold the reward emission budget.
    /// Same protections as the staking vault.
    #[account(
        init,
        payer = authority,
        seeds = [REWARD_VAULT_SEED, stake_pool.key().as_ref()],
        bump,
        token::mint = reward_mint,
        token::authority = stake_pool
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    /// System program for account creation.
    pub system_program: Program<'info, System>,

    /// Token program for token account operations.
    pub token_program: Program<'info, Token>,

    /// Rent sysvar for rent-exempt calculations.
    pub rent: Sysvar<'info, Rent>,
}

/// Create an unconfigured staking pool.
///
/// # Arguments
/// * `ctx` - Initialize accounts context
///
/// # Returns
/// Result indicating success or error
pub fn handler(ctx: Context<Initialize>) -> Result<()> {
    let stake_pool = &mut ctx.accounts.stake_pool;
    let clock = Clock::get()?;

    stake_pool.authority = ctx.accounts.authority.key();
    stake_pool.staking_mint = ctx.accounts.staking_mint.key();
    stake_pool.reward_mint = ctx.accounts.reward_mint.key();
    stake_pool.staking_vault = ctx.accounts.staking_vault.key();
    stake_pool.reward_vault = ctx.accounts.reward_vault.key();
    stake_pool.is_set_up = false;

    stake_pool.bump = ctx.bumps.stake_pool;
    stake_pool.staking_vault_bump = ctx.bumps.staking_vault;
    stake_pool.reward_vault_bump = ctx.bumps.reward_vault;

    emit!(PoolInitialized {
        pool: stake_pool.key(),
        authority: stake_pool.authority,
        staking_mint: stake_pool.staking_mint,
        reward_mint: stake_pool.reward_mint,
        timestamp: clock.unix_timestamp,
    });

    msg!("Staking pool created (unconfigured)");
    msg!("Authority: {}", ctx.accounts.authority.key());
    msg!("Staking mint: {}", ctx.accounts.staking_mint.key());
    msg!("Reward mint: {}", ctx.accounts.reward_mint.key());

    Ok(())
}
