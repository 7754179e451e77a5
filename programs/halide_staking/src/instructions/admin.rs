//! Admin instruction handlers.
//!
//! Authority-only operations for the staking pool.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::StakingError;
use crate::events::AuthorityTransferred;
use crate::state::StakePool;

/// Accounts required for admin operations.
#[derive(Accounts)]
pub struct AdminControl<'info> {
    /// The pool authority. Must be signer AND match pool.authority.
    #[account(
        constraint = authority.key() == stake_pool.authority @ StakingError::Unauthorized
    )]
    pub authority: Signer<'info>,

    /// The stake pool to modify.
    #[account(
        mut,
        seeds = [STAKE_POOL_SEED, stake_pool.staking_mint.as_ref(), stake_pool.reward_mint.as_ref()],
        bump = stake_pool.bump,
        has_one = authority @ StakingError::Unauthorized
    )]
    pub stake_pool: Account<'info, StakePool>,
}

/// Transfer pool authority to a new address.
///
/// # Arguments
/// * `ctx` - AdminControl accounts context
/// * `new_authority` - New authority pubkey (non-zero)
///
/// # Errors
/// Returns an error if the caller is not the current authority or the
/// new authority is the zero address.
pub fn transfer_authority_handler(
    ctx: Context<AdminControl>,
    new_authority: Pubkey,
) -> Result<()> {
    require!(
        new_authority != Pubkey::default(),
        StakingError::InvalidParameters
    );

    let stake_pool = &mut ctx.accounts.stake_pool;
    let clock = Clock::get()?;

    let old_authority = stake_pool.authority;
    stake_pool.authority = new_authority;

    emit!(AuthorityTransferred {
        pool: stake_pool.key(),
        old_authority,
        new_authority,
        timestamp: clock.unix_timestamp,
    });

    msg!("Authority transferred: {} -> {}", old_authority, new_authority);

    Ok(())
}
