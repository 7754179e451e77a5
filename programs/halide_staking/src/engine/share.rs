//! Share Engine accrual.
//!
//! Positions are share counts against the pooled asset value (principal
//! plus unclaimed rewards), vault style. Rewards accrue implicitly as
//! the exchange rate rises on each harvest; no per-user index exists
//! because shares self-dilute and appreciate.

use anchor_lang::prelude::*;

use crate::engine::emission;
use crate::error::StakingError;
use crate::state::{StakePool, UserStake};

/// Advance pool accounting to `now`, crediting the interval's emission.
///
/// The emission is always added to the monotonic `total_rewards_harvested`
/// counter; it only becomes claimable (`total_rewards`) when shares exist,
/// otherwise it is forgone. Returns the amount the caller must move from
/// the reward vault into pool custody.
pub fn harvest(pool: &mut StakePool, now: i64) -> Result<u64> {
    if now <= pool.last_update_time {
        return Ok(0);
    }
    let emitted = emission::rewards_emitted(
        pool.emission_per_second,
        pool.last_update_time,
        pool.end_time,
        now,
    )?;
    pool.last_update_time = emission::clamp_to_end(now, pool.end_time);
    if emitted == 0 {
        return Ok(0);
    }

    pool.total_rewards_harvested = pool
        .total_rewards_harvested
        .checked_add(emitted)
        .ok_or(StakingError::MathOverflow)?;
    if pool.total_shares > 0 {
        pool.total_rewards = pool
            .total_rewards
            .checked_add(emitted)
            .ok_or(StakingError::MathOverflow)?;
    } else {
        pool.rewards_forgone = pool
            .rewards_forgone
            .checked_add(emitted)
            .ok_or(StakingError::MathOverflow)?;
    }
    Ok(emitted)
}

/// Harvest, then deposit `amount` at the current exchange rate.
///
/// The first deposit (or a deposit into a drained pool) seeds shares 1:1.
/// Returns the shares minted.
pub fn stake(pool: &mut StakePool, user: &mut UserStake, amount: u64, now: i64) -> Result<u128> {
    harvest(pool, now)?;

    let pooled_assets = pool.pooled_assets().ok_or(StakingError::MathOverflow)?;
    let new_shares = if pool.total_shares == 0 || pooled_assets == 0 {
        amount as u128
    } else {
        (amount as u128)
            .checked_mul(pool.total_shares)
            .ok_or(StakingError::MathOverflow)?
            .checked_div(pooled_assets as u128)
            .ok_or(StakingError::MathOverflow)?
    };

    user.shares = user
        .shares
        .checked_add(new_shares)
        .ok_or(StakingError::MathOverflow)?;
    user.staked_amount = user
        .staked_amount
        .checked_add(amount)
        .ok_or(StakingError::MathOverflow)?;
    pool.total_shares = pool
        .total_shares
        .checked_add(new_shares)
        .ok_or(StakingError::MathOverflow)?;
    pool.total_staked = pool
        .total_staked
        .checked_add(amount)
        .ok_or(StakingError::MathOverflow)?;
    Ok(new_shares)
}

/// Asset value of a position at the current exchange rate.
pub fn user_assets(pool: &StakePool, user: &UserStake) -> Result<u64> {
    if pool.total_shares == 0 {
        return Ok(0);
    }
    let pooled_assets = pool.pooled_assets().ok_or(StakingError::MathOverflow)?;
    let raw = user
        .shares
        .checked_mul(pooled_assets as u128)
        .ok_or(StakingError::MathOverflow)?
        .checked_div(pool.total_shares)
        .ok_or(StakingError::MathOverflow)?;
    u64::try_from(raw).map_err(|_| StakingError::MathOverflow.into())
}

/// Harvest, then pay out up to `amount` of the position's reward value
/// (asset value in excess of principal), burning the matching shares.
///
/// Returns the actual amount claimed.
pub fn claim(pool: &mut StakePool, user: &mut UserStake, amount: u64, now: i64) -> Result<u64> {
    harvest(pool, now)?;

    let user_total_assets = user_assets(pool, user)?;
    // Truncation can leave the asset value a hair under the principal;
    // saturate instead of underflowing.
    let user_total_rewards = user_total_assets.saturating_sub(user.staked_amount);
    require!(user_total_rewards > 0, StakingError::NoRewards);

    // A floored share burn on unstake can leave a position holding share
    // value a truncation unit above the attributed bucket; the bucket is
    // the hard ceiling on what any claim may pay.
    let amount_to_claim = amount.min(user_total_rewards).min(pool.total_rewards);
    require!(amount_to_claim > 0, StakingError::NoRewards);

    let pooled_assets = pool.pooled_assets().ok_or(StakingError::MathOverflow)?;
    let amount_in_shares = (amount_to_claim as u128)
        .checked_mul(pool.total_shares)
        .ok_or(StakingError::MathOverflow)?
        .checked_div(pooled_assets as u128)
        .ok_or(StakingError::MathOverflow)?;

    // Every fallible step happens before the ledger is touched.
    let user_shares = user
        .shares
        .checked_sub(amount_in_shares)
        .ok_or(StakingError::MathOverflow)?;
    let user_claimed = user
        .claimed_rewards
        .checked_add(amount_to_claim)
        .ok_or(StakingError::MathOverflow)?;
    let total_shares = pool
        .total_shares
        .checked_sub(amount_in_shares)
        .ok_or(StakingError::MathOverflow)?;
    let total_rewards = pool
        .total_rewards
        .checked_sub(amount_to_claim)
        .ok_or(StakingError::MathOverflow)?;
    let total_claimed = pool
        .total_claimed
        .checked_add(amount_to_claim)
        .ok_or(StakingError::MathOverflow)?;

    user.shares = user_shares;
    user.claimed_rewards = user_claimed;
    pool.total_shares = total_shares;
    pool.total_rewards = total_rewards;
    pool.total_claimed = total_claimed;
    Ok(amount_to_claim)
}

/// Withdraw up to `amount` of principal, burning shares at the current
/// exchange rate.
///
/// Deliberately does not harvest first: the conversion uses the rate as
/// of the last interaction, reproducing the source behavior (see
/// DESIGN.md). Returns the actual amount redeemed.
pub fn unstake(pool: &mut StakePool, user: &mut UserStake, amount: u64, _now: i64) -> Result<u64> {
    require!(user.staked_amount > 0, StakingError::NothingStaked);

    let amount_to_unstake = amount.min(user.staked_amount);
    let pooled_assets = pool.pooled_assets().ok_or(StakingError::MathOverflow)?;
    let amount_in_shares = (amount_to_unstake as u128)
        .checked_mul(pool.total_shares)
        .ok_or(StakingError::MathOverflow)?
        .checked_div(pooled_assets as u128)
        .ok_or(StakingError::MathOverflow)?;

    user.shares = user
        .shares
        .checked_sub(amount_in_shares)
        .ok_or(StakingError::MathOverflow)?;
    user.staked_amount -= amount_to_unstake;
    pool.total_shares = pool
        .total_shares
        .checked_sub(amount_in_shares)
        .ok_or(StakingError::MathOverflow)?;
    pool.total_staked = pool
        .total_staked
        .checked_sub(amount_to_unstake)
        .ok_or(StakingError::MathOverflow)?;
    Ok(amount_to_unstake)
}

/// Read-only view of a position's claimable rewards at `now`, including
/// the not-yet-harvested emission. Mutates nothing.
pub fn claimable(pool: &StakePool, user: &UserStake, now: i64) -> Result<u64> {
    if pool.total_shares == 0 {
        return Ok(0);
    }
    let pending = if pool.total_shares > 0 && now > pool.last_update_time {
        emission::rewards_emitted(
            pool.emission_per_second,
            pool.last_update_time,
            pool.end_time,
            now,
        )?
    } else {
        0
    };
    let pooled_assets = pool
        .pooled_assets()
        .ok_or(StakingError::MathOverflow)?
        .checked_add(pending)
        .ok_or(StakingError::MathOverflow)?;
    let user_total_assets = u64::try_from(
        user.shares
            .checked_mul(pooled_assets as u128)
            .ok_or(StakingError::MathOverflow)?
            .checked_div(pool.total_shares)
            .ok_or(StakingError::MathOverflow)?,
    )
    .map_err(|_| StakingError::MathOverflow)?;
    Ok(user_total_assets.saturating_sub(user.staked_amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EngineKind;

    // 0.1-token base unit: keeps aggregate pool totals well inside u64
    // at 18-decimal reward precision.
    const UNIT: u64 = 100_000_000_000_000_000;

    fn share_pool(start: i64, duration: i64, total_reward: u64) -> StakePool {
        StakePool {
            engine: EngineKind::Share,
            is_set_up: true,
            start_time: start,
            end_time: start + duration,
            emission_per_second: total_reward / duration as u64,
            last_update_time: start,
            ..Default::default()
        }
    }

    /// Share pool, 12 tokens over 12s from t=1. First staker joins at
    /// t=2 (one token forgone); second at t=12 at exchange rate 2.
    #[test]
    fn two_phase_deposit_with_forgone_first_second() {
        let mut pool = share_pool(1, 12, 12 * UNIT);
        let mut alice = UserStake::default();
        let mut bob = UserStake::default();

        let minted = stake(&mut pool, &mut alice, 10 * UNIT, 2).unwrap();
        assert_eq!(minted, 10 * UNIT as u128); // 1:1 seed
        assert_eq!(pool.rewards_forgone, UNIT);
        assert_eq!(pool.total_rewards_harvested, UNIT);
        assert_eq!(pool.total_rewards, 0);

        let minted = stake(&mut pool, &mut bob, 10 * UNIT, 12).unwrap();
        // 20 units of assets over 10 units of shares: rate 2, so 5 units of shares.
        assert_eq!(pool.exchange_rate(), Some(2 * crate::constants::WAD));
        assert_eq!(minted, 5 * UNIT as u128);

        // At t=13 the final token has been emitted (end_time = 13).
        assert_eq!(claimable(&pool, &alice, 13).unwrap(), 1_066_666_666_666_666_666);
        assert_eq!(claimable(&pool, &bob, 13).unwrap(), 33_333_333_333_333_333);

        let claimed_a = claim(&mut pool, &mut alice, u64::MAX, 13).unwrap();
        assert_eq!(claimed_a, 1_066_666_666_666_666_666);
        assert_eq!(pool.total_rewards_harvested, 12 * UNIT);

        // Harvested splits into attributed + forgone; only the forgone
        // token never became claimable.
        assert_eq!(
            pool.total_rewards_harvested - pool.total_claimed - pool.total_rewards,
            pool.rewards_forgone
        );
        assert_eq!(pool.rewards_forgone, UNIT);
    }

    #[test]
    fn claim_with_no_accrual_fails() {
        let mut pool = share_pool(1, 12, 12 * UNIT);
        let mut alice = UserStake::default();
        stake(&mut pool, &mut alice, 10 * UNIT, 1).unwrap();

        let err = claim(&mut pool, &mut alice, u64::MAX, 1).unwrap_err();
        assert_eq!(err, StakingError::NoRewards.into());

        // Two claims at the same timestamp: the second finds nothing new.
        claim(&mut pool, &mut alice, u64::MAX, 5).unwrap();
        let err = claim(&mut pool, &mut alice, u64::MAX, 5).unwrap_err();
        assert_eq!(err, StakingError::NoRewards.into());
    }

    #[test]
    fn harvest_is_idempotent_within_an_instant() {
        let mut pool = share_pool(1, 12, 12 * UNIT);
        let mut alice = UserStake::default();
        stake(&mut pool, &mut alice, 10 * UNIT, 1).unwrap();

        assert_eq!(harvest(&mut pool, 5).unwrap(), 4 * UNIT);
        let snapshot = (
            pool.total_rewards,
            pool.total_rewards_harvested,
            pool.last_update_time,
        );
        assert_eq!(harvest(&mut pool, 5).unwrap(), 0);
        assert_eq!(
            snapshot,
            (
                pool.total_rewards,
                pool.total_rewards_harvested,
                pool.last_update_time,
            )
        );
    }

    #[test]
    fn harvest_clamps_to_end_time() {
        let mut pool = share_pool(1, 12, 12 * UNIT);
        let mut alice = UserStake::default();
        stake(&mut pool, &mut alice, 10 * UNIT, 1).unwrap();

        assert_eq!(harvest(&mut pool, 100).unwrap(), 12 * UNIT);
        assert_eq!(pool.last_update_time, 13);
        assert_eq!(harvest(&mut pool, 200).unwrap(), 0);
        assert_eq!(pool.last_update_time, 13);
    }

    /// Unstake converts at the stale (pre-harvest) rate on purpose; the
    /// skipped interval is picked up by the next harvest.
    #[test]
    fn unstake_uses_rate_of_last_interaction() {
        let mut pool = share_pool(1, 12, 12 * UNIT);
        let mut alice = UserStake::default();
        stake(&mut pool, &mut alice, 10 * UNIT, 1).unwrap();

        // Rate is still 1:1 because nothing was harvested since t=1.
        let redeemed = unstake(&mut pool, &mut alice, 4 * UNIT, 5).unwrap();
        assert_eq!(redeemed, 4 * UNIT);
        assert_eq!(alice.shares, 6 * UNIT as u128);
        assert_eq!(pool.last_update_time, 1);

        // The t=1..5 emission is still credited by the next harvest.
        assert_eq!(harvest(&mut pool, 5).unwrap(), 4 * UNIT);
        assert_eq!(pool.total_rewards, 4 * UNIT);
    }

    #[test]
    fn full_exit_keeps_unclaimed_rewards_claimable() {
        let mut pool = share_pool(1, 12, 12 * UNIT);
        let mut alice = UserStake::default();
        stake(&mut pool, &mut alice, 10 * UNIT, 1).unwrap();

        harvest(&mut pool, 6).unwrap(); // 5 units attributed
        let redeemed = unstake(&mut pool, &mut alice, u64::MAX, 6).unwrap();
        assert_eq!(redeemed, 10 * UNIT);
        assert_eq!(alice.staked_amount, 0);
        assert!(alice.shares > 0); // reward value stays behind as shares

        let claimed = claim(&mut pool, &mut alice, u64::MAX, 6).unwrap();
        assert_eq!(claimed, 5 * UNIT);

        let err = unstake(&mut pool, &mut alice, 1, 7).unwrap_err();
        assert_eq!(err, StakingError::NothingStaked.into());
    }

    /// A full exit burns a floored share count, which can leave the
    /// exited position holding share value one truncation unit above the
    /// attributed-rewards bucket. A follow-up claim-all must settle at
    /// the bucket, not fail, and the harvested split must survive.
    #[test]
    fn claim_after_full_exit_is_capped_at_attributed_rewards() {
        let mut pool = share_pool(1, 12, 12 * UNIT);
        let mut alice = UserStake::default();
        let mut bob = UserStake::default();
        let deposit = UNIT / 10;

        stake(&mut pool, &mut bob, deposit, 1).unwrap();
        stake(&mut pool, &mut alice, deposit, 2).unwrap(); // harvests 1 unit
        unstake(&mut pool, &mut bob, u64::MAX, 2).unwrap();
        stake(&mut pool, &mut alice, deposit, 2).unwrap();

        // Bob's residual shares are worth one dust unit more than the
        // bucket holds.
        assert_eq!(user_assets(&pool, &bob).unwrap(), UNIT + 1);
        assert_eq!(pool.total_rewards, UNIT);

        let claimed = claim(&mut pool, &mut bob, u64::MAX, 2).unwrap();
        assert_eq!(claimed, UNIT);
        assert_eq!(pool.total_rewards, 0);
        assert_eq!(bob.shares, 1); // dust share stays behind

        assert_eq!(
            pool.total_rewards_harvested,
            pool.total_claimed + pool.total_rewards + pool.rewards_forgone
        );

        // With the bucket empty the dust share is not claimable.
        let err = claim(&mut pool, &mut bob, u64::MAX, 2).unwrap_err();
        assert_eq!(err, StakingError::NoRewards.into());
    }
}
