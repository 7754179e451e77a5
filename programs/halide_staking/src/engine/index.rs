//! Index Engine accrual.
//!
//! The pool carries a cumulative asset index: reward-per-staked-unit for
//! linear pools, a compounding multiplier for auto-compounding pools.
//! Each position snapshots the index at its last interaction; the delta
//! between the current index and the snapshot, applied to the position's
//! principal, yields the rewards accrued since then. Deltas are booked
//! into `accrued_rewards` on every state-changing interaction.

use anchor_lang::prelude::*;

use crate::constants::WAD;
use crate::engine::emission;
use crate::error::StakingError;
use crate::state::{EngineKind, StakePool, UserStake};

/// Outcome of advancing the asset index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexUpdate {
    pub old_index: u128,
    pub new_index: u128,
    /// Emission attributed to stakers for the consumed interval.
    pub emitted: u64,
}

/// The staking denominator for the next interval. Compounding pools fold
/// unclaimed rewards into the principal, since they keep earning.
pub fn staked_for_period(pool: &StakePool) -> u64 {
    if pool.is_compounding() {
        pool.total_staked.saturating_add(pool.total_rewards_staked)
    } else {
        pool.total_staked
    }
}

/// Advance the asset index to `now`, consuming the interval since the
/// last update.
///
/// With nothing staked the interval's emission is forgone: it is counted
/// in `rewards_forgone`, the index does not move, and the interval is
/// still consumed so it can never be re-emitted.
pub fn update_asset_index(
    pool: &mut StakePool,
    total_staked_for_period: u64,
    now: i64,
) -> Result<IndexUpdate> {
    let old_index = pool.asset_index;
    if now <= pool.last_update_time {
        return Ok(IndexUpdate {
            old_index,
            new_index: old_index,
            emitted: 0,
        });
    }

    let emitted = emission::rewards_emitted(
        pool.emission_per_second,
        pool.last_update_time,
        pool.end_time,
        now,
    )?;
    pool.last_update_time = emission::clamp_to_end(now, pool.end_time);

    if emitted == 0 {
        return Ok(IndexUpdate {
            old_index,
            new_index: old_index,
            emitted: 0,
        });
    }

    if total_staked_for_period == 0 {
        pool.rewards_forgone = pool
            .rewards_forgone
            .checked_add(emitted)
            .ok_or(StakingError::MathOverflow)?;
        return Ok(IndexUpdate {
            old_index,
            new_index: old_index,
            emitted: 0,
        });
    }

    let emission_per_share = (emitted as u128)
        .checked_mul(WAD)
        .ok_or(StakingError::MathOverflow)?
        .checked_div(total_staked_for_period as u128)
        .ok_or(StakingError::MathOverflow)?;

    let new_index = match pool.engine {
        EngineKind::LinearIndex => old_index
            .checked_add(emission_per_share)
            .ok_or(StakingError::MathOverflow)?,
        EngineKind::CompoundIndex => {
            // The +WAD term keeps the principal component in the
            // multiplier; without it the index would decay toward zero.
            pool.total_rewards_staked = pool
                .total_rewards_staked
                .checked_add(emitted)
                .ok_or(StakingError::MathOverflow)?;
            old_index
                .checked_mul(
                    emission_per_share
                        .checked_add(WAD)
                        .ok_or(StakingError::MathOverflow)?,
                )
                .ok_or(StakingError::MathOverflow)?
                .checked_div(WAD)
                .ok_or(StakingError::MathOverflow)?
        }
        EngineKind::Share => return Err(StakingError::EngineMismatch.into()),
    };

    pool.asset_index = new_index;
    Ok(IndexUpdate {
        old_index,
        new_index,
        emitted,
    })
}

/// Advance the asset index and the user's snapshot, returning rewards
/// accrued since the user's last interaction but not yet booked.
///
/// The snapshot is always overwritten when the indices differ, even for
/// a zero-balance position, so a later interaction cannot claim rewards
/// for a period the position held nothing.
pub fn update_user_index(pool: &mut StakePool, user: &mut UserStake, now: i64) -> Result<u64> {
    let total_staked_for_period = staked_for_period(pool);
    let update = update_asset_index(pool, total_staked_for_period, now)?;
    let new_index = update.new_index;

    if user.user_index == new_index {
        return Ok(0);
    }

    let unbooked = match pool.engine {
        EngineKind::LinearIndex => {
            let delta = new_index
                .checked_sub(user.user_index)
                .ok_or(StakingError::MathOverflow)?;
            let raw = (user.staked_amount as u128)
                .checked_mul(delta)
                .ok_or(StakingError::MathOverflow)?
                .checked_div(WAD)
                .ok_or(StakingError::MathOverflow)?;
            u64::try_from(raw).map_err(|_| StakingError::MathOverflow)?
        }
        EngineKind::CompoundIndex => {
            if user.user_index == 0 {
                // First touch: seed the snapshot, nothing accrued yet.
                0
            } else {
                // P * ((index / user_index) - 1), collapsed compound
                // interest over the index ratio.
                let ratio = new_index
                    .checked_mul(WAD)
                    .ok_or(StakingError::MathOverflow)?
                    .checked_div(user.user_index)
                    .ok_or(StakingError::MathOverflow)?;
                let growth = ratio.saturating_sub(WAD);
                let raw = (user.staked_amount as u128)
                    .checked_mul(growth)
                    .ok_or(StakingError::MathOverflow)?
                    .checked_div(WAD)
                    .ok_or(StakingError::MathOverflow)?;
                u64::try_from(raw).map_err(|_| StakingError::MathOverflow)?
            }
        }
        EngineKind::Share => return Err(StakingError::EngineMismatch.into()),
    };

    user.user_index = new_index;
    Ok(unbooked)
}

/// Book outstanding accrual, then add `amount` of principal.
pub fn stake(pool: &mut StakePool, user: &mut UserStake, amount: u64, now: i64) -> Result<u64> {
    let unbooked = update_user_index(pool, user, now)?;
    user.accrued_rewards = user
        .accrued_rewards
        .checked_add(unbooked)
        .ok_or(StakingError::MathOverflow)?;
    user.staked_amount = user
        .staked_amount
        .checked_add(amount)
        .ok_or(StakingError::MathOverflow)?;
    pool.total_staked = pool
        .total_staked
        .checked_add(amount)
        .ok_or(StakingError::MathOverflow)?;
    Ok(unbooked)
}

/// Book outstanding accrual and pay out up to `amount` of it.
///
/// Returns the actual amount claimed (capped at the claimable total).
pub fn claim(pool: &mut StakePool, user: &mut UserStake, amount: u64, now: i64) -> Result<u64> {
    let unbooked = update_user_index(pool, user, now)?;
    user.accrued_rewards = user
        .accrued_rewards
        .checked_add(unbooked)
        .ok_or(StakingError::MathOverflow)?;

    let claimable = user.accrued_rewards;
    require!(claimable > 0, StakingError::NoRewards);

    let amount_to_claim = amount.min(claimable);
    user.accrued_rewards = claimable - amount_to_claim;
    user.claimed_rewards = user
        .claimed_rewards
        .checked_add(amount_to_claim)
        .ok_or(StakingError::MathOverflow)?;
    if pool.is_compounding() {
        // Truncation keeps every user total under the raw emitted sum;
        // saturate against the resulting dust.
        pool.total_rewards_staked = pool.total_rewards_staked.saturating_sub(amount_to_claim);
    }
    pool.total_claimed = pool
        .total_claimed
        .checked_add(amount_to_claim)
        .ok_or(StakingError::MathOverflow)?;
    Ok(amount_to_claim)
}

/// Book outstanding accrual, then withdraw up to `amount` of principal.
///
/// Returns the actual amount redeemed (capped at the principal).
pub fn unstake(pool: &mut StakePool, user: &mut UserStake, amount: u64, now: i64) -> Result<u64> {
    require!(user.staked_amount > 0, StakingError::NothingStaked);

    let unbooked = update_user_index(pool, user, now)?;
    user.accrued_rewards = user
        .accrued_rewards
        .checked_add(unbooked)
        .ok_or(StakingError::MathOverflow)?;

    let amount_to_redeem = amount.min(user.staked_amount);
    user.staked_amount -= amount_to_redeem;
    pool.total_staked = pool
        .total_staked
        .checked_sub(amount_to_redeem)
        .ok_or(StakingError::MathOverflow)?;
    Ok(amount_to_redeem)
}

/// Read-only view of a position's claimable rewards at `now`, booked and
/// unbooked combined. Projects the index without mutating anything.
pub fn pending_rewards(pool: &StakePool, user: &UserStake, now: i64) -> Result<u64> {
    let total_staked_for_period = staked_for_period(pool);
    let mut projected = pool.asset_index;

    if now > pool.last_update_time && total_staked_for_period > 0 {
        let emitted = emission::rewards_emitted(
            pool.emission_per_second,
            pool.last_update_time,
            pool.end_time,
            now,
        )?;
        if emitted > 0 {
            let emission_per_share = (emitted as u128)
                .checked_mul(WAD)
                .ok_or(StakingError::MathOverflow)?
                .checked_div(total_staked_for_period as u128)
                .ok_or(StakingError::MathOverflow)?;
            projected = match pool.engine {
                EngineKind::LinearIndex => projected
                    .checked_add(emission_per_share)
                    .ok_or(StakingError::MathOverflow)?,
                EngineKind::CompoundIndex => projected
                    .checked_mul(
                        emission_per_share
                            .checked_add(WAD)
                            .ok_or(StakingError::MathOverflow)?,
                    )
                    .ok_or(StakingError::MathOverflow)?
                    .checked_div(WAD)
                    .ok_or(StakingError::MathOverflow)?,
                EngineKind::Share => return Err(StakingError::EngineMismatch.into()),
            };
        }
    }

    let unbooked = match pool.engine {
        EngineKind::LinearIndex => {
            let delta = projected.saturating_sub(user.user_index);
            let raw = (user.staked_amount as u128)
                .checked_mul(delta)
                .ok_or(StakingError::MathOverflow)?
                .checked_div(WAD)
                .ok_or(StakingError::MathOverflow)?;
            u64::try_from(raw).map_err(|_| StakingError::MathOverflow)?
        }
        EngineKind::CompoundIndex => {
            if user.user_index == 0 {
                0
            } else {
                let ratio = projected
                    .checked_mul(WAD)
                    .ok_or(StakingError::MathOverflow)?
                    .checked_div(user.user_index)
                    .ok_or(StakingError::MathOverflow)?;
                let growth = ratio.saturating_sub(WAD);
                let raw = (user.staked_amount as u128)
                    .checked_mul(growth)
                    .ok_or(StakingError::MathOverflow)?
                    .checked_div(WAD)
                    .ok_or(StakingError::MathOverflow)?;
                u64::try_from(raw).map_err(|_| StakingError::MathOverflow)?
            }
        }
        EngineKind::Share => return Err(StakingError::EngineMismatch.into()),
    };

    user.accrued_rewards
        .checked_add(unbooked)
        .ok_or_else(|| StakingError::MathOverflow.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 0.1-token base unit: 18-decimal scenario quantities with aggregate
    // stakes that stay inside u64.
    const UNIT: u64 = 100_000_000_000_000_000;

    fn linear_pool(start: i64, duration: i64, total_reward: u64) -> StakePool {
        StakePool {
            engine: EngineKind::LinearIndex,
            is_set_up: true,
            start_time: start,
            end_time: start + duration,
            emission_per_second: total_reward / duration as u64,
            last_update_time: start,
            asset_index: 0,
            ..Default::default()
        }
    }

    fn compound_pool(start: i64, duration: i64, total_reward: u64) -> StakePool {
        StakePool {
            engine: EngineKind::CompoundIndex,
            asset_index: WAD,
            ..linear_pool(start, duration, total_reward)
        }
    }

    /// Linear pool, 10 units over 10s, two stakers of 50/30 from t=1.
    /// At t=10 nine units have been emitted over 80 staked.
    #[test]
    fn linear_two_stakers_split_pro_rata() {
        let mut pool = linear_pool(1, 10, 10 * UNIT);
        let mut alice = UserStake::default();
        let mut bob = UserStake::default();

        stake(&mut pool, &mut alice, 50 * UNIT, 1).unwrap();
        stake(&mut pool, &mut bob, 30 * UNIT, 1).unwrap();

        let claimed_a = claim(&mut pool, &mut alice, u64::MAX, 10).unwrap();
        assert_eq!(pool.asset_index, 112_500_000_000_000_000); // 9 emitted / 80 staked
        assert_eq!(claimed_a, 562_500_000_000_000_000);

        let claimed_b = claim(&mut pool, &mut bob, u64::MAX, 10).unwrap();
        assert_eq!(claimed_b, 337_500_000_000_000_000);

        assert_eq!(claimed_a + claimed_b, 9 * UNIT);
        assert_eq!(pool.total_claimed, 9 * UNIT);
    }

    /// Compounding pool, 10 units over 10s. 50/30 stakers from t=1, a
    /// third staker of 80 joins at t=10, final second split over the
    /// compounded denominator (160 principal + 9 unclaimed rewards).
    #[test]
    fn compound_third_staker_joins_after_accrual() {
        let mut pool = compound_pool(1, 10, 10 * UNIT);
        let mut alice = UserStake::default();
        let mut bob = UserStake::default();
        let mut carol = UserStake::default();

        stake(&mut pool, &mut alice, 50 * UNIT, 1).unwrap();
        stake(&mut pool, &mut bob, 30 * UNIT, 1).unwrap();
        assert_eq!(alice.user_index, WAD);

        stake(&mut pool, &mut carol, 80 * UNIT, 10).unwrap();
        // reward-per-staked-unit over t=1..10 is 9/80 = 0.1125
        assert_eq!(pool.asset_index, 1_112_500_000_000_000_000);
        assert_eq!(pool.total_rewards_staked, 9 * UNIT);
        assert_eq!(carol.user_index, pool.asset_index);
        assert_eq!(carol.accrued_rewards, 0);

        // Final second: denominator is 160 principal + 9 unclaimed.
        assert_eq!(staked_for_period(&pool), 169 * UNIT);

        let claimed_a = claim(&mut pool, &mut alice, u64::MAX, 11).unwrap();
        assert_eq!(pool.asset_index, 1_119_082_840_236_686_390);
        assert_eq!(claimed_a, 595_414_201_183_431_950);

        let claimed_b = claim(&mut pool, &mut bob, u64::MAX, 11).unwrap();
        assert_eq!(claimed_b, 357_248_520_710_059_170);

        let claimed_c = claim(&mut pool, &mut carol, u64::MAX, 11).unwrap();
        assert_eq!(claimed_c, 47_337_278_106_508_864);

        // Conservation up to truncation dust.
        let total = claimed_a + claimed_b + claimed_c;
        assert!(total <= 10 * UNIT);
        assert!(10 * UNIT - total < 1_000);
    }

    #[test]
    fn second_claim_in_same_instant_finds_no_rewards() {
        let mut pool = linear_pool(1, 10, 10 * UNIT);
        let mut alice = UserStake::default();
        stake(&mut pool, &mut alice, 50 * UNIT, 1).unwrap();

        claim(&mut pool, &mut alice, u64::MAX, 5).unwrap();
        let err = claim(&mut pool, &mut alice, u64::MAX, 5).unwrap_err();
        assert_eq!(err, StakingError::NoRewards.into());
    }

    #[test]
    fn noop_update_is_idempotent() {
        let mut pool = linear_pool(1, 10, 10 * UNIT);
        let mut alice = UserStake::default();
        stake(&mut pool, &mut alice, 50 * UNIT, 1).unwrap();

        let staked = staked_for_period(&pool);
        let first = update_asset_index(&mut pool, staked, 6).unwrap();
        let snapshot = (pool.asset_index, pool.last_update_time, pool.total_staked);
        let staked = staked_for_period(&pool);
        let second = update_asset_index(&mut pool, staked, 6).unwrap();
        assert_eq!(second.old_index, first.new_index);
        assert_eq!(second.new_index, first.new_index);
        assert_eq!(second.emitted, 0);
        assert_eq!(
            snapshot,
            (pool.asset_index, pool.last_update_time, pool.total_staked)
        );
    }

    #[test]
    fn emission_with_no_stakers_is_forgone() {
        let mut pool = linear_pool(1, 10, 10 * UNIT);
        let mut alice = UserStake::default();

        // Nobody staked for the first 4 seconds.
        stake(&mut pool, &mut alice, 50 * UNIT, 5).unwrap();
        assert_eq!(pool.rewards_forgone, 4 * UNIT);
        assert_eq!(pool.asset_index, 0);

        // The forgone interval never becomes claimable.
        let claimed = claim(&mut pool, &mut alice, u64::MAX, 11).unwrap();
        assert_eq!(claimed, 6 * UNIT);
        assert_eq!(pool.rewards_forgone, 4 * UNIT);
    }

    #[test]
    fn staking_at_or_after_end_accrues_nothing() {
        let mut pool = linear_pool(1, 10, 10 * UNIT);
        let mut alice = UserStake::default();
        let mut late = UserStake::default();

        stake(&mut pool, &mut alice, 50 * UNIT, 1).unwrap();
        stake(&mut pool, &mut late, 50 * UNIT, 11).unwrap();
        assert_eq!(pool.last_update_time, 11);

        stake(&mut pool, &mut late, 1, 20).unwrap();
        assert_eq!(pool.last_update_time, 11); // clamped at end_time
        assert_eq!(pending_rewards(&pool, &late, 25).unwrap(), 0);

        // The early staker keeps the full window's rewards.
        assert_eq!(pending_rewards(&pool, &alice, 25).unwrap(), 10 * UNIT);
    }

    #[test]
    fn partial_claim_is_capped_and_booked() {
        let mut pool = linear_pool(1, 10, 10 * UNIT);
        let mut alice = UserStake::default();
        stake(&mut pool, &mut alice, 50 * UNIT, 1).unwrap();

        let claimed = claim(&mut pool, &mut alice, UNIT, 6).unwrap();
        assert_eq!(claimed, UNIT);
        assert_eq!(alice.accrued_rewards, 4 * UNIT);
        assert_eq!(alice.claimed_rewards, UNIT);

        // Asking for more than is claimable caps at the accrued total.
        let claimed = claim(&mut pool, &mut alice, 100 * UNIT, 6).unwrap();
        assert_eq!(claimed, 4 * UNIT);
    }

    #[test]
    fn unstake_books_rewards_before_exit() {
        let mut pool = linear_pool(1, 10, 10 * UNIT);
        let mut alice = UserStake::default();
        stake(&mut pool, &mut alice, 50 * UNIT, 1).unwrap();

        let redeemed = unstake(&mut pool, &mut alice, u64::MAX, 6).unwrap();
        assert_eq!(redeemed, 50 * UNIT);
        assert_eq!(alice.staked_amount, 0);
        assert_eq!(alice.accrued_rewards, 5 * UNIT);

        // Rewards survive the exit and remain claimable.
        let claimed = claim(&mut pool, &mut alice, u64::MAX, 8).unwrap();
        assert_eq!(claimed, 5 * UNIT);

        let err = unstake(&mut pool, &mut alice, 1, 8).unwrap_err();
        assert_eq!(err, StakingError::NothingStaked.into());
    }

    #[test]
    fn zero_balance_interaction_moves_the_snapshot() {
        let mut pool = linear_pool(1, 10, 10 * UNIT);
        let mut alice = UserStake::default();
        let mut bob = UserStake::default();
        stake(&mut pool, &mut alice, 50 * UNIT, 1).unwrap();

        // Bob interacts at t=6 with nothing staked, then stakes at t=8.
        let unbooked = update_user_index(&mut pool, &mut bob, 6).unwrap();
        assert_eq!(unbooked, 0);
        assert_eq!(bob.user_index, pool.asset_index);

        stake(&mut pool, &mut bob, 50 * UNIT, 8).unwrap();
        // Bob only earns from t=8 on: half of the 2 units emitted over t=8..10.
        assert_eq!(pending_rewards(&pool, &bob, 10).unwrap(), UNIT);
    }
}
