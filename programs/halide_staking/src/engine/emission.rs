//! Shared time-based emission primitive.
//!
//! Both engines meter rewards the same way: elapsed seconds since the
//! last accounting update, capped at the distribution end, times the
//! fixed emission rate. Callers must advance `last_update_time` in the
//! same logical update that consumes an interval, so no interval is ever
//! emitted twice.

use anchor_lang::prelude::*;

use crate::error::StakingError;

/// Rewards emitted over `(last_update_time, min(now, end_time)]`.
///
/// Zero when the distribution is over (`last_update_time >= end_time`)
/// or no time has elapsed (`now <= last_update_time`).
pub fn rewards_emitted(
    emission_per_second: u64,
    last_update_time: i64,
    end_time: i64,
    now: i64,
) -> Result<u64> {
    if last_update_time >= end_time || now <= last_update_time {
        return Ok(0);
    }
    let until = now.min(end_time);
    let elapsed =
        u64::try_from(until - last_update_time).map_err(|_| StakingError::MathOverflow)?;
    let emitted = emission_per_second
        .checked_mul(elapsed)
        .ok_or(StakingError::MathOverflow)?;
    Ok(emitted)
}

/// The `last_update_time` value to store after consuming an interval
/// ending at `now`. Clamped so it never exceeds `end_time`.
pub fn clamp_to_end(now: i64, end_time: i64) -> i64 {
    now.min(end_time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meters_elapsed_seconds() {
        assert_eq!(rewards_emitted(5, 100, 200, 110).unwrap(), 50);
    }

    #[test]
    fn caps_at_distribution_end() {
        assert_eq!(rewards_emitted(5, 100, 200, 300).unwrap(), 500);
        assert_eq!(clamp_to_end(300, 200), 200);
    }

    #[test]
    fn zero_after_end_or_without_elapsed_time() {
        assert_eq!(rewards_emitted(5, 200, 200, 250).unwrap(), 0);
        assert_eq!(rewards_emitted(5, 210, 200, 250).unwrap(), 0);
        assert_eq!(rewards_emitted(5, 100, 200, 100).unwrap(), 0);
        assert_eq!(rewards_emitted(5, 100, 200, 90).unwrap(), 0);
    }

    #[test]
    fn overflow_is_reported() {
        assert!(rewards_emitted(u64::MAX, 0, i64::MAX, 3).is_err());
    }
}
