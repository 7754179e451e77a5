use anchor_lang::prelude::*;

use crate::constants::WAD;

/// Which accrual engine a pool runs.
///
/// Index pools carry a cumulative asset index and per-user index
/// snapshots; share pools represent positions as shares against the
/// pooled asset value (principal + unclaimed rewards).
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum EngineKind {
    /// Additive reward-per-staked-unit index.
    #[default]
    LinearIndex,
    /// Multiplicative compounding index; unclaimed rewards are folded
    /// into the staking denominator.
    CompoundIndex,
    /// Vault-style exchange rate (assets per share).
    Share,
}

#[account]
#[derive(Default)]
pub struct StakePool {
    pub authority: Pubkey,
    pub staking_mint: Pubkey,
    pub reward_mint: Pubkey,
    pub staking_vault: Pubkey,
    pub reward_vault: Pubkey,

    pub engine: EngineKind,
    pub is_set_up: bool,
    pub start_time: i64,
    pub end_time: i64,
    pub emission_per_second: u64,

    /// Cumulative index, WAD-scaled. 0 for linear pools at setup,
    /// WAD for compounding pools.
    pub asset_index: u128,
    /// Last time accounting was advanced; never exceeds `end_time`.
    pub last_update_time: i64,
    /// Sum of all staked principal.
    pub total_staked: u64,
    /// Compounding pools only: rewards emitted but not yet claimed,
    /// counted as part of the staking denominator.
    pub total_rewards_staked: u64,

    /// Share pools: total shares outstanding.
    pub total_shares: u128,
    /// Share pools: unclaimed rewards attributed to stakers.
    pub total_rewards: u64,
    /// Share pools: lifetime emitted rewards, forgone included. Monotonic.
    pub total_rewards_harvested: u64,

    /// Emission that fell in periods with no stakers. Audit only, never
    /// claimable.
    pub rewards_forgone: u64,
    /// Lifetime rewards paid out across all users.
    pub total_claimed: u64,
    pub staker_count: u64,

    pub bump: u8,
    pub staking_vault_bump: u8,
    pub reward_vault_bump: u8,
}

impl StakePool {
    pub const LEN: usize = 8
        + (32 * 5)
        + 1 + 1 + 8 + 8 + 8
        + 16 + 8 + 8 + 8
        + 16 + 8 + 8
        + 8 + 8 + 8
        + 3;

    pub fn is_compounding(&self) -> bool {
        self.engine == EngineKind::CompoundIndex
    }

    /// Pooled asset value backing shares: principal plus unclaimed rewards.
    pub fn pooled_assets(&self) -> Option<u64> {
        self.total_rewards.checked_add(self.total_staked)
    }

    /// Share-pool exchange rate (assets per share), WAD-scaled.
    /// `None` while no shares exist.
    pub fn exchange_rate(&self) -> Option<u128> {
        if self.total_shares == 0 {
            return None;
        }
        (self.pooled_assets()? as u128)
            .checked_mul(WAD)?
            .checked_div(self.total_shares)
    }

    /// Reward budget not yet emitted at `now`.
    pub fn emission_remaining(&self, now: i64) -> u64 {
        if !self.is_set_up || now >= self.end_time {
            return 0;
        }
        let from = now.max(self.start_time);
        let remaining_secs = self.end_time.saturating_sub(from) as u64;
        self.emission_per_second.saturating_mul(remaining_secs)
    }
}
