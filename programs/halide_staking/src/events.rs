//! Events emitted by the Halide Staking program.

use anchor_lang::prelude::*;

use crate::state::EngineKind;

#[event]
pub struct PoolInitialized {
    pub pool: Pubkey,
    pub authority: Pubkey,
    pub staking_mint: Pubkey,
    pub reward_mint: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct PoolConfigured {
    pub pool: Pubkey,
    pub engine: EngineKind,
    pub start_time: i64,
    pub end_time: i64,
    pub emission_per_second: u64,
    pub timestamp: i64,
}

#[event]
pub struct AssetIndexUpdated {
    pub pool: Pubkey,
    pub old_index: u128,
    pub new_index: u128,
    pub timestamp: i64,
}

#[event]
pub struct RewardsHarvested {
    pub pool: Pubkey,
    pub amount: u64,
    pub total_rewards: u64,
    pub total_rewards_harvested: u64,
    pub timestamp: i64,
}

#[event]
pub struct Staked {
    pub pool: Pubkey,
    pub beneficiary: Pubkey,
    pub amount: u64,
    pub total_staked: u64,
    pub timestamp: i64,
}

#[event]
pub struct RewardsClaimed {
    pub pool: Pubkey,
    pub user: Pubkey,
    pub recipient: Pubkey,
    pub amount: u64,
    pub total_claimed_by_user: u64,
    pub timestamp: i64,
}

#[event]
pub struct Unstaked {
    pub pool: Pubkey,
    pub user: Pubkey,
    pub recipient: Pubkey,
    pub amount: u64,
    pub remaining_staked: u64,
    pub timestamp: i64,
}

#[event]
pub struct RewardsFunded {
    pub pool: Pubkey,
    pub funder: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct RewardsRecovered {
    pub pool: Pubkey,
    pub authority: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct AuthorityTransferred {
    pub pool: Pubkey,
    pub old_authority: Pubkey,
    pub new_authority: Pubkey,
    pub timestamp: i64,
}
