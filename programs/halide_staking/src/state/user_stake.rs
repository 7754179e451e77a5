use anchor_lang::prelude::*;

#[account]
#[derive(Default)]
pub struct UserStake {
    pub owner: Pubkey,
    pub stake_pool: Pubkey,

    /// Principal deposited and not yet withdrawn.
    pub staked_amount: u64,
    /// Asset-index snapshot from the user's last interaction.
    /// Zero means the position has never touched a compounding index.
    pub user_index: u128,
    /// Booked, claimable rewards. Only ever decremented by a claim.
    pub accrued_rewards: u64,
    /// Lifetime claimed rewards, audit only.
    pub claimed_rewards: u64,
    /// Share pools: the user's share count.
    pub shares: u128,

    pub bump: u8,
}

impl UserStake {
    pub const LEN: usize = 8 + 32 + 32 + 8 + 16 + 8 + 8 + 16 + 1;
}
