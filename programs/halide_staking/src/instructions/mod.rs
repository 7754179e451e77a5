//! Instruction handlers for the Halide Staking program.

pub mod admin;
pub mod claim;
pub mod fund_rewards;
pub mod initialize;
pub mod recover;
pub mod set_up;
pub mod stake;
pub mod unstake;

pub use admin::*;
pub use claim::*;
pub use fund_rewards::*;
pub use initialize::*;
pub use recover::*;
pub use set_up::*;
pub use stake::*;
pub use unstake::*;
