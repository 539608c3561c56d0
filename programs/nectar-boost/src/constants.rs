// =============================================================================
// NECTAR Boost Constants
// =============================================================================

// PDA Seeds
pub const BOOST_POOL_SEED: &[u8] = b"boost_pool";
pub const BOOST_REWARD_VAULT_SEED: &[u8] = b"boost_reward_vault";
pub const BOOST_STAKE_SEED: &[u8] = b"boost_stake";

// Precision for reward calculations (18 decimals)
// Using u128 to handle large numbers without overflow
pub const REWARD_PRECISION: u128 = 1_000_000_000_000_000_000; // 10^18

// Safety limits
pub const MIN_STAKE_AMOUNT: u64 = 1;
pub const MIN_FUND_AMOUNT: u64 = 1_000;
pub const MAX_FUND_DURATION_SECONDS: i64 = 365 * 24 * 60 * 60; // one year
