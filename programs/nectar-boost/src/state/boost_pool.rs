use anchor_lang::prelude::*;

use crate::constants::REWARD_PRECISION;
use crate::error::BoostError;

/// Per-vault boost pool state
/// PDA: ["boost_pool", vault]
#[account]
#[derive(Default)]
pub struct BoostPool {
    /// Admin who can pause/unpause, fund and update settings
    pub admin: Pubkey,

    /// The NECTAR vault whose ledger shares are staked here
    pub vault: Pubkey,

    /// The pool's custody row on the vault's share ledger
    /// PDA of the vault program: ["holder", vault, boost_pool]
    pub custody_holder: Pubkey,

    /// Reward token mint
    pub reward_mint: Pubkey,

    /// Vault holding reward tokens to distribute
    /// PDA: ["boost_reward_vault", boost_pool]
    pub reward_vault: Pubkey,

    /// Total vault shares staked
    pub total_staked: u64,

    /// Reward base units emitted per second while the period runs
    pub reward_rate: u64,

    /// Unix timestamp the current reward period stops accruing
    pub period_end: i64,

    /// Accumulated rewards per staked share (scaled by REWARD_PRECISION).
    /// Advances lazily on every stake/unstake/claim/fund; monotonically
    /// non-decreasing.
    pub acc_reward_per_share: u128,

    /// Last time the accumulator advanced
    pub last_update_time: i64,

    /// Total rewards paid out (lifetime)
    pub total_rewards_paid: u64,

    /// Number of unique stakers
    pub staker_count: u64,

    /// Emergency pause flag
    pub is_paused: bool,

    /// PDA bump seed
    pub bump: u8,

    /// Reward vault bump seed
    pub reward_vault_bump: u8,
}

impl BoostPool {
    /// Account size for allocation
    pub const SIZE: usize = 8 + // discriminator
        32 + // admin
        32 + // vault
        32 + // custody_holder
        32 + // reward_mint
        32 + // reward_vault
        8 +  // total_staked
        8 +  // reward_rate
        8 +  // period_end
        16 + // acc_reward_per_share (u128)
        8 +  // last_update_time
        8 +  // total_rewards_paid
        8 +  // staker_count
        1 +  // is_paused
        1 +  // bump
        1 +  // reward_vault_bump
        64;  // padding for future fields

    /// Advance the accumulator to `now`, clamped to the funded period.
    /// Formula: acc += elapsed * reward_rate * PRECISION / total_staked.
    /// Time with zero stakers contributes nothing: the window is consumed
    /// without accrual so a later staker cannot claim it retroactively.
    pub fn update_accumulator(&mut self, now: i64) -> Result<()> {
        let until = now.min(self.period_end);
        if until <= self.last_update_time {
            return Ok(());
        }

        if self.total_staked == 0 {
            self.last_update_time = until;
            return Ok(());
        }

        let elapsed = until
            .checked_sub(self.last_update_time)
            .ok_or(BoostError::MathUnderflow)? as u128;

        let accrued = elapsed
            .checked_mul(self.reward_rate as u128)
            .ok_or(BoostError::MathOverflow)?
            .checked_mul(REWARD_PRECISION)
            .ok_or(BoostError::MathOverflow)?
            .checked_div(self.total_staked as u128)
            .ok_or(BoostError::DivisionByZero)?;

        self.acc_reward_per_share = self
            .acc_reward_per_share
            .checked_add(accrued)
            .ok_or(BoostError::MathOverflow)?;

        self.last_update_time = until;

        Ok(())
    }

    /// Re-derive the emission rate after a funding top-up: whatever is left
    /// of the running period rolls into the new one.
    pub fn fund_period(&mut self, amount: u64, duration: i64, now: i64) -> Result<u64> {
        let leftover = if now < self.period_end {
            let remaining = self
                .period_end
                .checked_sub(now)
                .ok_or(BoostError::MathUnderflow)? as u128;
            remaining
                .checked_mul(self.reward_rate as u128)
                .ok_or(BoostError::MathOverflow)?
        } else {
            0
        };

        let total = (amount as u128)
            .checked_add(leftover)
            .ok_or(BoostError::MathOverflow)?;
        let rate = total
            .checked_div(duration as u128)
            .ok_or(BoostError::DivisionByZero)?;

        self.reward_rate = u64::try_from(rate).map_err(|_| BoostError::MathOverflow)?;
        self.period_end = now.checked_add(duration).ok_or(BoostError::MathOverflow)?;
        self.last_update_time = now;

        Ok(self.reward_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(total_staked: u64, rate: u64) -> BoostPool {
        BoostPool {
            total_staked,
            reward_rate: rate,
            period_end: 10_000,
            acc_reward_per_share: 0,
            last_update_time: 1_000,
            ..Default::default()
        }
    }

    #[test]
    fn accumulator_advances_with_stakers() {
        let mut p = pool(500, 10);
        p.update_accumulator(1_100).unwrap();
        // 100s * 10/s spread over 500 shares = 2 per share
        assert_eq!(p.acc_reward_per_share, 2 * REWARD_PRECISION);
        assert_eq!(p.last_update_time, 1_100);
    }

    #[test]
    fn accumulator_monotone_between_updates() {
        let mut p = pool(500, 10);
        p.update_accumulator(1_100).unwrap();
        let first = p.acc_reward_per_share;
        p.update_accumulator(1_500).unwrap();
        assert!(p.acc_reward_per_share > first);
        // re-running at the same time adds nothing
        let snapshot = p.acc_reward_per_share;
        p.update_accumulator(1_500).unwrap();
        assert_eq!(p.acc_reward_per_share, snapshot);
    }

    #[test]
    fn zero_staked_time_accrues_nothing() {
        let mut p = pool(0, 10);
        p.update_accumulator(5_000).unwrap();
        assert_eq!(p.acc_reward_per_share, 0);
        // the empty window is consumed, not deferred
        assert_eq!(p.last_update_time, 5_000);

        // a staker arriving now only accrues from here on
        p.total_staked = 100;
        p.update_accumulator(5_100).unwrap();
        assert_eq!(p.acc_reward_per_share, 100 * 10 * REWARD_PRECISION / 100);
    }

    #[test]
    fn accrual_stops_at_period_end() {
        let mut p = pool(100, 10);
        p.update_accumulator(20_000).unwrap();
        // clamped at period_end = 10_000: 9_000s of accrual
        assert_eq!(p.acc_reward_per_share, 9_000 * 10 * REWARD_PRECISION / 100);
        assert_eq!(p.last_update_time, 10_000);

        // nothing more after the period
        p.update_accumulator(30_000).unwrap();
        assert_eq!(p.last_update_time, 10_000);
    }

    #[test]
    fn funding_rolls_leftover_into_new_period() {
        let mut p = pool(100, 10);
        // at t=4_000 there are 6_000s left at rate 10 = 60_000 leftover
        let rate = p.fund_period(40_000, 1_000, 4_000).unwrap();
        assert_eq!(rate, 100); // (40_000 + 60_000) / 1_000
        assert_eq!(p.period_end, 5_000);
        assert_eq!(p.last_update_time, 4_000);
    }

    #[test]
    fn funding_after_expiry_has_no_leftover() {
        let mut p = pool(100, 10);
        let rate = p.fund_period(50_000, 500, 20_000).unwrap();
        assert_eq!(rate, 100);
        assert_eq!(p.period_end, 20_500);
    }
}
