// =============================================================================
// Holder State Account
// =============================================================================
// The Holder account is the per-(vault, owner) row of the share ledger. One
// PDA per holder per vault, created implicitly on first deposit. Shares are
// pure ledger entries, not SPL tokens, so transfers stay inside the program
// and the maximizer earnings offset can be re-stamped on every movement.
//
// Offset discipline: earnings_offset snapshots the vault's per-share
// accumulated output at the holder's last interaction. Before any share
// change (deposit, withdraw, transfer in/out, stake custody moves) the
// pending claim against the old share count is settled into
// settled_earnings, then the offset is raised to the current accumulator, so
// no interaction can re-credit already-settled yield and no receiver can
// claim yield accrued before a transfer.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::EARNINGS_PRECISION;
use crate::error::NectarError;

/// Per-holder ledger row.
///
/// PDA derived from ["holder", vault_pubkey, owner_pubkey].
#[account]
#[derive(InitSpace)]
pub struct Holder {
    /// The vault this row belongs to
    pub vault: Pubkey,

    /// The owner of the position. A wallet for user rows; a program PDA for
    /// custody rows (maximizer principal, boost pool stakes).
    pub owner: Pubkey,

    /// Current ledger share balance. Never negative; all mutations checked.
    pub shares: u64,

    /// Snapshot of the vault's acc_output_per_share at the last interaction.
    /// Monotonically non-decreasing. Meaningful on maximizer vaults only.
    pub earnings_offset: u128,

    /// Target-asset earnings settled but not yet claimed
    pub settled_earnings: u64,

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Cumulative want deposited
    pub total_deposited: u64,

    /// Cumulative want withdrawn
    pub total_withdrawn: u64,

    /// Cumulative maximizer earnings paid out
    pub earnings_claimed: u64,

    /// Number of deposits made
    pub deposit_count: u32,

    /// Unix timestamp of the most recent deposit
    pub last_deposit_timestamp: i64,

    /// Unix timestamp of the most recent withdrawal
    pub last_withdrawal_timestamp: i64,

    /// Bump seed for this Holder PDA
    pub bump: u8,
}

impl Holder {
    /// Pending (unsettled) earnings against the vault's current accumulator:
    /// shares * (acc - offset) / PRECISION
    pub fn pending_earnings(&self, acc_output_per_share: u128) -> Result<u64> {
        if self.shares == 0 {
            return Ok(0);
        }

        let delta = acc_output_per_share
            .checked_sub(self.earnings_offset)
            .ok_or(error!(NectarError::MathUnderflow))?;

        let pending = (self.shares as u128)
            .checked_mul(delta)
            .ok_or(error!(NectarError::MathOverflow))?
            .checked_div(EARNINGS_PRECISION)
            .ok_or(error!(NectarError::DivisionByZero))?;

        Ok(pending.min(u64::MAX as u128) as u64)
    }

    /// Settle pending earnings into the claimable credit and re-stamp the
    /// offset. Must run before every share-count change on a maximizer.
    pub fn settle_earnings(&mut self, acc_output_per_share: u128) -> Result<()> {
        let pending = self.pending_earnings(acc_output_per_share)?;

        self.settled_earnings = self
            .settled_earnings
            .checked_add(pending)
            .ok_or(error!(NectarError::MathOverflow))?;

        self.earnings_offset = acc_output_per_share;

        Ok(())
    }

    /// Take the full claimable credit, zeroing it. Caller pays it out.
    pub fn take_settled_earnings(&mut self) -> Result<u64> {
        let amount = self.settled_earnings;
        self.settled_earnings = 0;
        self.earnings_claimed = self
            .earnings_claimed
            .checked_add(amount)
            .ok_or(error!(NectarError::MathOverflow))?;
        Ok(amount)
    }

    pub fn add_shares(&mut self, amount: u64) -> Result<()> {
        self.shares = self
            .shares
            .checked_add(amount)
            .ok_or(error!(NectarError::MathOverflow))?;
        Ok(())
    }

    pub fn sub_shares(&mut self, amount: u64) -> Result<()> {
        require!(self.shares >= amount, NectarError::InsufficientShares);
        self.shares = self
            .shares
            .checked_sub(amount)
            .ok_or(error!(NectarError::MathUnderflow))?;
        Ok(())
    }

    /// Record a deposit for statistics
    pub fn record_deposit(&mut self, amount: u64, timestamp: i64) -> Result<()> {
        self.total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(error!(NectarError::MathOverflow))?;
        self.deposit_count = self
            .deposit_count
            .checked_add(1)
            .ok_or(error!(NectarError::MathOverflow))?;
        self.last_deposit_timestamp = timestamp;
        Ok(())
    }

    /// Record a withdrawal for statistics
    pub fn record_withdrawal(&mut self, amount: u64, timestamp: i64) -> Result<()> {
        self.total_withdrawn = self
            .total_withdrawn
            .checked_add(amount)
            .ok_or(error!(NectarError::MathOverflow))?;
        self.last_withdrawal_timestamp = timestamp;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder(shares: u64, offset: u128) -> Holder {
        Holder {
            vault: Pubkey::new_unique(),
            owner: Pubkey::new_unique(),
            shares,
            earnings_offset: offset,
            settled_earnings: 0,
            total_deposited: 0,
            total_withdrawn: 0,
            earnings_claimed: 0,
            deposit_count: 0,
            last_deposit_timestamp: 0,
            last_withdrawal_timestamp: 0,
            bump: 255,
        }
    }

    #[test]
    fn pending_is_share_weighted_delta() {
        let acc = 5 * EARNINGS_PRECISION; // 5 units of output per share
        let h = holder(100, 2 * EARNINGS_PRECISION);
        // 100 shares * (5 - 2) = 300
        assert_eq!(h.pending_earnings(acc).unwrap(), 300);
    }

    #[test]
    fn pending_zero_without_shares() {
        let h = holder(0, 0);
        assert_eq!(h.pending_earnings(7 * EARNINGS_PRECISION).unwrap(), 0);
    }

    #[test]
    fn late_depositor_excluded_from_prior_output() {
        // X deposits before the compound, Y stamps in after it
        let acc_before = 0u128;
        let acc_after = 3 * EARNINGS_PRECISION;

        let x = holder(100, acc_before);
        let y = holder(100, acc_after);

        assert_eq!(x.pending_earnings(acc_after).unwrap(), 300);
        assert_eq!(y.pending_earnings(acc_after).unwrap(), 0);

        // a later compound credits both, but X keeps its earlier claim
        let acc_next = 4 * EARNINGS_PRECISION;
        assert!(x.pending_earnings(acc_next).unwrap() > y.pending_earnings(acc_next).unwrap());
    }

    #[test]
    fn settle_preserves_claim_and_restamps() {
        let acc = 2 * EARNINGS_PRECISION;
        let mut h = holder(50, 0);

        h.settle_earnings(acc).unwrap();
        assert_eq!(h.settled_earnings, 100);
        assert_eq!(h.earnings_offset, acc);
        // settling again at the same accumulator adds nothing
        h.settle_earnings(acc).unwrap();
        assert_eq!(h.settled_earnings, 100);
    }

    #[test]
    fn transfer_restamp_blocks_pre_transfer_yield() {
        let acc = 10 * EARNINGS_PRECISION;
        let mut sender = holder(80, 4 * EARNINGS_PRECISION);
        let mut receiver = holder(20, 10 * EARNINGS_PRECISION);

        // settle both sides at the current accumulator, then move shares
        sender.settle_earnings(acc).unwrap();
        receiver.settle_earnings(acc).unwrap();
        sender.sub_shares(30).unwrap();
        receiver.add_shares(30).unwrap();

        // sender kept the yield accrued on the full 80 shares
        assert_eq!(sender.settled_earnings, 80 * 6);
        // receiver gained nothing retroactively
        assert_eq!(receiver.settled_earnings, 0);
        assert_eq!(receiver.pending_earnings(acc).unwrap(), 0);

        // the next accrual splits by the new balances
        let acc_next = 11 * EARNINGS_PRECISION;
        assert_eq!(sender.pending_earnings(acc_next).unwrap(), 50);
        assert_eq!(receiver.pending_earnings(acc_next).unwrap(), 50);
    }

    #[test]
    fn take_settled_zeroes_credit() {
        let mut h = holder(10, 0);
        h.settled_earnings = 77;
        assert_eq!(h.take_settled_earnings().unwrap(), 77);
        assert_eq!(h.settled_earnings, 0);
        assert_eq!(h.earnings_claimed, 77);
    }

    #[test]
    fn share_mutations_checked() {
        let mut h = holder(10, 0);
        assert!(h.sub_shares(11).is_err());
        h.sub_shares(10).unwrap();
        assert_eq!(h.shares, 0);
        h.add_shares(u64::MAX).unwrap();
        assert!(h.add_shares(1).is_err());
    }
}
