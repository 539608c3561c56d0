// =============================================================================
// Vault State Account
// =============================================================================
// The Vault account is the per-vault record of the NECTAR registry: share
// accounting, strategy configuration, protocol adapter descriptor, fee
// schedule, throttle and guard bookkeeping, and the maximizer link.
//
// Accounting invariant: total_underlying is authoritative (re-read from the
// adapter's balance query after every deposit/withdraw/earn); total_shares is
// the bookkeeping denominator such that a holder's redeemable underlying is
//   holder.shares * total_underlying / total_shares
// with floor division on every conversion, so rounding always favors the
// remaining pool over the leaving holder.
// =============================================================================

use anchor_lang::prelude::*;

use crate::adapter::AdapterDescriptor;
use crate::constants::*;
use crate::error::NectarError;

/// Whether the vault compounds an external staking position or another
/// vault's shares
#[derive(
    AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, PartialEq, Eq, Debug, Default,
)]
pub enum VaultKind {
    /// Want asset staked into an external protocol through the adapter
    #[default]
    Standard,
    /// Want is a base vault's ledger shares; output is redirected into a
    /// separate target asset
    Maximizer,
}

/// One earn-fee leg: a basis-point cut of each harvest, paid in the harvested
/// reward asset to a fixed token account. A burn leg is simply a leg whose
/// recipient is owned by a non-recoverable sink.
#[derive(
    AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, PartialEq, Eq, Debug, Default,
)]
pub struct EarnFeeLeg {
    /// Recipient token account (reward mint for standard vaults, target mint
    /// for maximizers)
    pub recipient: Pubkey,
    /// Rate in basis points
    pub bps: u16,
}

/// The main Vault account.
///
/// PDA derived from ["vault", want_mint, vault_id_le_bytes].
#[account]
#[derive(InitSpace)]
pub struct Vault {
    // =========================================================================
    // Authority & Identification
    // =========================================================================

    /// The admin who can pause the vault and update settings
    pub admin: Pubkey,

    /// Disambiguates multiple vaults over the same want mint
    pub vault_id: u64,

    /// Standard or maximizer
    pub kind: VaultKind,

    /// The asset this vault accepts as principal and compounds more of
    pub want_mint: Pubkey,

    /// Local want buffer token account (PDA-owned); holds want only
    /// transiently between user transfers and adapter calls, plus the full
    /// position after an emergency withdrawal
    pub want_vault: Pubkey,

    /// The reward asset harvested from the external protocol
    pub reward_mint: Pubkey,

    /// PDA-owned buffer receiving harvested reward before fee/swap split
    pub reward_vault: Pubkey,

    /// Swap venue (router) program used for compounding conversions
    pub venue_program: Pubkey,

    /// Calling convention for the external staking protocol. Immutable.
    pub adapter: AdapterDescriptor,

    // =========================================================================
    // Share Accounting
    // =========================================================================

    /// Total ledger shares outstanding
    pub total_shares: u64,

    /// The strategy's reported staked balance (authoritative)
    pub total_underlying: u64,

    /// Number of holder accounts with a live position
    pub holder_count: u64,

    // =========================================================================
    // Fee Schedule
    // =========================================================================

    /// Withdraw fee in basis points, taken from the amount actually returned
    pub withdraw_fee_bps: u16,

    /// Token account receiving the withdraw fee (want mint)
    pub withdraw_fee_recipient: Pubkey,

    /// Earn-fee legs taken from each harvest before compounding
    #[max_len(3)]
    pub earn_fees: Vec<EarnFeeLeg>,

    // =========================================================================
    // Strategy Parameters
    // =========================================================================

    /// Slippage tolerance band for compounding swaps, in basis points
    pub slippage_bps: u16,

    /// Raw-unit threshold below which a swap/deposit is skipped as not worth
    /// the gas
    pub dust: u64,

    /// Raw-unit slack requested on top of an adapter withdrawal to absorb
    /// external rounding
    pub withdraw_tolerance: u64,

    /// Minimum slots between compounding runs
    pub min_earn_interval: u64,

    /// Slot of the last successful compound
    pub last_earn_slot: u64,

    // =========================================================================
    // Guards & Lifecycle
    // =========================================================================

    /// Operation-in-progress flag. Set before any external call, cleared
    /// after bookkeeping is finalized; reentrant calls fail fast.
    pub locked: bool,

    /// Emergency pause flag
    pub is_paused: bool,

    /// Set once emergency_withdraw has pulled the position local; withdrawals
    /// then bypass the adapter
    pub emergency_mode: bool,

    /// Maximum total deposits allowed (in want base units)
    pub max_vault_size: u64,

    // =========================================================================
    // Maximizer Composition
    // =========================================================================

    /// For a maximizer: the standard vault whose shares are the principal
    pub base_vault: Pubkey,

    /// For a standard vault: the maximizer built on top of it, if any
    pub maximizer_vault: Pubkey,

    /// For a maximizer: the asset its redirected output is compounded into
    pub target_mint: Pubkey,

    /// For a maximizer: PDA token account holding swapped target asset
    pub target_vault: Pubkey,

    /// For a maximizer: PDA token account receiving the base vault's exported
    /// reward before it is swapped to the target asset
    pub earnings_escrow: Pubkey,

    /// For a maximizer: per-share accumulated target-asset output, scaled by
    /// EARNINGS_PRECISION. Monotonically non-decreasing.
    pub acc_output_per_share: u128,

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Cumulative harvested reward (pre-fee, raw reward units)
    pub total_harvested: u64,

    /// Number of successful compounding runs
    pub earn_count: u64,

    // =========================================================================
    // PDA Bumps
    // =========================================================================

    pub bump: u8,
    pub want_vault_bump: u8,
    pub reward_vault_bump: u8,
}

impl Vault {
    /// Shares to mint for a deposit, computed against the pre-deposit
    /// underlying.
    ///
    /// First deposit bootstraps the share price at 1:1; later deposits mint
    /// amount * total_shares / total_underlying, floor.
    pub fn calculate_shares_to_mint(&self, amount: u64) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(amount);
        }

        if self.total_underlying == 0 {
            // shares outstanding but nothing underlying: the position was
            // wiped externally; minting against it would be unbounded
            return Err(error!(NectarError::DivisionByZero));
        }

        let shares = (amount as u128)
            .checked_mul(self.total_shares as u128)
            .ok_or(error!(NectarError::MathOverflow))?
            .checked_div(self.total_underlying as u128)
            .ok_or(error!(NectarError::DivisionByZero))?;

        Ok(shares as u64)
    }

    /// Underlying owed for burning shares: shares * total_underlying /
    /// total_shares, floor. Computed before any state mutation.
    pub fn calculate_withdrawal_amount(&self, shares: u64) -> Result<u64> {
        require!(self.total_shares > 0, NectarError::DivisionByZero);

        let amount = (shares as u128)
            .checked_mul(self.total_underlying as u128)
            .ok_or(error!(NectarError::MathOverflow))?
            .checked_div(self.total_shares as u128)
            .ok_or(error!(NectarError::DivisionByZero))?;

        Ok(amount as u64)
    }

    /// Withdraw fee on the amount actually returned by the adapter.
    /// Returns (fee, net).
    pub fn split_withdraw_fee(&self, amount: u64) -> Result<(u64, u64)> {
        let fee = (amount as u128)
            .checked_mul(self.withdraw_fee_bps as u128)
            .ok_or(error!(NectarError::MathOverflow))?
            .checked_div(BPS_DENOMINATOR as u128)
            .ok_or(error!(NectarError::DivisionByZero))? as u64;

        let net = amount
            .checked_sub(fee)
            .ok_or(error!(NectarError::MathUnderflow))?;

        Ok((fee, net))
    }

    /// Per-leg earn fees on a harvest. Each leg is floor(harvest * bps /
    /// 10000); the compounded remainder is harvest minus the legs, so no
    /// value is created or lost to rounding.
    pub fn earn_fee_amounts(&self, harvested: u64) -> Result<Vec<u64>> {
        let mut amounts = Vec::with_capacity(self.earn_fees.len());
        for leg in &self.earn_fees {
            let cut = (harvested as u128)
                .checked_mul(leg.bps as u128)
                .ok_or(error!(NectarError::MathOverflow))?
                .checked_div(BPS_DENOMINATOR as u128)
                .ok_or(error!(NectarError::DivisionByZero))? as u64;
            amounts.push(cut);
        }
        Ok(amounts)
    }

    /// Validate the full fee schedule. Called at creation and on every update.
    pub fn validate_fees(&self) -> Result<()> {
        require!(
            self.withdraw_fee_bps <= MAX_WITHDRAW_FEE_BPS,
            NectarError::FeeExceedsMax
        );
        require!(
            self.earn_fees.len() <= MAX_EARN_FEE_LEGS,
            NectarError::InvalidFeeConfig
        );

        let mut total: u32 = 0;
        for leg in &self.earn_fees {
            require!(leg.recipient != Pubkey::default(), NectarError::InvalidFeeConfig);
            total = total
                .checked_add(leg.bps as u32)
                .ok_or(error!(NectarError::MathOverflow))?;
        }
        require!(
            total <= MAX_EARN_FEE_TOTAL_BPS as u32,
            NectarError::InvalidFeeConfig
        );

        Ok(())
    }

    /// Validate strategy knobs. Called at creation and on every update.
    pub fn validate_strategy_params(&self) -> Result<()> {
        require!(
            self.slippage_bps <= MAX_SLIPPAGE_BPS,
            NectarError::InvalidStrategyParam
        );
        require!(
            self.withdraw_tolerance <= MAX_WITHDRAW_TOLERANCE,
            NectarError::InvalidStrategyParam
        );
        require!(
            self.min_earn_interval <= MAX_EARN_INTERVAL_SLOTS,
            NectarError::InvalidStrategyParam
        );
        Ok(())
    }

    /// Throttle check: a compound may run only once per min_earn_interval
    /// slots. Not running is a reported skip, never an error.
    pub fn throttle_allows(&self, current_slot: u64) -> bool {
        current_slot >= self.last_earn_slot.saturating_add(self.min_earn_interval)
    }

    /// Set the guard flag, rejecting reentrant entry
    pub fn lock(&mut self) -> Result<()> {
        require!(!self.locked, NectarError::ReentrantOperation);
        self.locked = true;
        Ok(())
    }

    /// Clear the guard flag once all local bookkeeping is finalized
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Advance the maximizer accumulator by `delivered` target-asset units
    /// spread over the current share supply
    pub fn accrue_output(&mut self, delivered: u64) -> Result<()> {
        require!(self.kind == VaultKind::Maximizer, NectarError::NotAMaximizer);
        if self.total_shares == 0 || delivered == 0 {
            return Ok(());
        }

        let increment = (delivered as u128)
            .checked_mul(EARNINGS_PRECISION)
            .ok_or(error!(NectarError::MathOverflow))?
            .checked_div(self.total_shares as u128)
            .ok_or(error!(NectarError::DivisionByZero))?;

        self.acc_output_per_share = self
            .acc_output_per_share
            .checked_add(increment)
            .ok_or(error!(NectarError::MathOverflow))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> Vault {
        Vault {
            admin: Pubkey::new_unique(),
            vault_id: 0,
            kind: VaultKind::Standard,
            want_mint: Pubkey::new_unique(),
            want_vault: Pubkey::new_unique(),
            reward_mint: Pubkey::new_unique(),
            reward_vault: Pubkey::new_unique(),
            venue_program: Pubkey::new_unique(),
            adapter: AdapterDescriptor::default(),
            total_shares: 0,
            total_underlying: 0,
            holder_count: 0,
            withdraw_fee_bps: 10,
            withdraw_fee_recipient: Pubkey::new_unique(),
            earn_fees: vec![],
            slippage_bps: 50,
            dust: 100,
            withdraw_tolerance: 2,
            min_earn_interval: 300,
            last_earn_slot: 0,
            locked: false,
            is_paused: false,
            emergency_mode: false,
            max_vault_size: u64::MAX,
            base_vault: Pubkey::default(),
            maximizer_vault: Pubkey::default(),
            target_mint: Pubkey::default(),
            target_vault: Pubkey::default(),
            earnings_escrow: Pubkey::default(),
            acc_output_per_share: 0,
            total_harvested: 0,
            earn_count: 0,
            bump: 255,
            want_vault_bump: 255,
            reward_vault_bump: 255,
        }
    }

    #[test]
    fn first_deposit_bootstraps_one_to_one() {
        let v = vault();
        assert_eq!(v.calculate_shares_to_mint(5_000).unwrap(), 5_000);
    }

    #[test]
    fn later_deposits_mint_proportionally() {
        let mut v = vault();
        v.total_shares = 1_000;
        v.total_underlying = 2_000; // share price 2.0
        assert_eq!(v.calculate_shares_to_mint(500).unwrap(), 250);
        // floor direction favors the pool
        assert_eq!(v.calculate_shares_to_mint(3).unwrap(), 1);
    }

    #[test]
    fn mint_rejects_wiped_position() {
        let mut v = vault();
        v.total_shares = 1_000;
        v.total_underlying = 0;
        assert!(v.calculate_shares_to_mint(500).is_err());
    }

    #[test]
    fn withdrawal_floor_favors_pool() {
        let mut v = vault();
        v.total_shares = 3;
        v.total_underlying = 10;
        // 1 share of 10/3 = 3.33 -> 3
        assert_eq!(v.calculate_withdrawal_amount(1).unwrap(), 3);
        // all shares drain the whole pool
        assert_eq!(v.calculate_withdrawal_amount(3).unwrap(), 10);
    }

    #[test]
    fn share_price_monotone_under_compounding() {
        let mut v = vault();
        v.total_shares = 1_000;
        v.total_underlying = 1_000;
        let price_before = v.total_underlying as f64 / v.total_shares as f64;

        // a successful earn only ever grows the adapter-reported balance
        v.total_underlying += 37;
        let price_after = v.total_underlying as f64 / v.total_shares as f64;
        assert!(price_after >= price_before);
    }

    #[test]
    fn deposit_withdraw_round_trip_within_fee() {
        let mut v = vault();
        v.withdraw_fee_bps = 10; // 0.1%
        let amount = 1_000_000u64;

        let shares = v.calculate_shares_to_mint(amount).unwrap();
        v.total_shares = shares;
        v.total_underlying = amount;

        let owed = v.calculate_withdrawal_amount(shares).unwrap();
        assert_eq!(owed, amount);

        let (fee, net) = v.split_withdraw_fee(owed).unwrap();
        assert_eq!(fee, amount / 10_000 * 10);
        assert_eq!(net, amount - fee);
    }

    #[test]
    fn earn_fee_legs_conserve_value() {
        let mut v = vault();
        v.earn_fees = vec![
            EarnFeeLeg { recipient: Pubkey::new_unique(), bps: 300 },
            EarnFeeLeg { recipient: Pubkey::new_unique(), bps: 50 },
        ];
        let harvested = 99_991u64;
        let amounts = v.earn_fee_amounts(harvested).unwrap();

        // no leg exceeds its configured rate
        assert!(amounts[0] <= harvested * 300 / 10_000);
        assert!(amounts[1] <= harvested * 50 / 10_000);

        // remainder + legs reconstruct the harvest exactly
        let remainder = harvested - amounts[0] - amounts[1];
        assert_eq!(remainder + amounts[0] + amounts[1], harvested);
    }

    #[test]
    fn fee_validation_caps() {
        let mut v = vault();
        v.withdraw_fee_bps = MAX_WITHDRAW_FEE_BPS + 1;
        assert!(v.validate_fees().is_err());

        v.withdraw_fee_bps = 0;
        v.earn_fees = vec![EarnFeeLeg {
            recipient: Pubkey::new_unique(),
            bps: MAX_EARN_FEE_TOTAL_BPS + 1,
        }];
        assert!(v.validate_fees().is_err());

        v.earn_fees = vec![EarnFeeLeg { recipient: Pubkey::default(), bps: 10 }];
        assert!(v.validate_fees().is_err());

        v.earn_fees = vec![EarnFeeLeg { recipient: Pubkey::new_unique(), bps: 10 }];
        assert!(v.validate_fees().is_ok());
    }

    #[test]
    fn throttle_gate() {
        let mut v = vault();
        v.min_earn_interval = 300;
        v.last_earn_slot = 1_000;
        assert!(!v.throttle_allows(1_299));
        assert!(v.throttle_allows(1_300));
    }

    #[test]
    fn guard_flag_fails_fast() {
        let mut v = vault();
        v.lock().unwrap();
        assert!(v.lock().is_err());
        v.unlock();
        assert!(v.lock().is_ok());
    }

    #[test]
    fn accrual_only_with_shares_outstanding() {
        let mut v = vault();
        v.kind = VaultKind::Maximizer;

        v.accrue_output(1_000).unwrap();
        assert_eq!(v.acc_output_per_share, 0);

        v.total_shares = 500;
        v.accrue_output(1_000).unwrap();
        assert_eq!(v.acc_output_per_share, 1_000 * EARNINGS_PRECISION / 500);
    }

    #[test]
    fn accrual_rejected_on_standard_vault() {
        let mut v = vault();
        v.total_shares = 500;
        assert!(v.accrue_output(1_000).is_err());
    }
}
