// =============================================================================
// NECTAR Events
// =============================================================================
// Machine-readable reports emitted alongside msg! logs. Keepers sweeping many
// vaults rely on EarnExecuted/EarnSkipped to build the per-vault
// success/failure report of a compounding batch.
// =============================================================================

use anchor_lang::prelude::*;

/// Why a compounding run (or one of its legs) was skipped instead of failing
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum SkipReason {
    /// `min_earn_interval` slots have not elapsed since the last run.
    /// This is a no-op, not an error.
    ThrottleNotElapsed,
    /// Adapter harvest failed during a best-effort sweep
    HarvestFailed,
    /// Reward balance at or below the vault's dust threshold
    DustBelowThreshold,
    /// No swap route cached for the reward pair
    UnroutablePath,
    /// Swap output fell below the slippage band
    SlippageExceeded,
    /// Maximizer has no shares outstanding to accrue to
    NoSharesOutstanding,
}

#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub want_mint: Pubkey,
    pub vault_id: u64,
    pub is_maximizer: bool,
}

#[event]
pub struct Deposited {
    pub vault: Pubkey,
    pub holder: Pubkey,
    pub amount: u64,
    pub shares_minted: u64,
    pub total_shares: u64,
    pub total_underlying: u64,
}

#[event]
pub struct Withdrawn {
    pub vault: Pubkey,
    pub holder: Pubkey,
    pub shares_burned: u64,
    pub amount_returned: u64,
    pub fee_paid: u64,
    pub total_shares: u64,
    pub total_underlying: u64,
}

#[event]
pub struct SharesTransferred {
    pub vault: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}

#[event]
pub struct EarnExecuted {
    pub vault: Pubkey,
    pub harvested: u64,
    pub fees_paid: u64,
    pub exported: u64,
    pub compounded: u64,
    pub total_underlying: u64,
}

#[event]
pub struct EarnSkipped {
    pub vault: Pubkey,
    pub reason: SkipReason,
}

#[event]
pub struct MaximizerHarvested {
    pub vault: Pubkey,
    pub swapped_in: u64,
    pub target_out: u64,
    pub acc_output_per_share: u128,
}

#[event]
pub struct EarningsClaimed {
    pub vault: Pubkey,
    pub holder: Pubkey,
    pub amount: u64,
}

#[event]
pub struct EmergencyWithdrawn {
    pub vault: Pubkey,
    pub recovered: u64,
}
