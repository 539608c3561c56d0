// =============================================================================
// NECTAR Protocol Constants
// =============================================================================
// All magic numbers and configuration limits for the NECTAR vault protocol.
// Keeping them here makes it easy to adjust parameters and ensures consistency
// across the codebase.
// =============================================================================

// =============================================================================
// FEE LIMITS (in basis points - 1 BPS = 0.01%)
// =============================================================================

/// Total basis points (100%) - used as denominator in fee calculations
/// Example: fee = amount * FEE_BPS / BPS_DENOMINATOR
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Maximum withdraw fee a vault may be configured with (5%)
pub const MAX_WITHDRAW_FEE_BPS: u16 = 500;

/// Maximum combined rate of all earn-fee legs (30% of each harvest)
pub const MAX_EARN_FEE_TOTAL_BPS: u16 = 3_000;

/// Maximum number of earn-fee legs a vault may carry
pub const MAX_EARN_FEE_LEGS: usize = 3;

// =============================================================================
// STRATEGY LIMITS
// =============================================================================

/// Maximum slippage tolerance for compounding swaps (10%)
pub const MAX_SLIPPAGE_BPS: u16 = 1_000;

/// Maximum raw-unit slack allowed when verifying an adapter withdrawal.
/// External staking contracts round by at most a couple of base units.
pub const MAX_WITHDRAW_TOLERANCE: u64 = 3;

/// Maximum throttle between compounding runs (~1 day of slots)
pub const MAX_EARN_INTERVAL_SLOTS: u64 = 216_000;

/// Maximum hop count in a swap path, endpoints included
pub const MAX_SWAP_PATH_HOPS: usize = 4;

// =============================================================================
// SHARE ACCOUNTING GUARDS
// =============================================================================

/// Minimum first deposit into an empty vault (in want base units).
/// Prevents the share price inflation attack where a dust first deposit
/// followed by a direct donation makes later depositors round to 0 shares.
pub const MIN_FIRST_DEPOSIT: u64 = 1_000;

/// Minimum share count any deposit must mint
pub const MIN_SHARES_MINTED: u64 = 1;

/// Default maximum vault size (in want base units) until admin raises it
pub const DEFAULT_MAX_VAULT_SIZE: u64 = u64::MAX;

// =============================================================================
// MAXIMIZER EARNINGS PRECISION
// =============================================================================

/// Fixed-point scale for the per-share accumulated output of a base vault.
/// u128 headroom keeps `delivered * PRECISION` far from overflow for any
/// realistic token supply.
pub const EARNINGS_PRECISION: u128 = 1_000_000_000_000_000_000; // 10^18

// =============================================================================
// PDA SEEDS
// =============================================================================
// PDAs (Program Derived Addresses) are accounts only this program can sign
// for. Same seeds = same address.
// =============================================================================

/// Seed for a Vault account PDA
/// Full seed: ["vault", want_mint_pubkey, vault_id_le_bytes]
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed for the vault's local want buffer token account
/// Full seed: ["want_vault", vault_pubkey]
pub const WANT_VAULT_SEED: &[u8] = b"want_vault";

/// Seed for the vault's harvested-reward buffer token account
/// Full seed: ["reward_vault", vault_pubkey]
pub const REWARD_VAULT_SEED: &[u8] = b"reward_vault";

/// Seed for a maximizer's exported-earnings escrow token account
/// Full seed: ["earnings_escrow", vault_pubkey]
pub const EARNINGS_ESCROW_SEED: &[u8] = b"earnings_escrow";

/// Seed for a maximizer's target-asset vault token account
/// Full seed: ["target_vault", vault_pubkey]
pub const TARGET_VAULT_SEED: &[u8] = b"target_vault";

/// Seed for a Holder ledger account
/// Full seed: ["holder", vault_pubkey, owner_pubkey]
pub const HOLDER_SEED: &[u8] = b"holder";

/// Seed for a SwapPath cache entry
/// Full seed: ["swap_path", venue_program, token_in_mint, token_out_mint]
pub const SWAP_PATH_SEED: &[u8] = b"swap_path";
