// =============================================================================
// NECTAR Error Codes
// =============================================================================
// Custom errors the NECTAR program can return. Each error has a unique code
// and a human-readable message. Anchor assigns numeric codes starting at 6000.
// =============================================================================

use anchor_lang::prelude::*;

#[error_code]
pub enum NectarError {
    // =========================================================================
    // Vault State Errors (6000-6009)
    // =========================================================================

    /// The vault has been paused by admin - no deposits, withdrawals, or
    /// compounding allowed
    #[msg("Vault is currently paused")]
    VaultPaused,

    /// Another operation on this vault is still in progress. The guard flag is
    /// set before any external call and cleared only after bookkeeping is
    /// finalized; a reentrant call must fail fast, never block.
    #[msg("Vault operation already in progress")]
    ReentrantOperation,

    /// The vault has been moved to emergency mode; only withdrawals from the
    /// local want buffer are allowed
    #[msg("Vault is in emergency mode")]
    EmergencyMode,

    // =========================================================================
    // Balance & Amount Errors (6010-6019)
    // =========================================================================

    /// Trying to deposit/withdraw/transfer 0 units
    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    /// User doesn't have enough want tokens for this deposit
    #[msg("Insufficient balance for operation")]
    InsufficientBalance,

    /// Holder doesn't have enough ledger shares for this withdrawal/transfer
    #[msg("Insufficient shares for operation")]
    InsufficientShares,

    /// First deposit into an empty vault is below the bootstrap minimum
    #[msg("Amount is below minimum first deposit")]
    BelowMinimumDeposit,

    /// Deposit would exceed the configured vault size cap
    #[msg("Amount exceeds maximum vault size")]
    ExceedsMaxVaultSize,

    /// Calculated share amount rounds to zero - deposit too small relative to
    /// the pool
    #[msg("Share amount rounds to zero")]
    ShareAmountZero,

    // =========================================================================
    // Protocol Adapter Errors (6020-6029)
    // =========================================================================

    /// The external staking call reverted. Fatal for deposit/withdraw,
    /// tolerable for harvest during a best-effort sweep.
    #[msg("External staking protocol call failed")]
    AdapterCallFailed,

    /// The external call returned data too short to hold the balance at the
    /// descriptor's configured offset
    #[msg("External staking protocol returned malformed data")]
    AdapterMalformedResponse,

    /// A descriptor field is out of range (selector length, balance offset)
    #[msg("Invalid adapter descriptor")]
    InvalidAdapterDescriptor,

    /// The stake account named by the descriptor was not supplied
    #[msg("Adapter stake account missing from call")]
    AdapterAccountMissing,

    /// The adapter returned less than the requested withdrawal even after the
    /// configured tolerance slack
    #[msg("Adapter withdrawal short of requested amount")]
    WithdrawToleranceExceeded,

    // =========================================================================
    // Swap & Path Errors (6030-6039)
    // =========================================================================

    /// Swap output would fall below the slippage band; the leg is aborted,
    /// partial proceeds are never redeposited silently
    #[msg("Swap output below slippage tolerance")]
    SlippageExceeded,

    /// No hop path is cached for this (venue, token_in, token_out); the
    /// reward leg is skipped rather than failing the whole compound
    #[msg("No swap route resolved for token pair")]
    UnroutablePath,

    /// Provided hop list does not start at token_in / end at token_out, is
    /// too long, or too short
    #[msg("Invalid swap path")]
    InvalidSwapPath,

    /// The swap venue returned no quote data
    #[msg("Swap venue quote unavailable")]
    QuoteUnavailable,

    // =========================================================================
    // Fee & Configuration Errors (6040-6049)
    // =========================================================================

    /// Withdraw fee or earn-fee legs exceed their caps, or too many legs
    #[msg("Invalid fee configuration")]
    InvalidFeeConfig,

    /// A single fee parameter exceeds its maximum
    #[msg("Fee exceeds maximum allowed")]
    FeeExceedsMax,

    /// Strategy parameter out of range (slippage, tolerance, throttle)
    #[msg("Invalid strategy parameter")]
    InvalidStrategyParam,

    // =========================================================================
    // Maximizer Errors (6050-6059)
    // =========================================================================

    /// A maximizer may only be built on a standard vault; chaining or
    /// self-linking would create a composition cycle
    #[msg("Maximizer link would create a cycle")]
    MaximizerCycle,

    /// The base vault already has a maximizer attached
    #[msg("Base vault already has a maximizer")]
    MaximizerAlreadyLinked,

    /// Operation is only valid on a maximizer vault
    #[msg("Vault is not a maximizer")]
    NotAMaximizer,

    /// Operation is only valid on a standard vault
    #[msg("Vault is not a standard vault")]
    NotAStandardVault,

    /// Maximizer accounts provided do not match the vault's stored link
    #[msg("Maximizer accounts do not match vault link")]
    InvalidMaximizerAccounts,

    /// Holder has no settled or pending earnings to claim
    #[msg("No earnings to claim")]
    NoEarningsToClaim,

    // =========================================================================
    // Authorization Errors (6060-6069)
    // =========================================================================

    /// Only the vault admin can perform this action
    #[msg("Only admin can perform this action")]
    AdminOnly,

    /// The signer doesn't match the expected authority
    #[msg("Invalid authority")]
    InvalidAuthority,

    /// New authority address is the zero address
    #[msg("Invalid address")]
    InvalidAddress,

    // =========================================================================
    // Math & Overflow Errors (6070-6079)
    // =========================================================================

    /// A calculation would overflow
    #[msg("Math overflow - calculation exceeded maximum value")]
    MathOverflow,

    /// A calculation would underflow
    #[msg("Math underflow - result would be negative")]
    MathUnderflow,

    /// Division by zero - usually means the vault is empty when it shouldn't be
    #[msg("Division by zero")]
    DivisionByZero,

    // =========================================================================
    // Account Validation Errors (6080-6089)
    // =========================================================================

    /// A mint doesn't match what the vault was configured with
    #[msg("Invalid mint for this vault")]
    InvalidMint,

    /// Token account owner doesn't match expected owner
    #[msg("Invalid token account owner")]
    InvalidTokenAccountOwner,

    /// A token account doesn't match the vault's stored address
    #[msg("Invalid vault token account")]
    InvalidVaultTokenAccount,

    /// A fee recipient token account doesn't match the configured leg
    #[msg("Fee recipient does not match configured leg")]
    InvalidFeeRecipient,

    /// A holder account belongs to a different vault or owner
    #[msg("Holder account does not match vault and owner")]
    InvalidHolder,
}
