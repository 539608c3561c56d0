// =============================================================================
// NECTAR - Solana Auto-Compounding Vault Protocol
// =============================================================================
//
// NECTAR is a yield-aggregating vault platform on Solana:
// - Users deposit a want asset and receive proportional ledger shares
// - Keepers periodically harvest the external staking protocol's reward,
//   swap it back into want and re-stake it, compounding the share price
// - Configurable withdraw and earn fees are taken along the way
//
// One strategy code path drives structurally different external staking
// programs through per-vault adapter descriptors (see adapter.rs), vaults
// compose into maximizers (principal is another vault's shares, output is
// redirected into a separate target asset), and the companion nectar-boost
// program layers an optional stake-and-earn pool on top of vault shares.
//
// This is the main entry point for the NECTAR Anchor program.
// =============================================================================

pub mod adapter;
pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod state;
pub mod venue;

use anchor_lang::prelude::*;

pub use adapter::*;
pub use constants::*;
pub use error::*;
pub use instructions::*;
pub use state::*;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

/// The NECTAR program module
#[program]
pub mod nectar {
    use super::*;

    // =========================================================================
    // Vault Creation & Configuration
    // =========================================================================

    /// Initialize a standard vault over one external staking integration
    ///
    /// # Arguments
    /// * `vault_id` - Disambiguates multiple vaults over the same want mint
    /// * `adapter` - Immutable calling convention for the external protocol
    /// * `withdraw_fee_bps` - Withdraw fee rate (basis points)
    /// * `earn_fees` - Earn-fee legs `(recipient, bps)` taken per harvest
    /// * `slippage_bps` - Tolerance band for compounding swaps
    /// * `dust` - Minimum raw units worth swapping/depositing
    /// * `withdraw_tolerance` - Slack units for adapter withdrawal rounding
    /// * `min_earn_interval` - Throttle between compounds, in slots
    #[allow(clippy::too_many_arguments)]
    pub fn initialize_vault(
        ctx: Context<InitializeVault>,
        vault_id: u64,
        adapter: AdapterDescriptor,
        withdraw_fee_bps: u16,
        earn_fees: Vec<EarnFeeLeg>,
        slippage_bps: u16,
        dust: u64,
        withdraw_tolerance: u64,
        min_earn_interval: u64,
    ) -> Result<()> {
        instructions::initialize_vault::handler_initialize_vault(
            ctx,
            vault_id,
            adapter,
            withdraw_fee_bps,
            earn_fees,
            slippage_bps,
            dust,
            withdraw_tolerance,
            min_earn_interval,
        )
    }

    /// Initialize a maximizer vault on top of an existing standard vault.
    /// The composition edge is validated acyclic at creation time.
    pub fn initialize_maximizer(
        ctx: Context<InitializeMaximizer>,
        vault_id: u64,
        earn_fees: Vec<EarnFeeLeg>,
        slippage_bps: u16,
        dust: u64,
        min_earn_interval: u64,
    ) -> Result<()> {
        instructions::initialize_maximizer::handler_initialize_maximizer(
            ctx,
            vault_id,
            earn_fees,
            slippage_bps,
            dust,
            min_earn_interval,
        )
    }

    /// Create an empty ledger row for (vault, owner); required before that
    /// owner can receive a share transfer
    pub fn create_holder(ctx: Context<CreateHolder>) -> Result<()> {
        instructions::create_holder::handler_create_holder(ctx)
    }

    /// Store or override the cached swap route for one
    /// (venue, token_in, token_out) triple. An empty hop list marks the pair
    /// unroutable.
    pub fn set_swap_path(ctx: Context<SetSwapPath>, hops: Vec<Pubkey>) -> Result<()> {
        instructions::set_swap_path::handler_set_swap_path(ctx, hops)
    }

    // =========================================================================
    // User Operations
    // =========================================================================

    /// Deposit want tokens and receive ledger shares
    ///
    /// # Arguments
    /// * `amount` - Want tokens to deposit (base units)
    /// * `min_shares_out` - Minimum shares to receive (0 to skip)
    pub fn deposit<'info>(
        ctx: Context<'_, '_, '_, 'info, Deposit<'info>>,
        amount: u64,
        min_shares_out: u64,
    ) -> Result<()> {
        instructions::deposit::handler_deposit(ctx, amount, min_shares_out)
    }

    /// Burn ledger shares and withdraw want tokens (withdraw fee applies)
    ///
    /// # Arguments
    /// * `shares` - Ledger shares to burn
    pub fn withdraw<'info>(
        ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
        shares: u64,
    ) -> Result<()> {
        instructions::withdraw::handler_withdraw(ctx, shares)
    }

    /// Transfer ledger shares between holders. On maximizer vaults both
    /// sides settle their earnings claim before the balances change.
    pub fn transfer_shares(ctx: Context<TransferShares>, amount: u64) -> Result<()> {
        instructions::transfer_shares::handler_transfer_shares(ctx, amount)
    }

    // =========================================================================
    // Keeper Operations
    // =========================================================================

    /// Run one harvest-swap-recompound cycle. Throttled per vault; with
    /// `best_effort` set (batch sweeps), harvest failures and unroutable or
    /// out-of-band swap legs become per-vault EarnSkipped reports instead of
    /// errors.
    pub fn earn<'info>(
        ctx: Context<'_, '_, '_, 'info, Earn<'info>>,
        best_effort: bool,
        adapter_accounts_len: u8,
    ) -> Result<()> {
        instructions::earn::handler_earn(ctx, best_effort, adapter_accounts_len)
    }

    // =========================================================================
    // Maximizer Operations
    // =========================================================================

    /// Lock base-vault shares as maximizer principal
    pub fn deposit_maximizer(ctx: Context<DepositMaximizer>, amount: u64) -> Result<()> {
        instructions::maximizer::handler_deposit_maximizer(ctx, amount)
    }

    /// Burn maximizer shares and unlock base-vault shares
    pub fn withdraw_maximizer(ctx: Context<WithdrawMaximizer>, shares: u64) -> Result<()> {
        instructions::maximizer::handler_withdraw_maximizer(ctx, shares)
    }

    /// Swap the escrowed base-vault output into the target asset and advance
    /// the per-share accumulator
    pub fn harvest_maximizer<'info>(
        ctx: Context<'_, '_, '_, 'info, HarvestMaximizer<'info>>,
    ) -> Result<()> {
        instructions::maximizer::handler_harvest_maximizer(ctx)
    }

    /// Pay out the caller's settled + pending target-asset earnings
    pub fn claim_earnings(ctx: Context<ClaimEarnings>) -> Result<()> {
        instructions::maximizer::handler_claim_earnings(ctx)
    }

    // =========================================================================
    // Admin Operations
    // =========================================================================

    /// Pull the entire external position into the local buffer and flip the
    /// vault into emergency mode (admin only)
    pub fn emergency_withdraw<'info>(
        ctx: Context<'_, '_, '_, 'info, EmergencyWithdraw<'info>>,
    ) -> Result<()> {
        instructions::emergency::handler_emergency_withdraw(ctx)
    }

    /// Pause or unpause a vault (admin only)
    pub fn pause_vault(ctx: Context<AdminVault>, paused: bool) -> Result<()> {
        instructions::admin::handler_pause_vault(ctx, paused)
    }

    /// Update the fee schedule (admin only)
    pub fn update_fees(
        ctx: Context<AdminVault>,
        withdraw_fee_bps: u16,
        earn_fees: Vec<EarnFeeLeg>,
    ) -> Result<()> {
        instructions::admin::handler_update_fees(ctx, withdraw_fee_bps, earn_fees)
    }

    /// Update strategy parameters (admin only)
    pub fn update_strategy_params(
        ctx: Context<AdminVault>,
        slippage_bps: u16,
        dust: u64,
        withdraw_tolerance: u64,
        min_earn_interval: u64,
    ) -> Result<()> {
        instructions::admin::handler_update_strategy_params(
            ctx,
            slippage_bps,
            dust,
            withdraw_tolerance,
            min_earn_interval,
        )
    }

    /// Update the vault size cap (admin only)
    pub fn update_max_vault_size(ctx: Context<AdminVault>, new_cap: u64) -> Result<()> {
        instructions::admin::handler_update_max_vault_size(ctx, new_cap)
    }

    /// Transfer admin rights to a new address (admin only, irreversible)
    pub fn transfer_admin(ctx: Context<TransferAdmin>) -> Result<()> {
        instructions::admin::handler_transfer_admin(ctx)
    }
}
