// =============================================================================
// Initialize Vault Instruction
// =============================================================================
// Creates a standard NECTAR vault over one external staking integration.
//
// Creates:
// - Vault account (configuration + share accounting)
// - Want buffer token account (transient principal between user and adapter)
// - Reward buffer token account (harvest landing zone)
//
// The adapter descriptor is validated once here and treated as immutable for
// the life of the vault.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::adapter::AdapterDescriptor;
use crate::constants::*;
use crate::error::NectarError;
use crate::events::VaultInitialized;
use crate::state::{EarnFeeLeg, Vault, VaultKind};

/// Accounts required for the initialize_vault instruction
#[derive(Accounts)]
#[instruction(vault_id: u64)]
pub struct InitializeVault<'info> {
    /// The admin who will control the vault
    #[account(mut)]
    pub admin: Signer<'info>,

    /// The Vault account to create
    #[account(
        init,
        payer = admin,
        space = 8 + Vault::INIT_SPACE,
        seeds = [VAULT_SEED, want_mint.key().as_ref(), &vault_id.to_le_bytes()],
        bump
    )]
    pub vault: Account<'info, Vault>,

    /// The asset users deposit and the strategy compounds
    pub want_mint: Account<'info, Mint>,

    /// The asset the external protocol pays out
    pub reward_mint: Account<'info, Mint>,

    /// Transient want buffer (PDA-owned)
    #[account(
        init,
        payer = admin,
        token::mint = want_mint,
        token::authority = vault,
        seeds = [WANT_VAULT_SEED, vault.key().as_ref()],
        bump
    )]
    pub want_vault: Account<'info, TokenAccount>,

    /// Harvest landing zone (PDA-owned)
    #[account(
        init,
        payer = admin,
        token::mint = reward_mint,
        token::authority = vault,
        seeds = [REWARD_VAULT_SEED, vault.key().as_ref()],
        bump
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    /// External token account receiving the withdraw fee (want mint)
    #[account(
        constraint = withdraw_fee_recipient.mint == want_mint.key() @ NectarError::InvalidMint,
    )]
    pub withdraw_fee_recipient: Account<'info, TokenAccount>,

    /// The swap venue (router) program used for compounding conversions
    /// CHECK: Stored as configuration; every swap CPI targets this program
    pub venue_program: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Handler for initialize_vault
///
/// # Arguments
/// * `vault_id` - Disambiguates multiple vaults over the same want mint
/// * `adapter` - Immutable calling convention for the external protocol
/// * `withdraw_fee_bps` - Withdraw fee rate
/// * `earn_fees` - Earn-fee legs taken from each harvest
/// * `slippage_bps` - Swap tolerance band
/// * `dust` - Minimum raw units worth swapping/depositing
/// * `withdraw_tolerance` - Slack units for adapter withdrawal rounding
/// * `min_earn_interval` - Throttle between compounds, in slots
#[allow(clippy::too_many_arguments)]
pub fn handler_initialize_vault(
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
    adapter.validate()?;

    let vault = &mut ctx.accounts.vault;

    // =========================================================================
    // Store account references and configuration
    // =========================================================================

    vault.admin = ctx.accounts.admin.key();
    vault.vault_id = vault_id;
    vault.kind = VaultKind::Standard;
    vault.want_mint = ctx.accounts.want_mint.key();
    vault.want_vault = ctx.accounts.want_vault.key();
    vault.reward_mint = ctx.accounts.reward_mint.key();
    vault.reward_vault = ctx.accounts.reward_vault.key();
    vault.venue_program = ctx.accounts.venue_program.key();
    vault.adapter = adapter;

    // =========================================================================
    // Initialize share accounting
    // =========================================================================

    vault.total_shares = 0;
    vault.total_underlying = 0;
    vault.holder_count = 0;

    // =========================================================================
    // Fee schedule
    // =========================================================================

    vault.withdraw_fee_bps = withdraw_fee_bps;
    vault.withdraw_fee_recipient = ctx.accounts.withdraw_fee_recipient.key();
    vault.earn_fees = earn_fees;
    vault.validate_fees()?;

    // =========================================================================
    // Strategy parameters
    // =========================================================================

    vault.slippage_bps = slippage_bps;
    vault.dust = dust;
    vault.withdraw_tolerance = withdraw_tolerance;
    vault.min_earn_interval = min_earn_interval;
    vault.last_earn_slot = 0;
    vault.validate_strategy_params()?;

    // =========================================================================
    // Guards, lifecycle, composition defaults
    // =========================================================================

    vault.locked = false;
    vault.is_paused = false;
    vault.emergency_mode = false;
    vault.max_vault_size = DEFAULT_MAX_VAULT_SIZE;

    vault.base_vault = Pubkey::default();
    vault.maximizer_vault = Pubkey::default();
    vault.target_mint = Pubkey::default();
    vault.target_vault = Pubkey::default();
    vault.earnings_escrow = Pubkey::default();
    vault.acc_output_per_share = 0;

    vault.total_harvested = 0;
    vault.earn_count = 0;

    vault.bump = ctx.bumps.vault;
    vault.want_vault_bump = ctx.bumps.want_vault;
    vault.reward_vault_bump = ctx.bumps.reward_vault;

    msg!("NECTAR vault initialized");
    msg!("Vault: {}", vault.key());
    msg!("Want mint: {}", vault.want_mint);
    msg!("Reward mint: {}", vault.reward_mint);
    msg!("Adapter target: {}", vault.adapter.target_program);

    emit!(VaultInitialized {
        vault: vault.key(),
        want_mint: vault.want_mint,
        vault_id,
        is_maximizer: false,
    });

    Ok(())
}
