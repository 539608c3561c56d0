// =============================================================================
// Initialize Maximizer Instruction
// =============================================================================
// Creates a maximizer vault on top of an existing standard vault. The
// maximizer's principal is the base vault's ledger shares, held in a custody
// Holder row owned by the maximizer PDA; it never talks to an external
// staking protocol itself. During the base vault's compound, the
// maximizer-owned fraction of the harvest is exported into the earnings
// escrow instead of being recompounded, and harvest_maximizer later swaps it
// into the target asset.
//
// Composition is a directed edge maximizer -> base, validated acyclic here:
// the base must be a standard vault (no maximizer-on-maximizer, so no chain
// can ever point back at itself) and must not already carry a maximizer.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::adapter::AdapterDescriptor;
use crate::constants::*;
use crate::error::NectarError;
use crate::events::VaultInitialized;
use crate::state::{EarnFeeLeg, Holder, Vault, VaultKind};

/// Accounts required for the initialize_maximizer instruction
#[derive(Accounts)]
#[instruction(vault_id: u64)]
pub struct InitializeMaximizer<'info> {
    /// The admin who will control the maximizer
    #[account(mut)]
    pub admin: Signer<'info>,

    /// The standard vault whose shares become the maximizer's principal
    #[account(
        mut,
        constraint = base_vault.kind == VaultKind::Standard @ NectarError::MaximizerCycle,
        constraint = base_vault.maximizer_vault == Pubkey::default()
            @ NectarError::MaximizerAlreadyLinked,
        constraint = base_vault.admin == admin.key() @ NectarError::AdminOnly,
    )]
    pub base_vault: Account<'info, Vault>,

    /// The maximizer Vault account to create. Seeded under the base vault's
    /// want mint like any other vault over that asset.
    #[account(
        init,
        payer = admin,
        space = 8 + Vault::INIT_SPACE,
        seeds = [VAULT_SEED, base_vault.want_mint.as_ref(), &vault_id.to_le_bytes()],
        bump
    )]
    pub vault: Account<'info, Vault>,

    /// The asset the maximizer compounds the base vault's output into
    pub target_mint: Account<'info, Mint>,

    /// Escrow receiving the base vault's exported reward (base reward mint)
    #[account(
        init,
        payer = admin,
        token::mint = base_reward_mint,
        token::authority = vault,
        seeds = [EARNINGS_ESCROW_SEED, vault.key().as_ref()],
        bump
    )]
    pub earnings_escrow: Account<'info, TokenAccount>,

    /// The base vault's reward mint, used to type the escrow
    #[account(
        constraint = base_reward_mint.key() == base_vault.reward_mint @ NectarError::InvalidMint,
    )]
    pub base_reward_mint: Account<'info, Mint>,

    /// Target-asset vault paying holder claims
    #[account(
        init,
        payer = admin,
        token::mint = target_mint,
        token::authority = vault,
        seeds = [TARGET_VAULT_SEED, vault.key().as_ref()],
        bump
    )]
    pub target_vault: Account<'info, TokenAccount>,

    /// Custody row on the base vault's ledger holding the locked principal
    #[account(
        init,
        payer = admin,
        space = 8 + Holder::INIT_SPACE,
        seeds = [HOLDER_SEED, base_vault.key().as_ref(), vault.key().as_ref()],
        bump
    )]
    pub custody_holder: Account<'info, Holder>,

    /// Venue used for the escrow -> target asset conversion
    /// CHECK: Stored as configuration; every swap CPI targets this program
    pub venue_program: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Handler for initialize_maximizer
pub fn handler_initialize_maximizer(
    ctx: Context<InitializeMaximizer>,
    vault_id: u64,
    earn_fees: Vec<EarnFeeLeg>,
    slippage_bps: u16,
    dust: u64,
    min_earn_interval: u64,
) -> Result<()> {
    let base_vault = &mut ctx.accounts.base_vault;
    let vault = &mut ctx.accounts.vault;

    // self-links are impossible by construction (vault is being created),
    // but the edge is still rejected explicitly
    require!(vault.key() != base_vault.key(), NectarError::MaximizerCycle);

    // =========================================================================
    // Link both directions of the composition edge
    // =========================================================================

    base_vault.maximizer_vault = vault.key();

    vault.admin = ctx.accounts.admin.key();
    vault.vault_id = vault_id;
    vault.kind = VaultKind::Maximizer;
    vault.base_vault = base_vault.key();
    vault.maximizer_vault = Pubkey::default();

    // principal is base shares; the want/reward fields mirror the base so
    // token account constraints stay checkable
    vault.want_mint = base_vault.want_mint;
    vault.want_vault = Pubkey::default();
    vault.reward_mint = base_vault.reward_mint;
    vault.reward_vault = Pubkey::default();
    vault.venue_program = ctx.accounts.venue_program.key();
    vault.adapter = AdapterDescriptor::default();

    vault.target_mint = ctx.accounts.target_mint.key();
    vault.target_vault = ctx.accounts.target_vault.key();
    vault.earnings_escrow = ctx.accounts.earnings_escrow.key();
    vault.acc_output_per_share = 0;

    // =========================================================================
    // Share accounting
    // =========================================================================

    vault.total_shares = 0;
    vault.total_underlying = 0;
    vault.holder_count = 0;

    // =========================================================================
    // Fees: maximizer earn fees are taken in the target asset at harvest;
    // principal moves carry no withdraw fee
    // =========================================================================

    vault.withdraw_fee_bps = 0;
    vault.withdraw_fee_recipient = Pubkey::default();
    vault.earn_fees = earn_fees;
    vault.validate_fees()?;

    // =========================================================================
    // Strategy parameters
    // =========================================================================

    vault.slippage_bps = slippage_bps;
    vault.dust = dust;
    vault.withdraw_tolerance = 0;
    vault.min_earn_interval = min_earn_interval;
    vault.last_earn_slot = 0;
    vault.validate_strategy_params()?;

    vault.locked = false;
    vault.is_paused = false;
    vault.emergency_mode = false;
    vault.max_vault_size = DEFAULT_MAX_VAULT_SIZE;

    vault.total_harvested = 0;
    vault.earn_count = 0;

    vault.bump = ctx.bumps.vault;
    vault.want_vault_bump = 0;
    vault.reward_vault_bump = 0;

    // =========================================================================
    // Custody row
    // =========================================================================

    let custody = &mut ctx.accounts.custody_holder;
    custody.vault = base_vault.key();
    custody.owner = vault.key();
    custody.shares = 0;
    custody.earnings_offset = 0;
    custody.settled_earnings = 0;
    custody.bump = ctx.bumps.custody_holder;

    msg!("NECTAR maximizer initialized");
    msg!("Maximizer: {}", vault.key());
    msg!("Base vault: {}", base_vault.key());
    msg!("Target mint: {}", vault.target_mint);

    emit!(VaultInitialized {
        vault: vault.key(),
        want_mint: vault.want_mint,
        vault_id,
        is_maximizer: true,
    });

    Ok(())
}
