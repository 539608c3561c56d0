// =============================================================================
// Deposit Instruction
// =============================================================================
// Deposits want tokens into a standard vault and credits ledger shares.
//
// Flow:
// 1. Shares to mint are computed against the pre-deposit underlying
// 2. Want is transferred from the user into the want buffer
// 3. The adapter stakes the buffer into the external protocol
// 4. total_underlying is re-read from the adapter's balance query
// 5. Holder row and vault totals are credited
//
// Share calculation:
// - First deposit: shares = amount (1:1), gated by a minimum first deposit
// - Later deposits: shares = amount * total_shares / total_underlying
//
// The guard flag is held across the external calls; a reentrant call from
// the staking protocol or a token hook fails fast.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::adapter::{self, AdapterOp};
use crate::constants::*;
use crate::error::NectarError;
use crate::events::Deposited;
use crate::state::{Holder, Vault, VaultKind};

/// Accounts required for the deposit instruction
#[derive(Accounts)]
pub struct Deposit<'info> {
    /// The user depositing want tokens
    #[account(mut)]
    pub depositor: Signer<'info>,

    /// The vault to deposit into
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.want_mint.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump,
        constraint = !vault.is_paused @ NectarError::VaultPaused,
        constraint = !vault.emergency_mode @ NectarError::EmergencyMode,
        constraint = vault.kind == VaultKind::Standard @ NectarError::NotAStandardVault,
    )]
    pub vault: Account<'info, Vault>,

    /// The depositor's ledger row, created on first deposit
    #[account(
        init_if_needed,
        payer = depositor,
        space = 8 + Holder::INIT_SPACE,
        seeds = [HOLDER_SEED, vault.key().as_ref(), depositor.key().as_ref()],
        bump
    )]
    pub holder: Account<'info, Holder>,

    /// User's want token account (source of funds)
    #[account(
        mut,
        constraint = user_want_account.mint == vault.want_mint @ NectarError::InvalidMint,
        constraint = user_want_account.owner == depositor.key()
            @ NectarError::InvalidTokenAccountOwner,
    )]
    pub user_want_account: Account<'info, TokenAccount>,

    /// Vault's want buffer (destination, then staked out by the adapter)
    #[account(
        mut,
        seeds = [WANT_VAULT_SEED, vault.key().as_ref()],
        bump = vault.want_vault_bump,
    )]
    pub want_vault: Account<'info, TokenAccount>,

    /// The external staking program named by the adapter descriptor
    /// CHECK: Verified against vault.adapter.target_program before any CPI
    pub adapter_program: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Handler for the deposit instruction.
///
/// Remaining accounts: the pass-through account list the external staking
/// program expects for its deposit and balance-query operations.
///
/// # Arguments
/// * `amount` - Want tokens to deposit (base units)
/// * `min_shares_out` - Minimum shares to receive (0 to skip the check)
pub fn handler_deposit<'info>(
    ctx: Context<'_, '_, '_, 'info, Deposit<'info>>,
    amount: u64,
    min_shares_out: u64,
) -> Result<()> {
    // =========================================================================
    // Input validation - everything rejected before any external call
    // =========================================================================

    require!(amount > 0, NectarError::InvalidAmount);
    require!(
        ctx.accounts.user_want_account.amount >= amount,
        NectarError::InsufficientBalance
    );

    let vault = &ctx.accounts.vault;

    // First-deposit bootstrap fixes the share price at 1:1. A dust-sized
    // first deposit would let a direct donation inflate the share price until
    // later depositors round to zero shares, so it is gated.
    if vault.total_shares == 0 {
        require!(amount >= MIN_FIRST_DEPOSIT, NectarError::BelowMinimumDeposit);
    }

    let new_total = vault
        .total_underlying
        .checked_add(amount)
        .ok_or(error!(NectarError::MathOverflow))?;
    require!(
        new_total <= vault.max_vault_size,
        NectarError::ExceedsMaxVaultSize
    );

    // Shares are computed against the pre-deposit underlying
    let shares_to_mint = vault.calculate_shares_to_mint(amount)?;
    require!(shares_to_mint >= MIN_SHARES_MINTED, NectarError::ShareAmountZero);
    if min_shares_out > 0 {
        require!(shares_to_mint >= min_shares_out, NectarError::SlippageExceeded);
    }

    // =========================================================================
    // Guard: held across every external call below
    // =========================================================================

    ctx.accounts.vault.lock()?;

    // =========================================================================
    // Transfer want: user -> want buffer
    // =========================================================================

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.user_want_account.to_account_info(),
                to: ctx.accounts.want_vault.to_account_info(),
                authority: ctx.accounts.depositor.to_account_info(),
            },
        ),
        amount,
    )?;

    // =========================================================================
    // Stake the buffer through the adapter
    // =========================================================================

    let descriptor = ctx.accounts.vault.adapter;
    let vault_key = ctx.accounts.vault.key();
    let want_mint_key = ctx.accounts.vault.want_mint;
    let vault_id_bytes = ctx.accounts.vault.vault_id.to_le_bytes();
    let vault_seeds = &[
        VAULT_SEED,
        want_mint_key.as_ref(),
        &vault_id_bytes,
        &[ctx.accounts.vault.bump],
    ];
    let signer_seeds = &[&vault_seeds[..]];

    adapter::invoke_adapter(
        &descriptor,
        AdapterOp::Deposit,
        Some(amount),
        &ctx.accounts.adapter_program.to_account_info(),
        ctx.remaining_accounts,
        &vault_key,
        signer_seeds,
    )?;

    // The adapter's live balance is authoritative, not our arithmetic
    let staked_balance = adapter::query_staked_balance(
        &descriptor,
        &ctx.accounts.adapter_program.to_account_info(),
        ctx.remaining_accounts,
        &vault_key,
        signer_seeds,
    )?;

    // =========================================================================
    // Credit the holder row
    // =========================================================================

    let clock = Clock::get()?;
    let holder = &mut ctx.accounts.holder;
    let is_new_position = holder.shares == 0;

    if holder.owner == Pubkey::default() {
        holder.vault = vault_key;
        holder.owner = ctx.accounts.depositor.key();
        holder.bump = ctx.bumps.holder;
    }

    holder.add_shares(shares_to_mint)?;
    holder.record_deposit(amount, clock.unix_timestamp)?;

    // =========================================================================
    // Update vault totals and release the guard
    // =========================================================================

    let vault = &mut ctx.accounts.vault;

    vault.total_underlying = staked_balance;
    vault.total_shares = vault
        .total_shares
        .checked_add(shares_to_mint)
        .ok_or(error!(NectarError::MathOverflow))?;
    if is_new_position {
        vault.holder_count = vault
            .holder_count
            .checked_add(1)
            .ok_or(error!(NectarError::MathOverflow))?;
    }

    vault.unlock();

    msg!("Deposited {} want for {} shares", amount, shares_to_mint);
    msg!("Vault total shares: {}", vault.total_shares);
    msg!("Vault total underlying: {}", vault.total_underlying);

    emit!(Deposited {
        vault: vault_key,
        holder: ctx.accounts.depositor.key(),
        amount,
        shares_minted: shares_to_mint,
        total_shares: vault.total_shares,
        total_underlying: vault.total_underlying,
    });

    Ok(())
}
