// =============================================================================
// Maximizer Instructions
// =============================================================================
// The four operations of a maximizer vault:
//
// - deposit_maximizer: lock base-vault shares as principal, mint maximizer
//   shares
// - withdraw_maximizer: burn maximizer shares, unlock base-vault shares
// - harvest_maximizer: swap the escrowed base-vault output into the target
//   asset and advance the per-share accumulator
// - claim_earnings: pay a holder's settled + pending target-asset claim
//
// Principal never compounds inside the maximizer (growth happens in the base
// vault and arrives through the export flow), so total_underlying is simply
// the custody row's share count, re-read after every move.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::error::NectarError;
use crate::events::{Deposited, EarnSkipped, EarningsClaimed, MaximizerHarvested, SkipReason, Withdrawn};
use crate::state::{Holder, SwapPath, Vault, VaultKind};
use crate::venue;

// =============================================================================
// Deposit
// =============================================================================

/// Accounts required for the deposit_maximizer instruction
#[derive(Accounts)]
pub struct DepositMaximizer<'info> {
    /// The user locking base-vault shares
    #[account(mut)]
    pub depositor: Signer<'info>,

    /// The maximizer vault
    #[account(
        mut,
        constraint = vault.kind == VaultKind::Maximizer @ NectarError::NotAMaximizer,
        constraint = !vault.is_paused @ NectarError::VaultPaused,
    )]
    pub vault: Account<'info, Vault>,

    /// The base vault whose shares are the principal
    #[account(
        mut,
        constraint = base_vault.key() == vault.base_vault @ NectarError::InvalidMaximizerAccounts,
    )]
    pub base_vault: Account<'info, Vault>,

    /// The user's row on the base vault's ledger (source of principal)
    #[account(
        mut,
        seeds = [HOLDER_SEED, base_vault.key().as_ref(), depositor.key().as_ref()],
        bump = user_base_holder.bump,
        constraint = user_base_holder.owner == depositor.key() @ NectarError::InvalidHolder,
    )]
    pub user_base_holder: Account<'info, Holder>,

    /// The maximizer's custody row on the base vault's ledger
    #[account(
        mut,
        seeds = [HOLDER_SEED, base_vault.key().as_ref(), vault.key().as_ref()],
        bump = custody_holder.bump,
        constraint = custody_holder.owner == vault.key() @ NectarError::InvalidHolder,
    )]
    pub custody_holder: Account<'info, Holder>,

    /// The user's row on the maximizer's ledger, created on first deposit
    #[account(
        init_if_needed,
        payer = depositor,
        space = 8 + Holder::INIT_SPACE,
        seeds = [HOLDER_SEED, vault.key().as_ref(), depositor.key().as_ref()],
        bump
    )]
    pub holder: Account<'info, Holder>,

    pub system_program: Program<'info, System>,
}

/// Handler for deposit_maximizer
///
/// # Arguments
/// * `amount` - Base-vault shares to lock
pub fn handler_deposit_maximizer(ctx: Context<DepositMaximizer>, amount: u64) -> Result<()> {
    require!(amount > 0, NectarError::InvalidAmount);
    require!(
        !ctx.accounts.vault.locked && !ctx.accounts.base_vault.locked,
        NectarError::ReentrantOperation
    );
    require!(
        ctx.accounts.user_base_holder.shares >= amount,
        NectarError::InsufficientShares
    );

    let vault = &ctx.accounts.vault;
    if vault.total_shares == 0 {
        require!(amount >= MIN_FIRST_DEPOSIT, NectarError::BelowMinimumDeposit);
    }
    let shares_to_mint = vault.calculate_shares_to_mint(amount)?;
    require!(shares_to_mint >= MIN_SHARES_MINTED, NectarError::ShareAmountZero);

    let vault_key = vault.key();
    let acc = vault.acc_output_per_share;

    // =========================================================================
    // Move principal on the base ledger
    // =========================================================================

    let user_base_holder = &mut ctx.accounts.user_base_holder;
    let custody_holder = &mut ctx.accounts.custody_holder;
    let base_position_closed = {
        user_base_holder.sub_shares(amount)?;
        custody_holder.add_shares(amount)?;
        user_base_holder.shares == 0
    };
    if base_position_closed {
        let base_vault = &mut ctx.accounts.base_vault;
        base_vault.holder_count = base_vault
            .holder_count
            .checked_sub(1)
            .ok_or(error!(NectarError::MathUnderflow))?;
    }

    // =========================================================================
    // Credit the maximizer row - settle before the share count changes
    // =========================================================================

    let clock = Clock::get()?;
    let holder = &mut ctx.accounts.holder;
    let is_new_position = holder.shares == 0;

    if holder.owner == Pubkey::default() {
        holder.vault = vault_key;
        holder.owner = ctx.accounts.depositor.key();
        holder.bump = ctx.bumps.holder;
        holder.earnings_offset = acc;
    }

    holder.settle_earnings(acc)?;
    holder.add_shares(shares_to_mint)?;
    holder.record_deposit(amount, clock.unix_timestamp)?;

    let vault = &mut ctx.accounts.vault;
    vault.total_shares = vault
        .total_shares
        .checked_add(shares_to_mint)
        .ok_or(error!(NectarError::MathOverflow))?;
    // the custody row is the authoritative underlying
    vault.total_underlying = ctx.accounts.custody_holder.shares;
    if is_new_position {
        vault.holder_count = vault
            .holder_count
            .checked_add(1)
            .ok_or(error!(NectarError::MathOverflow))?;
    }

    msg!("Locked {} base shares for {} maximizer shares", amount, shares_to_mint);

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

// =============================================================================
// Withdraw
// =============================================================================

/// Accounts required for the withdraw_maximizer instruction
#[derive(Accounts)]
pub struct WithdrawMaximizer<'info> {
    /// The user unlocking base-vault shares
    #[account(mut)]
    pub withdrawer: Signer<'info>,

    /// The maximizer vault
    #[account(
        mut,
        constraint = vault.kind == VaultKind::Maximizer @ NectarError::NotAMaximizer,
        constraint = !vault.is_paused @ NectarError::VaultPaused,
    )]
    pub vault: Account<'info, Vault>,

    /// The base vault whose shares are the principal
    #[account(
        mut,
        constraint = base_vault.key() == vault.base_vault @ NectarError::InvalidMaximizerAccounts,
    )]
    pub base_vault: Account<'info, Vault>,

    /// The user's row on the base vault's ledger (destination of principal)
    #[account(
        mut,
        seeds = [HOLDER_SEED, base_vault.key().as_ref(), withdrawer.key().as_ref()],
        bump = user_base_holder.bump,
        constraint = user_base_holder.owner == withdrawer.key() @ NectarError::InvalidHolder,
    )]
    pub user_base_holder: Account<'info, Holder>,

    /// The maximizer's custody row on the base vault's ledger
    #[account(
        mut,
        seeds = [HOLDER_SEED, base_vault.key().as_ref(), vault.key().as_ref()],
        bump = custody_holder.bump,
        constraint = custody_holder.owner == vault.key() @ NectarError::InvalidHolder,
    )]
    pub custody_holder: Account<'info, Holder>,

    /// The user's row on the maximizer's ledger
    #[account(
        mut,
        seeds = [HOLDER_SEED, vault.key().as_ref(), withdrawer.key().as_ref()],
        bump = holder.bump,
        constraint = holder.owner == withdrawer.key() @ NectarError::InvalidHolder,
    )]
    pub holder: Account<'info, Holder>,
}

/// Handler for withdraw_maximizer
///
/// # Arguments
/// * `shares` - Maximizer shares to burn
pub fn handler_withdraw_maximizer(ctx: Context<WithdrawMaximizer>, shares: u64) -> Result<()> {
    require!(shares > 0, NectarError::InvalidAmount);
    require!(
        !ctx.accounts.vault.locked && !ctx.accounts.base_vault.locked,
        NectarError::ReentrantOperation
    );
    require!(
        ctx.accounts.holder.shares >= shares,
        NectarError::InsufficientShares
    );

    // owed principal fixed before any mutation, floor favoring the pool
    let amount_owed = ctx.accounts.vault.calculate_withdrawal_amount(shares)?;
    require!(amount_owed > 0, NectarError::InvalidAmount);

    let vault_key = ctx.accounts.vault.key();
    let acc = ctx.accounts.vault.acc_output_per_share;

    // =========================================================================
    // Burn maximizer shares - settle before the share count changes
    // =========================================================================

    let clock = Clock::get()?;
    let holder = &mut ctx.accounts.holder;
    holder.settle_earnings(acc)?;
    holder.sub_shares(shares)?;
    holder.record_withdrawal(amount_owed, clock.unix_timestamp)?;
    let position_closed = holder.shares == 0;

    // =========================================================================
    // Return principal on the base ledger
    // =========================================================================

    let user_base_holder = &mut ctx.accounts.user_base_holder;
    let custody_holder = &mut ctx.accounts.custody_holder;
    let base_position_was_empty = user_base_holder.shares == 0;
    custody_holder.sub_shares(amount_owed)?;
    user_base_holder.add_shares(amount_owed)?;
    if base_position_was_empty {
        let base_vault = &mut ctx.accounts.base_vault;
        base_vault.holder_count = base_vault
            .holder_count
            .checked_add(1)
            .ok_or(error!(NectarError::MathOverflow))?;
    }

    let vault = &mut ctx.accounts.vault;
    vault.total_shares = vault
        .total_shares
        .checked_sub(shares)
        .ok_or(error!(NectarError::MathUnderflow))?;
    vault.total_underlying = ctx.accounts.custody_holder.shares;
    if position_closed {
        vault.holder_count = vault
            .holder_count
            .checked_sub(1)
            .ok_or(error!(NectarError::MathUnderflow))?;
    }

    msg!("Unlocked {} base shares for {} maximizer shares", amount_owed, shares);

    emit!(Withdrawn {
        vault: vault_key,
        holder: ctx.accounts.withdrawer.key(),
        shares_burned: shares,
        amount_returned: amount_owed,
        fee_paid: 0,
        total_shares: vault.total_shares,
        total_underlying: vault.total_underlying,
    });

    Ok(())
}

// =============================================================================
// Harvest
// =============================================================================

/// Accounts required for the harvest_maximizer instruction
#[derive(Accounts)]
pub struct HarvestMaximizer<'info> {
    /// Anyone may crank the harvest
    #[account(mut)]
    pub caller: Signer<'info>,

    /// The maximizer vault
    #[account(
        mut,
        constraint = vault.kind == VaultKind::Maximizer @ NectarError::NotAMaximizer,
        constraint = !vault.is_paused @ NectarError::VaultPaused,
    )]
    pub vault: Account<'info, Vault>,

    /// Escrowed base-vault output waiting to be converted
    #[account(
        mut,
        constraint = earnings_escrow.key() == vault.earnings_escrow
            @ NectarError::InvalidVaultTokenAccount,
    )]
    pub earnings_escrow: Account<'info, TokenAccount>,

    /// Target-asset vault paying holder claims
    #[account(
        mut,
        constraint = target_vault.key() == vault.target_vault
            @ NectarError::InvalidVaultTokenAccount,
    )]
    pub target_vault: Account<'info, TokenAccount>,

    /// Earn-fee recipients (target mint), one per configured leg
    #[account(mut)]
    pub fee_recipient_0: Option<Account<'info, TokenAccount>>,
    #[account(mut)]
    pub fee_recipient_1: Option<Account<'info, TokenAccount>>,
    #[account(mut)]
    pub fee_recipient_2: Option<Account<'info, TokenAccount>>,

    /// Cached route base-reward -> target
    pub swap_path: Option<Account<'info, SwapPath>>,

    /// The configured swap venue
    /// CHECK: Verified against vault.venue_program before any CPI
    pub venue_program: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
}

/// Handler for harvest_maximizer.
///
/// Remaining accounts are forwarded to the swap venue.
pub fn handler_harvest_maximizer<'info>(
    ctx: Context<'_, '_, '_, 'info, HarvestMaximizer<'info>>,
) -> Result<()> {
    let vault_key = ctx.accounts.vault.key();
    let clock = Clock::get()?;

    if !ctx.accounts.vault.throttle_allows(clock.slot) {
        emit!(EarnSkipped { vault: vault_key, reason: SkipReason::ThrottleNotElapsed });
        return Ok(());
    }

    require!(
        ctx.accounts.venue_program.key() == ctx.accounts.vault.venue_program,
        NectarError::InvalidAuthority
    );

    ctx.accounts.vault.lock()?;

    let escrowed = ctx.accounts.earnings_escrow.amount;
    if escrowed <= ctx.accounts.vault.dust {
        emit!(EarnSkipped { vault: vault_key, reason: SkipReason::DustBelowThreshold });
        ctx.accounts.vault.unlock();
        return Ok(());
    }

    // output accrues per share; with no shares outstanding there is nobody
    // to credit, so the escrow waits
    if ctx.accounts.vault.total_shares == 0 {
        emit!(EarnSkipped { vault: vault_key, reason: SkipReason::NoSharesOutstanding });
        ctx.accounts.vault.unlock();
        return Ok(());
    }

    let reward_mint_key = ctx.accounts.vault.reward_mint;
    let target_mint_key = ctx.accounts.vault.target_mint;
    let want_mint_key = ctx.accounts.vault.want_mint;
    let vault_id_bytes = ctx.accounts.vault.vault_id.to_le_bytes();
    let vault_seeds = &[
        VAULT_SEED,
        want_mint_key.as_ref(),
        &vault_id_bytes,
        &[ctx.accounts.vault.bump],
    ];
    let signer_seeds = &[&vault_seeds[..]];

    // =========================================================================
    // Swap escrow -> target inside the slippage band
    // =========================================================================

    let route = match ctx.accounts.swap_path.as_ref() {
        Some(path)
            if path.is_routable()
                && path.venue == ctx.accounts.vault.venue_program
                && path.token_in == reward_mint_key
                && path.token_out == target_mint_key =>
        {
            path.hops.clone()
        }
        _ => {
            emit!(EarnSkipped { vault: vault_key, reason: SkipReason::UnroutablePath });
            ctx.accounts.vault.unlock();
            return Ok(());
        }
    };

    let quote = venue::quote_amounts_out(
        &ctx.accounts.venue_program.to_account_info(),
        escrowed,
        &route,
        ctx.remaining_accounts,
        &vault_key,
        signer_seeds,
    )?;
    let min_out = venue::min_out_for_quote(quote, ctx.accounts.vault.slippage_bps)?;

    let target_before = ctx.accounts.target_vault.amount;

    let mut swap_accounts = vec![
        ctx.accounts.earnings_escrow.to_account_info(),
        ctx.accounts.target_vault.to_account_info(),
        ctx.accounts.vault.to_account_info(),
    ];
    swap_accounts.extend_from_slice(ctx.remaining_accounts);

    let swapped = venue::swap_exact_input(
        &ctx.accounts.venue_program.to_account_info(),
        escrowed,
        min_out,
        &route,
        &swap_accounts,
        &vault_key,
        signer_seeds,
    );
    if swapped.is_err() {
        emit!(EarnSkipped { vault: vault_key, reason: SkipReason::SlippageExceeded });
        ctx.accounts.vault.unlock();
        return Ok(());
    }

    ctx.accounts.target_vault.reload()?;
    let delta = ctx
        .accounts
        .target_vault
        .amount
        .checked_sub(target_before)
        .ok_or(error!(NectarError::MathUnderflow))?;

    // =========================================================================
    // Fee legs in the target asset, then accrue the remainder per share
    // =========================================================================

    let fee_amounts = ctx.accounts.vault.earn_fee_amounts(delta)?;
    let recipients = [
        ctx.accounts.fee_recipient_0.as_ref(),
        ctx.accounts.fee_recipient_1.as_ref(),
        ctx.accounts.fee_recipient_2.as_ref(),
    ];

    let mut fees_paid: u64 = 0;
    for (i, cut) in fee_amounts.iter().enumerate() {
        if *cut == 0 {
            continue;
        }
        let leg = ctx.accounts.vault.earn_fees[i];
        let recipient = recipients[i].ok_or(error!(NectarError::InvalidFeeRecipient))?;
        require!(
            recipient.key() == leg.recipient,
            NectarError::InvalidFeeRecipient
        );

        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.target_vault.to_account_info(),
                    to: recipient.to_account_info(),
                    authority: ctx.accounts.vault.to_account_info(),
                },
                signer_seeds,
            ),
            *cut,
        )?;
        fees_paid = fees_paid
            .checked_add(*cut)
            .ok_or(error!(NectarError::MathOverflow))?;
    }

    let accrued = delta
        .checked_sub(fees_paid)
        .ok_or(error!(NectarError::MathUnderflow))?;

    let vault = &mut ctx.accounts.vault;
    vault.accrue_output(accrued)?;
    vault.total_harvested = vault
        .total_harvested
        .checked_add(escrowed)
        .ok_or(error!(NectarError::MathOverflow))?;
    vault.earn_count = vault
        .earn_count
        .checked_add(1)
        .ok_or(error!(NectarError::MathOverflow))?;
    vault.last_earn_slot = clock.slot;

    vault.unlock();

    msg!(
        "Maximizer harvested: {} escrow swapped to {} target ({} fees)",
        escrowed,
        delta,
        fees_paid
    );

    emit!(MaximizerHarvested {
        vault: vault_key,
        swapped_in: escrowed,
        target_out: delta,
        acc_output_per_share: ctx.accounts.vault.acc_output_per_share,
    });

    Ok(())
}

// =============================================================================
// Claim
// =============================================================================

/// Accounts required for the claim_earnings instruction
#[derive(Accounts)]
pub struct ClaimEarnings<'info> {
    /// The holder claiming their target-asset earnings
    #[account(mut)]
    pub claimer: Signer<'info>,

    /// The maximizer vault
    #[account(
        constraint = vault.kind == VaultKind::Maximizer @ NectarError::NotAMaximizer,
        constraint = !vault.is_paused @ NectarError::VaultPaused,
    )]
    pub vault: Account<'info, Vault>,

    /// The claimer's row on the maximizer's ledger
    #[account(
        mut,
        seeds = [HOLDER_SEED, vault.key().as_ref(), claimer.key().as_ref()],
        bump = holder.bump,
        constraint = holder.owner == claimer.key() @ NectarError::InvalidHolder,
    )]
    pub holder: Account<'info, Holder>,

    /// Target-asset vault paying the claim
    #[account(
        mut,
        constraint = target_vault.key() == vault.target_vault
            @ NectarError::InvalidVaultTokenAccount,
    )]
    pub target_vault: Account<'info, TokenAccount>,

    /// The claimer's target-asset token account
    #[account(
        mut,
        constraint = user_target_account.mint == vault.target_mint @ NectarError::InvalidMint,
        constraint = user_target_account.owner == claimer.key()
            @ NectarError::InvalidTokenAccountOwner,
    )]
    pub user_target_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

/// Handler for claim_earnings
pub fn handler_claim_earnings(ctx: Context<ClaimEarnings>) -> Result<()> {
    require!(!ctx.accounts.vault.locked, NectarError::ReentrantOperation);

    let acc = ctx.accounts.vault.acc_output_per_share;
    let holder = &mut ctx.accounts.holder;

    holder.settle_earnings(acc)?;
    let amount = holder.take_settled_earnings()?;
    require!(amount > 0, NectarError::NoEarningsToClaim);
    require!(
        ctx.accounts.target_vault.amount >= amount,
        NectarError::InsufficientBalance
    );

    let want_mint_key = ctx.accounts.vault.want_mint;
    let vault_id_bytes = ctx.accounts.vault.vault_id.to_le_bytes();
    let vault_seeds = &[
        VAULT_SEED,
        want_mint_key.as_ref(),
        &vault_id_bytes,
        &[ctx.accounts.vault.bump],
    ];
    let signer_seeds = &[&vault_seeds[..]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.target_vault.to_account_info(),
                to: ctx.accounts.user_target_account.to_account_info(),
                authority: ctx.accounts.vault.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )?;

    msg!("Claimed {} target-asset earnings", amount);

    emit!(EarningsClaimed {
        vault: ctx.accounts.vault.key(),
        holder: ctx.accounts.claimer.key(),
        amount,
    });

    Ok(())
}
