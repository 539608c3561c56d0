// =============================================================================
// Withdraw Instruction
// =============================================================================
// Burns ledger shares and returns want tokens.
//
// Flow:
// 1. amount_owed = shares * total_underlying / total_shares, computed BEFORE
//    any state mutation (floor - rounding favors the pool)
// 2. The adapter is asked for slightly more than owed (withdraw_tolerance
//    raw units of slack) to absorb external rounding; the amount actually
//    received must cover at least what is owed
// 3. The withdraw fee is taken from the amount being returned, the net goes
//    to the holder
// 4. total_underlying is re-read from the adapter (never derived by
//    subtraction - a compound in the same slot may have moved it)
//
// In emergency mode the position already sits in the local want buffer and
// the adapter is bypassed entirely.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::adapter::{self, AdapterOp};
use crate::constants::*;
use crate::error::NectarError;
use crate::events::Withdrawn;
use crate::state::{Holder, Vault, VaultKind};

/// Accounts required for the withdraw instruction
#[derive(Accounts)]
pub struct Withdraw<'info> {
    /// The user withdrawing
    #[account(mut)]
    pub withdrawer: Signer<'info>,

    /// The vault to withdraw from
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.want_mint.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump,
        constraint = !vault.is_paused @ NectarError::VaultPaused,
        constraint = vault.kind == VaultKind::Standard @ NectarError::NotAStandardVault,
    )]
    pub vault: Account<'info, Vault>,

    /// The withdrawer's ledger row
    #[account(
        mut,
        seeds = [HOLDER_SEED, vault.key().as_ref(), withdrawer.key().as_ref()],
        bump = holder.bump,
        constraint = holder.owner == withdrawer.key() @ NectarError::InvalidHolder,
    )]
    pub holder: Account<'info, Holder>,

    /// User's want token account (destination)
    #[account(
        mut,
        constraint = user_want_account.mint == vault.want_mint @ NectarError::InvalidMint,
        constraint = user_want_account.owner == withdrawer.key()
            @ NectarError::InvalidTokenAccountOwner,
    )]
    pub user_want_account: Account<'info, TokenAccount>,

    /// Vault's want buffer (adapter unstakes into it, payouts leave it)
    #[account(
        mut,
        seeds = [WANT_VAULT_SEED, vault.key().as_ref()],
        bump = vault.want_vault_bump,
    )]
    pub want_vault: Account<'info, TokenAccount>,

    /// Token account receiving the withdraw fee
    #[account(
        mut,
        constraint = withdraw_fee_recipient.key() == vault.withdraw_fee_recipient
            @ NectarError::InvalidFeeRecipient,
    )]
    pub withdraw_fee_recipient: Account<'info, TokenAccount>,

    /// The external staking program named by the adapter descriptor
    /// CHECK: Verified against vault.adapter.target_program before any CPI
    pub adapter_program: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
}

/// Handler for the withdraw instruction.
///
/// Remaining accounts: the pass-through account list the external staking
/// program expects for its withdraw and balance-query operations. Ignored in
/// emergency mode.
///
/// # Arguments
/// * `shares` - Ledger shares to burn
pub fn handler_withdraw<'info>(
    ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
    shares: u64,
) -> Result<()> {
    // =========================================================================
    // Input validation - rejected before any external call
    // =========================================================================

    require!(shares > 0, NectarError::InvalidAmount);
    require!(
        ctx.accounts.holder.shares >= shares,
        NectarError::InsufficientShares
    );
    require!(
        ctx.accounts.vault.total_shares >= shares,
        NectarError::InsufficientShares
    );

    // Owed amount is fixed before anything moves
    let amount_owed = ctx.accounts.vault.calculate_withdrawal_amount(shares)?;
    require!(amount_owed > 0, NectarError::InvalidAmount);

    ctx.accounts.vault.lock()?;

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

    // =========================================================================
    // Pull funds from the external protocol (or the local buffer)
    // =========================================================================

    let emergency = ctx.accounts.vault.emergency_mode;
    let new_underlying: u64;

    if emergency {
        require!(
            ctx.accounts.want_vault.amount >= amount_owed,
            NectarError::InsufficientBalance
        );
        new_underlying = ctx
            .accounts
            .want_vault
            .amount
            .checked_sub(amount_owed)
            .ok_or(error!(NectarError::MathUnderflow))?;
    } else {
        let descriptor = ctx.accounts.vault.adapter;

        // request a little extra so external floor-rounding still covers
        // what is owed; never more than the whole position
        let requested = amount_owed
            .saturating_add(ctx.accounts.vault.withdraw_tolerance)
            .min(ctx.accounts.vault.total_underlying);

        let buffered_before = ctx.accounts.want_vault.amount;

        adapter::invoke_adapter(
            &descriptor,
            AdapterOp::Withdraw,
            Some(requested),
            &ctx.accounts.adapter_program.to_account_info(),
            ctx.remaining_accounts,
            &vault_key,
            signer_seeds,
        )?;

        ctx.accounts.want_vault.reload()?;
        let received = ctx
            .accounts
            .want_vault
            .amount
            .checked_sub(buffered_before)
            .ok_or(error!(NectarError::MathUnderflow))?;
        require!(received >= amount_owed, NectarError::WithdrawToleranceExceeded);

        // re-read, not subtract: compounding may have moved the balance
        new_underlying = adapter::query_staked_balance(
            &descriptor,
            &ctx.accounts.adapter_program.to_account_info(),
            ctx.remaining_accounts,
            &vault_key,
            signer_seeds,
        )?;
    }

    // =========================================================================
    // Fee split and payout
    // =========================================================================

    let (fee, net) = ctx.accounts.vault.split_withdraw_fee(amount_owed)?;

    if fee > 0 {
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.want_vault.to_account_info(),
                    to: ctx.accounts.withdraw_fee_recipient.to_account_info(),
                    authority: ctx.accounts.vault.to_account_info(),
                },
                signer_seeds,
            ),
            fee,
        )?;
    }

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.want_vault.to_account_info(),
                to: ctx.accounts.user_want_account.to_account_info(),
                authority: ctx.accounts.vault.to_account_info(),
            },
            signer_seeds,
        ),
        net,
    )?;

    // =========================================================================
    // Burn shares and finalize bookkeeping
    // =========================================================================

    let clock = Clock::get()?;
    let holder = &mut ctx.accounts.holder;
    holder.sub_shares(shares)?;
    holder.record_withdrawal(net, clock.unix_timestamp)?;
    let position_closed = holder.shares == 0;

    let vault = &mut ctx.accounts.vault;
    vault.total_shares = vault
        .total_shares
        .checked_sub(shares)
        .ok_or(error!(NectarError::MathUnderflow))?;
    vault.total_underlying = new_underlying;
    if position_closed {
        vault.holder_count = vault
            .holder_count
            .checked_sub(1)
            .ok_or(error!(NectarError::MathUnderflow))?;
    }

    vault.unlock();

    msg!("Withdrew {} want for {} shares ({} fee)", net, shares, fee);
    msg!("Vault total shares: {}", vault.total_shares);
    msg!("Vault total underlying: {}", vault.total_underlying);

    emit!(Withdrawn {
        vault: vault_key,
        holder: ctx.accounts.withdrawer.key(),
        shares_burned: shares,
        amount_returned: net,
        fee_paid: fee,
        total_shares: vault.total_shares,
        total_underlying: vault.total_underlying,
    });

    Ok(())
}
