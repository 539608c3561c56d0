// =============================================================================
// Earn Instruction (compound cycle)
// =============================================================================
// One full harvest-swap-recompound cycle for a standard vault:
//
// 1. Throttle gate: at most one run per min_earn_interval slots; a throttled
//    call is a reported skip, not an error
// 2. Adapter harvest pulls pending reward into the reward buffer
// 3. Earn-fee legs are split off the harvest
// 4. If a maximizer is linked, its pro-rata slice of the post-fee harvest is
//    exported to its escrow instead of being recompounded
// 5. The remainder is swapped to want along the cached path, inside the
//    slippage band (min_out = quote * (10000 - slippage_bps) / 10000)
// 6. The want buffer is re-staked through the adapter
// 7. total_underlying is re-read from the adapter's balance query
//
// Keepers sweep many vaults by issuing one earn per vault with best_effort
// set: harvest failures, dust balances, unroutable pairs and slippage misses
// are then per-vault (or per-leg) EarnSkipped reports and never abort the
// sibling calls of the batch. Failures on the single-vault path with
// best_effort unset stay fatal.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::adapter::{self, AdapterOp};
use crate::constants::*;
use crate::error::NectarError;
use crate::events::{EarnExecuted, EarnSkipped, SkipReason};
use crate::state::{Holder, SwapPath, Vault, VaultKind};
use crate::venue;

/// Accounts required for the earn instruction
#[derive(Accounts)]
pub struct Earn<'info> {
    /// Anyone may crank a compound; the keeper bot in practice
    #[account(mut)]
    pub caller: Signer<'info>,

    /// The vault to compound
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.want_mint.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump,
        constraint = !vault.is_paused @ NectarError::VaultPaused,
        constraint = !vault.emergency_mode @ NectarError::EmergencyMode,
        constraint = vault.kind == VaultKind::Standard @ NectarError::NotAStandardVault,
    )]
    pub vault: Account<'info, Vault>,

    /// Vault's want buffer, re-staked at the end of the cycle
    #[account(
        mut,
        seeds = [WANT_VAULT_SEED, vault.key().as_ref()],
        bump = vault.want_vault_bump,
    )]
    pub want_vault: Account<'info, TokenAccount>,

    /// Harvest landing zone
    #[account(
        mut,
        seeds = [REWARD_VAULT_SEED, vault.key().as_ref()],
        bump = vault.reward_vault_bump,
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    /// Earn-fee recipients, one per configured leg, in leg order
    #[account(mut)]
    pub fee_recipient_0: Option<Account<'info, TokenAccount>>,
    #[account(mut)]
    pub fee_recipient_1: Option<Account<'info, TokenAccount>>,
    #[account(mut)]
    pub fee_recipient_2: Option<Account<'info, TokenAccount>>,

    /// The linked maximizer's custody row on this vault, required when a
    /// maximizer is attached
    pub maximizer_holder: Option<Account<'info, Holder>>,

    /// The linked maximizer's earnings escrow, required when a maximizer is
    /// attached
    #[account(mut)]
    pub maximizer_escrow: Option<Account<'info, TokenAccount>>,

    /// Cached route reward -> want. Absent or empty means unroutable: the
    /// swap leg is skipped, the rest of the cycle still runs.
    pub swap_path: Option<Account<'info, SwapPath>>,

    /// The configured swap venue
    /// CHECK: Verified against vault.venue_program before any CPI
    pub venue_program: UncheckedAccount<'info>,

    /// The external staking program named by the adapter descriptor
    /// CHECK: Verified against vault.adapter.target_program before any CPI
    pub adapter_program: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
}

/// Handler for the earn instruction.
///
/// Remaining accounts: first `adapter_accounts_len` entries are the external
/// staking program's pass-through list (harvest, deposit, balance query);
/// the rest are forwarded to the swap venue.
///
/// # Arguments
/// * `best_effort` - Batch-sweep mode: tolerate harvest failure as a skip
/// * `adapter_accounts_len` - Split point of the remaining accounts
pub fn handler_earn<'info>(
    ctx: Context<'_, '_, '_, 'info, Earn<'info>>,
    best_effort: bool,
    adapter_accounts_len: u8,
) -> Result<()> {
    let vault_key = ctx.accounts.vault.key();
    let clock = Clock::get()?;

    // =========================================================================
    // Throttle gate - a no-op, never an error
    // =========================================================================

    if !ctx.accounts.vault.throttle_allows(clock.slot) {
        msg!(
            "Earn throttled: next run at slot {}",
            ctx.accounts.vault.last_earn_slot.saturating_add(ctx.accounts.vault.min_earn_interval)
        );
        emit!(EarnSkipped { vault: vault_key, reason: SkipReason::ThrottleNotElapsed });
        return Ok(());
    }

    require!(
        (adapter_accounts_len as usize) <= ctx.remaining_accounts.len(),
        NectarError::AdapterAccountMissing
    );
    let (adapter_accounts, venue_accounts) =
        ctx.remaining_accounts.split_at(adapter_accounts_len as usize);

    require!(
        ctx.accounts.venue_program.key() == ctx.accounts.vault.venue_program,
        NectarError::InvalidAuthority
    );

    ctx.accounts.vault.lock()?;

    let descriptor = ctx.accounts.vault.adapter;
    let want_mint_key = ctx.accounts.vault.want_mint;
    let reward_mint_key = ctx.accounts.vault.reward_mint;
    let vault_id_bytes = ctx.accounts.vault.vault_id.to_le_bytes();
    let vault_seeds = &[
        VAULT_SEED,
        want_mint_key.as_ref(),
        &vault_id_bytes,
        &[ctx.accounts.vault.bump],
    ];
    let signer_seeds = &[&vault_seeds[..]];

    // =========================================================================
    // 1. Harvest
    // =========================================================================

    let harvest_result = adapter::invoke_adapter(
        &descriptor,
        AdapterOp::Harvest,
        None,
        &ctx.accounts.adapter_program.to_account_info(),
        adapter_accounts,
        &vault_key,
        signer_seeds,
    );

    if let Err(err) = harvest_result {
        if best_effort {
            msg!("Harvest failed, skipping vault in sweep");
            emit!(EarnSkipped { vault: vault_key, reason: SkipReason::HarvestFailed });
            ctx.accounts.vault.unlock();
            return Ok(());
        }
        return Err(err);
    }

    ctx.accounts.reward_vault.reload()?;
    let harvested = ctx.accounts.reward_vault.amount;

    if harvested <= ctx.accounts.vault.dust {
        msg!("Harvest of {} at or below dust threshold, skipping", harvested);
        emit!(EarnSkipped { vault: vault_key, reason: SkipReason::DustBelowThreshold });
        ctx.accounts.vault.unlock();
        return Ok(());
    }

    // =========================================================================
    // 2. Earn-fee legs, paid in the reward asset
    // =========================================================================

    let fee_amounts = ctx.accounts.vault.earn_fee_amounts(harvested)?;
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
                    from: ctx.accounts.reward_vault.to_account_info(),
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

    let after_fees = harvested
        .checked_sub(fees_paid)
        .ok_or(error!(NectarError::MathUnderflow))?;

    // =========================================================================
    // 3. Maximizer export - the locked fraction of the harvest leaves the
    //    compounding flow in the reward asset
    // =========================================================================

    let mut exported: u64 = 0;
    let maximizer = ctx.accounts.vault.maximizer_vault;
    if maximizer != Pubkey::default() {
        let custody = ctx
            .accounts
            .maximizer_holder
            .as_ref()
            .ok_or(error!(NectarError::InvalidMaximizerAccounts))?;
        let escrow = ctx
            .accounts
            .maximizer_escrow
            .as_ref()
            .ok_or(error!(NectarError::InvalidMaximizerAccounts))?;
        require!(
            custody.vault == vault_key && custody.owner == maximizer,
            NectarError::InvalidMaximizerAccounts
        );
        require!(
            escrow.owner == maximizer && escrow.mint == reward_mint_key,
            NectarError::InvalidMaximizerAccounts
        );

        let total_shares = ctx.accounts.vault.total_shares;
        if custody.shares > 0 && total_shares > 0 {
            exported = ((after_fees as u128)
                .checked_mul(custody.shares as u128)
                .ok_or(error!(NectarError::MathOverflow))?
                .checked_div(total_shares as u128)
                .ok_or(error!(NectarError::DivisionByZero))?) as u64;
        }

        if exported > 0 {
            token::transfer(
                CpiContext::new_with_signer(
                    ctx.accounts.token_program.to_account_info(),
                    Transfer {
                        from: ctx.accounts.reward_vault.to_account_info(),
                        to: escrow.to_account_info(),
                        authority: ctx.accounts.vault.to_account_info(),
                    },
                    signer_seeds,
                ),
                exported,
            )?;
        }
    }

    let to_swap = after_fees
        .checked_sub(exported)
        .ok_or(error!(NectarError::MathUnderflow))?;

    // =========================================================================
    // 4. Swap reward -> want inside the slippage band
    // =========================================================================

    if to_swap > ctx.accounts.vault.dust {
        let route = match ctx.accounts.swap_path.as_ref() {
            Some(path)
                if path.is_routable()
                    && path.venue == ctx.accounts.vault.venue_program
                    && path.token_in == reward_mint_key
                    && path.token_out == want_mint_key =>
            {
                Some(path.hops.clone())
            }
            _ => None,
        };

        match route {
            None => {
                // one unroutable reward must not block the rest of the cycle;
                // the balance stays buffered for a later run
                msg!("No route for reward leg, skipping swap");
                emit!(EarnSkipped { vault: vault_key, reason: SkipReason::UnroutablePath });
            }
            Some(hops) => {
                let slippage_bps = ctx.accounts.vault.slippage_bps;
                let quote = venue::quote_amounts_out(
                    &ctx.accounts.venue_program.to_account_info(),
                    to_swap,
                    &hops,
                    venue_accounts,
                    &vault_key,
                    signer_seeds,
                )?;
                let min_out = venue::min_out_for_quote(quote, slippage_bps)?;

                let mut swap_accounts = vec![
                    ctx.accounts.reward_vault.to_account_info(),
                    ctx.accounts.want_vault.to_account_info(),
                    ctx.accounts.vault.to_account_info(),
                ];
                swap_accounts.extend_from_slice(venue_accounts);

                let swapped = venue::swap_exact_input(
                    &ctx.accounts.venue_program.to_account_info(),
                    to_swap,
                    min_out,
                    &hops,
                    &swap_accounts,
                    &vault_key,
                    signer_seeds,
                );

                if swapped.is_err() {
                    // leg aborted whole: partial proceeds are never
                    // redeposited silently
                    msg!("Swap leg below tolerance band, skipping");
                    emit!(EarnSkipped { vault: vault_key, reason: SkipReason::SlippageExceeded });
                }
            }
        }
    }

    // =========================================================================
    // 5. Re-stake the want buffer
    // =========================================================================

    ctx.accounts.want_vault.reload()?;
    let compounded = ctx.accounts.want_vault.amount;

    if compounded > ctx.accounts.vault.dust {
        adapter::invoke_adapter(
            &descriptor,
            AdapterOp::Deposit,
            Some(compounded),
            &ctx.accounts.adapter_program.to_account_info(),
            adapter_accounts,
            &vault_key,
            signer_seeds,
        )?;
    }

    // =========================================================================
    // 6. Re-read the authoritative balance and finalize
    // =========================================================================

    let staked_balance = adapter::query_staked_balance(
        &descriptor,
        &ctx.accounts.adapter_program.to_account_info(),
        adapter_accounts,
        &vault_key,
        signer_seeds,
    )?;

    let vault = &mut ctx.accounts.vault;
    vault.total_underlying = staked_balance;
    vault.total_harvested = vault
        .total_harvested
        .checked_add(harvested)
        .ok_or(error!(NectarError::MathOverflow))?;
    vault.earn_count = vault
        .earn_count
        .checked_add(1)
        .ok_or(error!(NectarError::MathOverflow))?;
    vault.last_earn_slot = clock.slot;

    vault.unlock();

    msg!(
        "Compounded: {} harvested, {} fees, {} exported, {} restaked",
        harvested,
        fees_paid,
        exported,
        compounded
    );

    emit!(EarnExecuted {
        vault: vault_key,
        harvested,
        fees_paid,
        exported,
        compounded,
        total_underlying: staked_balance,
    });

    Ok(())
}
