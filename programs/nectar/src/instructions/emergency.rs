// =============================================================================
// Emergency Withdraw Instruction
// =============================================================================
// Pulls the vault's entire external position back into the local want buffer
// through the adapter's emergency operation and flips the vault into
// emergency mode: deposits and compounding stop, withdrawals are served from
// the buffer without touching the external protocol again.
//
// One-way door: there is no instruction to leave emergency mode. Recovering
// a vault means standing up a fresh one.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::adapter::{self, AdapterOp};
use crate::constants::*;
use crate::error::NectarError;
use crate::events::EmergencyWithdrawn;
use crate::state::{Vault, VaultKind};

/// Accounts required for the emergency_withdraw instruction
#[derive(Accounts)]
pub struct EmergencyWithdraw<'info> {
    /// The vault admin
    #[account(
        constraint = admin.key() == vault.admin @ NectarError::AdminOnly,
    )]
    pub admin: Signer<'info>,

    /// The vault to evacuate
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.want_mint.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump,
        constraint = vault.kind == VaultKind::Standard @ NectarError::NotAStandardVault,
        constraint = !vault.emergency_mode @ NectarError::EmergencyMode,
    )]
    pub vault: Account<'info, Vault>,

    /// Vault's want buffer, receives the evacuated position
    #[account(
        mut,
        seeds = [WANT_VAULT_SEED, vault.key().as_ref()],
        bump = vault.want_vault_bump,
    )]
    pub want_vault: Account<'info, TokenAccount>,

    /// The external staking program named by the adapter descriptor
    /// CHECK: Verified against vault.adapter.target_program before any CPI
    pub adapter_program: UncheckedAccount<'info>,
}

/// Handler for emergency_withdraw.
///
/// Remaining accounts: the pass-through account list the external staking
/// program expects for its emergency-withdraw operation.
pub fn handler_emergency_withdraw<'info>(
    ctx: Context<'_, '_, '_, 'info, EmergencyWithdraw<'info>>,
) -> Result<()> {
    ctx.accounts.vault.lock()?;

    let vault_key = ctx.accounts.vault.key();
    let descriptor = ctx.accounts.vault.adapter;
    let want_mint_key = ctx.accounts.vault.want_mint;
    let vault_id_bytes = ctx.accounts.vault.vault_id.to_le_bytes();
    let vault_seeds = &[
        VAULT_SEED,
        want_mint_key.as_ref(),
        &vault_id_bytes,
        &[ctx.accounts.vault.bump],
    ];
    let signer_seeds = &[&vault_seeds[..]];

    let buffered_before = ctx.accounts.want_vault.amount;

    adapter::invoke_adapter(
        &descriptor,
        AdapterOp::EmergencyWithdraw,
        None,
        &ctx.accounts.adapter_program.to_account_info(),
        ctx.remaining_accounts,
        &vault_key,
        signer_seeds,
    )?;

    ctx.accounts.want_vault.reload()?;
    let recovered = ctx
        .accounts
        .want_vault
        .amount
        .checked_sub(buffered_before)
        .ok_or(error!(NectarError::MathUnderflow))?;

    let vault = &mut ctx.accounts.vault;

    // the local buffer is now the whole position
    vault.total_underlying = ctx.accounts.want_vault.amount;
    vault.emergency_mode = true;

    vault.unlock();

    msg!("EMERGENCY: recovered {} want into local buffer", recovered);
    msg!("Vault is now in emergency mode; only withdrawals are allowed");

    emit!(EmergencyWithdrawn {
        vault: vault_key,
        recovered,
    });

    Ok(())
}
