// =============================================================================
// Admin Instructions
// =============================================================================
// Administrative functions only the vault admin can call: pause/unpause, fee
// schedule updates, strategy parameter updates, vault size cap, and admin
// transfer. Every update re-runs the same validation as vault creation.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::NectarError;
use crate::state::{EarnFeeLeg, Vault};

/// Accounts shared by all single-vault admin instructions
#[derive(Accounts)]
pub struct AdminVault<'info> {
    /// The vault admin
    #[account(
        constraint = admin.key() == vault.admin @ NectarError::AdminOnly,
    )]
    pub admin: Signer<'info>,

    /// The vault being administered
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.want_mint.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump,
    )]
    pub vault: Account<'info, Vault>,
}

/// Accounts required for the transfer_admin instruction
#[derive(Accounts)]
pub struct TransferAdmin<'info> {
    /// The current admin
    #[account(
        constraint = admin.key() == vault.admin @ NectarError::AdminOnly,
    )]
    pub admin: Signer<'info>,

    /// The vault being handed over
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.want_mint.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump,
    )]
    pub vault: Account<'info, Vault>,

    /// The new admin
    /// CHECK: Only its address is stored
    pub new_admin: UncheckedAccount<'info>,
}

/// Pause or unpause a vault
pub fn handler_pause_vault(ctx: Context<AdminVault>, paused: bool) -> Result<()> {
    let vault = &mut ctx.accounts.vault;

    if vault.is_paused == paused {
        msg!("Vault is already {}", if paused { "paused" } else { "unpaused" });
        return Ok(());
    }

    vault.is_paused = paused;
    msg!(
        "Vault {} by admin {}",
        if paused { "PAUSED" } else { "UNPAUSED" },
        ctx.accounts.admin.key()
    );

    Ok(())
}

/// Update the fee schedule. Re-validated against the same caps as creation.
pub fn handler_update_fees(
    ctx: Context<AdminVault>,
    withdraw_fee_bps: u16,
    earn_fees: Vec<EarnFeeLeg>,
) -> Result<()> {
    let vault = &mut ctx.accounts.vault;

    vault.withdraw_fee_bps = withdraw_fee_bps;
    vault.earn_fees = earn_fees;
    vault.validate_fees()?;

    msg!(
        "Fees updated: withdraw {} bps, {} earn legs",
        vault.withdraw_fee_bps,
        vault.earn_fees.len()
    );

    Ok(())
}

/// Update strategy knobs: slippage band, dust threshold, withdraw tolerance
/// and the compounding throttle
pub fn handler_update_strategy_params(
    ctx: Context<AdminVault>,
    slippage_bps: u16,
    dust: u64,
    withdraw_tolerance: u64,
    min_earn_interval: u64,
) -> Result<()> {
    let vault = &mut ctx.accounts.vault;

    vault.slippage_bps = slippage_bps;
    vault.dust = dust;
    vault.withdraw_tolerance = withdraw_tolerance;
    vault.min_earn_interval = min_earn_interval;
    vault.validate_strategy_params()?;

    msg!(
        "Strategy params updated: slippage {} bps, dust {}, tolerance {}, throttle {} slots",
        slippage_bps,
        dust,
        withdraw_tolerance,
        min_earn_interval
    );

    Ok(())
}

/// Update the vault size cap. Cannot cut below the current position.
pub fn handler_update_max_vault_size(ctx: Context<AdminVault>, new_cap: u64) -> Result<()> {
    let vault = &mut ctx.accounts.vault;

    require!(
        new_cap >= vault.total_underlying,
        NectarError::InvalidStrategyParam
    );

    let old_cap = vault.max_vault_size;
    vault.max_vault_size = new_cap;

    msg!("Vault size cap: {} -> {}", old_cap, new_cap);

    Ok(())
}

/// Transfer admin rights. Irreversible; prefer a multisig as the target.
pub fn handler_transfer_admin(ctx: Context<TransferAdmin>) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    let new_admin = ctx.accounts.new_admin.key();

    require!(new_admin != Pubkey::default(), NectarError::InvalidAddress);
    require!(new_admin != vault.admin, NectarError::InvalidAuthority);

    let old_admin = vault.admin;
    vault.admin = new_admin;

    msg!("Admin transferred: {} -> {}", old_admin, new_admin);

    Ok(())
}
