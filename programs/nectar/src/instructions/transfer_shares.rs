// =============================================================================
// Transfer Shares Instruction
// =============================================================================
// Moves ledger shares between two holder rows of the same vault. This is the
// holder-facing transfer surface; because shares are ledger entries rather
// than SPL tokens, every movement passes through here and the maximizer
// earnings offsets can be re-stamped on both sides.
//
// On a maximizer vault, both rows settle their pending claim at the current
// accumulator before the share counts change: the receiver's offset is
// raised to the present so pre-transfer yield can never be claimed by them,
// and the sender's already-earned claim survives in the settled credit.
//
// The recipient row must already exist (create_holder); program-PDA owners
// sign through CPI (boost pools moving custody), wallets sign directly.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::NectarError;
use crate::events::SharesTransferred;
use crate::state::{Holder, Vault, VaultKind};

/// Accounts required for the transfer_shares instruction
#[derive(Accounts)]
pub struct TransferShares<'info> {
    /// Owner of the sending row. A wallet, or a program PDA signing via CPI.
    pub from_owner: Signer<'info>,

    /// The vault whose shares move
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.want_mint.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump,
        constraint = !vault.is_paused @ NectarError::VaultPaused,
    )]
    pub vault: Account<'info, Vault>,

    /// Sending ledger row
    #[account(
        mut,
        seeds = [HOLDER_SEED, vault.key().as_ref(), from_owner.key().as_ref()],
        bump = from_holder.bump,
        constraint = from_holder.owner == from_owner.key() @ NectarError::InvalidHolder,
    )]
    pub from_holder: Account<'info, Holder>,

    /// Owner of the receiving row
    /// CHECK: Only its address seeds the receiving row
    pub to_owner: UncheckedAccount<'info>,

    /// Receiving ledger row; must have been created beforehand
    #[account(
        mut,
        seeds = [HOLDER_SEED, vault.key().as_ref(), to_owner.key().as_ref()],
        bump = to_holder.bump,
        constraint = to_holder.vault == vault.key() @ NectarError::InvalidHolder,
    )]
    pub to_holder: Account<'info, Holder>,
}

/// Handler for the transfer_shares instruction
pub fn handler_transfer_shares(ctx: Context<TransferShares>, amount: u64) -> Result<()> {
    require!(amount > 0, NectarError::InvalidAmount);
    require!(
        ctx.accounts.from_owner.key() != ctx.accounts.to_owner.key(),
        NectarError::InvalidHolder
    );
    // no blocking primitive exists: a transfer racing an in-progress
    // operation fails immediately
    require!(!ctx.accounts.vault.locked, NectarError::ReentrantOperation);
    require!(
        ctx.accounts.from_holder.shares >= amount,
        NectarError::InsufficientShares
    );

    let vault = &mut ctx.accounts.vault;
    let from_holder = &mut ctx.accounts.from_holder;
    let to_holder = &mut ctx.accounts.to_holder;

    // settle both sides before any share count changes
    if vault.kind == VaultKind::Maximizer {
        from_holder.settle_earnings(vault.acc_output_per_share)?;
        to_holder.settle_earnings(vault.acc_output_per_share)?;
    }

    let receiver_was_empty = to_holder.shares == 0;

    from_holder.sub_shares(amount)?;
    to_holder.add_shares(amount)?;

    if receiver_was_empty {
        vault.holder_count = vault
            .holder_count
            .checked_add(1)
            .ok_or(error!(NectarError::MathOverflow))?;
    }
    if from_holder.shares == 0 {
        vault.holder_count = vault
            .holder_count
            .checked_sub(1)
            .ok_or(error!(NectarError::MathUnderflow))?;
    }

    msg!(
        "Transferred {} shares from {} to {}",
        amount,
        from_holder.owner,
        to_holder.owner
    );

    emit!(SharesTransferred {
        vault: vault.key(),
        from: from_holder.owner,
        to: to_holder.owner,
        amount,
    });

    Ok(())
}
