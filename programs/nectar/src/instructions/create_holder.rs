// =============================================================================
// Create Holder Instruction
// =============================================================================
// Explicitly creates an empty ledger row for (vault, owner). Deposits create
// the depositor's own row implicitly; this instruction exists for rows that
// must exist before a transfer can land on them - a transfer recipient's
// first row, or a custody row owned by a program PDA (boost pools create
// theirs through CPI here at pool initialization).
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::HOLDER_SEED;
use crate::state::{Holder, Vault};

/// Accounts required for the create_holder instruction
#[derive(Accounts)]
pub struct CreateHolder<'info> {
    /// Pays for the new ledger row; any signer
    #[account(mut)]
    pub payer: Signer<'info>,

    /// The vault the row belongs to
    pub vault: Account<'info, Vault>,

    /// The future owner of the row. A wallet or a program PDA.
    /// CHECK: Only its address seeds the row; ownership is proven by signing
    /// later transfers
    pub owner: UncheckedAccount<'info>,

    /// The ledger row to create
    #[account(
        init,
        payer = payer,
        space = 8 + Holder::INIT_SPACE,
        seeds = [HOLDER_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub holder: Account<'info, Holder>,

    pub system_program: Program<'info, System>,
}

/// Handler for create_holder
pub fn handler_create_holder(ctx: Context<CreateHolder>) -> Result<()> {
    let holder = &mut ctx.accounts.holder;

    holder.vault = ctx.accounts.vault.key();
    holder.owner = ctx.accounts.owner.key();
    holder.shares = 0;
    // a fresh row starts at the current accumulator so it can never claim
    // output accrued before it existed
    holder.earnings_offset = ctx.accounts.vault.acc_output_per_share;
    holder.settled_earnings = 0;
    holder.bump = ctx.bumps.holder;

    msg!(
        "Holder row created for {} on vault {}",
        holder.owner,
        holder.vault
    );

    Ok(())
}
