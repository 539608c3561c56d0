// =============================================================================
// Set Swap Path Instruction
// =============================================================================
// The write surface of the path resolver cache. The off-chain resolver (or
// an operator overriding it) stores the hop list for one (venue, token_in,
// token_out) triple; compounding reads it back as a plain account lookup. An
// empty hop list explicitly marks the pair unroutable.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::Mint;

use crate::constants::SWAP_PATH_SEED;
use crate::error::NectarError;
use crate::state::SwapPath;

/// Accounts required for the set_swap_path instruction
#[derive(Accounts)]
pub struct SetSwapPath<'info> {
    /// Creator on first write, must match the stored authority afterwards
    #[account(mut)]
    pub authority: Signer<'info>,

    /// The swap venue this route is valid on
    /// CHECK: Only its address keys the cache entry
    pub venue_program: UncheckedAccount<'info>,

    /// Input token mint
    pub token_in: Account<'info, Mint>,

    /// Output token mint
    pub token_out: Account<'info, Mint>,

    /// The cache entry to create or overwrite
    #[account(
        init_if_needed,
        payer = authority,
        space = 8 + SwapPath::INIT_SPACE,
        seeds = [
            SWAP_PATH_SEED,
            venue_program.key().as_ref(),
            token_in.key().as_ref(),
            token_out.key().as_ref(),
        ],
        bump
    )]
    pub swap_path: Account<'info, SwapPath>,

    pub system_program: Program<'info, System>,
}

/// Handler for set_swap_path
pub fn handler_set_swap_path(ctx: Context<SetSwapPath>, hops: Vec<Pubkey>) -> Result<()> {
    let path = &mut ctx.accounts.swap_path;

    let token_in = ctx.accounts.token_in.key();
    let token_out = ctx.accounts.token_out.key();

    SwapPath::validate_hops(&hops, &token_in, &token_out)?;

    if path.authority == Pubkey::default() {
        // first write claims the entry
        path.venue = ctx.accounts.venue_program.key();
        path.token_in = token_in;
        path.token_out = token_out;
        path.authority = ctx.accounts.authority.key();
        path.bump = ctx.bumps.swap_path;
    } else {
        require!(
            path.authority == ctx.accounts.authority.key(),
            NectarError::InvalidAuthority
        );
    }

    path.hops = hops;

    msg!(
        "Swap path {} -> {} on venue {}: {} hops",
        token_in,
        token_out,
        path.venue,
        path.hops.len()
    );

    Ok(())
}
