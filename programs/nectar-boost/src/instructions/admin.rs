use anchor_lang::prelude::*;

use crate::constants::BOOST_POOL_SEED;
use crate::error::BoostError;
use crate::state::BoostPool;

/// Accounts for pause_pool
#[derive(Accounts)]
pub struct PausePool<'info> {
    #[account(
        constraint = admin.key() == boost_pool.admin @ BoostError::Unauthorized
    )]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [BOOST_POOL_SEED, boost_pool.vault.as_ref()],
        bump = boost_pool.bump
    )]
    pub boost_pool: Account<'info, BoostPool>,
}

pub fn pause_pool(ctx: Context<PausePool>, paused: bool) -> Result<()> {
    let boost_pool = &mut ctx.accounts.boost_pool;

    boost_pool.is_paused = paused;

    msg!(
        "Boost pool {} by admin {}",
        if paused { "PAUSED" } else { "UNPAUSED" },
        ctx.accounts.admin.key()
    );

    Ok(())
}

/// Accounts for transfer_admin
#[derive(Accounts)]
pub struct TransferAdmin<'info> {
    #[account(
        constraint = admin.key() == boost_pool.admin @ BoostError::Unauthorized
    )]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [BOOST_POOL_SEED, boost_pool.vault.as_ref()],
        bump = boost_pool.bump
    )]
    pub boost_pool: Account<'info, BoostPool>,

    /// The new admin
    /// CHECK: This is just the new admin address, we just store it
    pub new_admin: UncheckedAccount<'info>,
}

pub fn transfer_admin(ctx: Context<TransferAdmin>) -> Result<()> {
    let boost_pool = &mut ctx.accounts.boost_pool;
    let new_admin = ctx.accounts.new_admin.key();

    require!(new_admin != Pubkey::default(), BoostError::InvalidAuthority);
    require!(new_admin != boost_pool.admin, BoostError::InvalidAuthority);

    boost_pool.admin = new_admin;

    msg!("Boost pool admin transferred to {}", new_admin);

    Ok(())
}
