use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use nectar::cpi::accounts::CreateHolder;
use nectar::program::Nectar;

use crate::constants::{BOOST_POOL_SEED, BOOST_REWARD_VAULT_SEED};
use crate::state::BoostPool;

/// Initialize a boost pool over one NECTAR vault
///
/// # Flow
/// 1. Create the pool and its reward vault
/// 2. CPI into the vault program to create the pool's custody row on the
///    share ledger (staked shares live there, out of reach of plain
///    withdrawals until unstaked)
///
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// Pool admin (signer, payer)
    #[account(mut)]
    pub admin: Signer<'info>,

    /// Boost pool PDA to create
    #[account(
        init,
        payer = admin,
        space = BoostPool::SIZE,
        seeds = [BOOST_POOL_SEED, vault.key().as_ref()],
        bump
    )]
    pub boost_pool: Account<'info, BoostPool>,

    /// The NECTAR vault whose shares will be staked
    pub vault: Account<'info, nectar::state::Vault>,

    /// Reward token mint
    pub reward_mint: Account<'info, Mint>,

    /// Vault holding reward tokens to distribute
    #[account(
        init,
        payer = admin,
        token::mint = reward_mint,
        token::authority = boost_pool,
        seeds = [BOOST_REWARD_VAULT_SEED, boost_pool.key().as_ref()],
        bump
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    /// The pool's custody row on the vault's share ledger
    /// CHECK: Created and validated through CPI into the vault program
    #[account(mut)]
    pub custody_holder: UncheckedAccount<'info>,

    pub nectar_program: Program<'info, Nectar>,
    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

pub fn handler_initialize(ctx: Context<Initialize>) -> Result<()> {
    // Custody row is owned by the pool PDA on the vault's ledger
    nectar::cpi::create_holder(CpiContext::new(
        ctx.accounts.nectar_program.to_account_info(),
        CreateHolder {
            payer: ctx.accounts.admin.to_account_info(),
            vault: ctx.accounts.vault.to_account_info(),
            owner: ctx.accounts.boost_pool.to_account_info(),
            holder: ctx.accounts.custody_holder.to_account_info(),
            system_program: ctx.accounts.system_program.to_account_info(),
        },
    ))?;

    let boost_pool = &mut ctx.accounts.boost_pool;
    let clock = Clock::get()?;

    boost_pool.admin = ctx.accounts.admin.key();
    boost_pool.vault = ctx.accounts.vault.key();
    boost_pool.custody_holder = ctx.accounts.custody_holder.key();
    boost_pool.reward_mint = ctx.accounts.reward_mint.key();
    boost_pool.reward_vault = ctx.accounts.reward_vault.key();

    boost_pool.total_staked = 0;
    boost_pool.reward_rate = 0;
    boost_pool.period_end = clock.unix_timestamp;
    boost_pool.acc_reward_per_share = 0;
    boost_pool.last_update_time = clock.unix_timestamp;
    boost_pool.total_rewards_paid = 0;
    boost_pool.staker_count = 0;

    boost_pool.is_paused = false;
    boost_pool.bump = ctx.bumps.boost_pool;
    boost_pool.reward_vault_bump = ctx.bumps.reward_vault;

    msg!("Boost pool initialized for vault {}", boost_pool.vault);
    msg!("Reward mint: {}", boost_pool.reward_mint);

    Ok(())
}
