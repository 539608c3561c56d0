use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::constants::{BOOST_POOL_SEED, MAX_FUND_DURATION_SECONDS, MIN_FUND_AMOUNT};
use crate::error::BoostError;
use crate::state::BoostPool;

/// Fund a reward period
///
/// Transfers reward tokens into the reward vault and re-derives the
/// per-second emission rate over `duration`. Whatever is left of a running
/// period rolls into the new one.
///
/// # Arguments
/// * `ctx` - The context containing all accounts
/// * `amount` - Reward tokens to add
/// * `duration` - Seconds the new period runs
///
#[derive(Accounts)]
pub struct Fund<'info> {
    /// Authority funding rewards (admin)
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Boost pool
    #[account(
        mut,
        seeds = [BOOST_POOL_SEED, boost_pool.vault.as_ref()],
        bump = boost_pool.bump,
        constraint = boost_pool.admin == authority.key() @ BoostError::Unauthorized
    )]
    pub boost_pool: Account<'info, BoostPool>,

    /// Reward token mint
    #[account(
        constraint = reward_mint.key() == boost_pool.reward_mint @ BoostError::InvalidRewardMint
    )]
    pub reward_mint: Account<'info, Mint>,

    /// Source of rewards; must be owned by the authority
    #[account(
        mut,
        token::mint = reward_mint,
        constraint = reward_source.owner == authority.key()
            @ BoostError::InvalidTokenAccountOwner
    )]
    pub reward_source: Account<'info, TokenAccount>,

    /// Pool's reward vault
    #[account(
        mut,
        constraint = reward_vault.key() == boost_pool.reward_vault @ BoostError::InvalidPDA,
        token::mint = reward_mint
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler_fund(ctx: Context<Fund>, amount: u64, duration: i64) -> Result<()> {
    require!(amount >= MIN_FUND_AMOUNT, BoostError::InvalidAmount);
    require!(
        duration > 0 && duration <= MAX_FUND_DURATION_SECONDS,
        BoostError::InvalidDuration
    );

    let clock = Clock::get()?;
    let boost_pool = &mut ctx.accounts.boost_pool;

    // Close out accrual under the old rate before switching
    boost_pool.update_accumulator(clock.unix_timestamp)?;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.reward_source.to_account_info(),
                to: ctx.accounts.reward_vault.to_account_info(),
                authority: ctx.accounts.authority.to_account_info(),
            },
        ),
        amount,
    )?;

    let rate = boost_pool.fund_period(amount, duration, clock.unix_timestamp)?;

    msg!(
        "Funded {} rewards over {}s: rate {}/s until {}",
        amount,
        duration,
        rate,
        boost_pool.period_end
    );

    Ok(())
}
