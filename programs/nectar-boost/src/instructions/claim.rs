use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::constants::{BOOST_POOL_SEED, BOOST_STAKE_SEED};
use crate::error::BoostError;
use crate::state::{BoostPool, BoostStake};

/// Claim accumulated boost rewards
///
/// # Flow
/// 1. Advance the accumulator and settle the position
/// 2. Transfer the unclaimed balance from the reward vault to the user
///
#[derive(Accounts)]
pub struct Claim<'info> {
    /// User claiming their rewards
    #[account(mut)]
    pub user: Signer<'info>,

    /// Boost pool
    #[account(
        mut,
        seeds = [BOOST_POOL_SEED, boost_pool.vault.as_ref()],
        bump = boost_pool.bump,
        constraint = !boost_pool.is_paused @ BoostError::PoolPaused
    )]
    pub boost_pool: Account<'info, BoostPool>,

    /// User's boost position
    #[account(
        mut,
        seeds = [BOOST_STAKE_SEED, boost_pool.key().as_ref(), user.key().as_ref()],
        bump = stake.bump,
        constraint = stake.owner == user.key() @ BoostError::InvalidAuthority
    )]
    pub stake: Account<'info, BoostStake>,

    /// Reward token mint
    #[account(
        constraint = reward_mint.key() == boost_pool.reward_mint @ BoostError::InvalidRewardMint
    )]
    pub reward_mint: Account<'info, Mint>,

    /// User's reward token account
    #[account(
        mut,
        token::mint = reward_mint,
        token::authority = user
    )]
    pub user_reward_account: Account<'info, TokenAccount>,

    /// Pool's reward vault
    #[account(
        mut,
        constraint = reward_vault.key() == boost_pool.reward_vault @ BoostError::InvalidPDA,
        token::mint = reward_mint
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler_claim(ctx: Context<Claim>) -> Result<()> {
    let clock = Clock::get()?;

    let boost_pool = &mut ctx.accounts.boost_pool;
    let stake = &mut ctx.accounts.stake;

    boost_pool.update_accumulator(clock.unix_timestamp)?;
    stake.settle(boost_pool.acc_reward_per_share)?;

    let amount = stake.take_unclaimed()?;
    require!(amount > 0, BoostError::NoRewardsToClaim);
    require!(
        ctx.accounts.reward_vault.amount >= amount,
        BoostError::InsufficientRewardBalance
    );

    // Pool PDA signs the payout
    let vault_key = boost_pool.vault;
    let seeds = &[BOOST_POOL_SEED, vault_key.as_ref(), &[boost_pool.bump]];
    let signer_seeds = &[&seeds[..]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.reward_vault.to_account_info(),
                to: ctx.accounts.user_reward_account.to_account_info(),
                authority: boost_pool.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )?;

    boost_pool.total_rewards_paid = boost_pool
        .total_rewards_paid
        .checked_add(amount)
        .ok_or(BoostError::MathOverflow)?;

    msg!(
        "Claimed {} rewards. Total claimed: {}",
        amount,
        stake.rewards_claimed
    );

    Ok(())
}
