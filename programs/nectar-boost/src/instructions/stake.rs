use anchor_lang::prelude::*;

use nectar::cpi::accounts::TransferShares;
use nectar::program::Nectar;

use crate::constants::{BOOST_POOL_SEED, BOOST_STAKE_SEED, MIN_STAKE_AMOUNT};
use crate::error::BoostError;
use crate::state::{BoostPool, BoostStake};

/// Stake vault shares into the boost pool
///
/// # Arguments
/// * `ctx` - The context containing all accounts
/// * `amount` - Vault shares to stake
///
/// # Flow
/// 1. Advance the reward accumulator, settle the position
/// 2. CPI the vault program to move shares user -> pool custody
/// 3. Update position and pool totals
///
#[derive(Accounts)]
pub struct Stake<'info> {
    /// User staking their vault shares
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

    /// User's boost position (created if first time)
    #[account(
        init_if_needed,
        payer = user,
        space = BoostStake::SIZE,
        seeds = [BOOST_STAKE_SEED, boost_pool.key().as_ref(), user.key().as_ref()],
        bump
    )]
    pub stake: Account<'info, BoostStake>,

    /// The staked vault; mutated by the share transfer CPI
    #[account(
        mut,
        constraint = vault.key() == boost_pool.vault @ BoostError::InvalidVault
    )]
    pub vault: Account<'info, nectar::state::Vault>,

    /// User's row on the vault's share ledger
    /// CHECK: Validated by the vault program during the transfer CPI
    #[account(mut)]
    pub user_holder: UncheckedAccount<'info>,

    /// The pool's custody row on the vault's share ledger
    /// CHECK: Validated against the stored custody address and by the vault
    /// program during the transfer CPI
    #[account(
        mut,
        constraint = custody_holder.key() == boost_pool.custody_holder
            @ BoostError::InvalidCustodyHolder
    )]
    pub custody_holder: UncheckedAccount<'info>,

    pub nectar_program: Program<'info, Nectar>,
    pub system_program: Program<'info, System>,
}

pub fn handler_stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
    // Validate amount
    require!(amount > 0, BoostError::InvalidAmount);
    require!(amount >= MIN_STAKE_AMOUNT, BoostError::BelowMinimumStake);

    let clock = Clock::get()?;

    let boost_pool = &mut ctx.accounts.boost_pool;
    let stake = &mut ctx.accounts.stake;

    // Accrue up to now, then settle before the share count changes
    boost_pool.update_accumulator(clock.unix_timestamp)?;

    let is_new_staker = stake.staked_shares == 0 && stake.pool == Pubkey::default();
    if is_new_staker {
        stake.pool = boost_pool.key();
        stake.owner = ctx.accounts.user.key();
        stake.bump = ctx.bumps.stake;

        boost_pool.staker_count = boost_pool
            .staker_count
            .checked_add(1)
            .ok_or(BoostError::MathOverflow)?;
    }

    stake.settle(boost_pool.acc_reward_per_share)?;

    // Move shares on the vault ledger: user -> pool custody.
    // The user's signature carries through the CPI.
    nectar::cpi::transfer_shares(
        CpiContext::new(
            ctx.accounts.nectar_program.to_account_info(),
            TransferShares {
                from_owner: ctx.accounts.user.to_account_info(),
                vault: ctx.accounts.vault.to_account_info(),
                from_holder: ctx.accounts.user_holder.to_account_info(),
                to_owner: boost_pool.to_account_info(),
                to_holder: ctx.accounts.custody_holder.to_account_info(),
            },
        ),
        amount,
    )?;

    stake.record_stake(amount, clock.unix_timestamp)?;

    boost_pool.total_staked = boost_pool
        .total_staked
        .checked_add(amount)
        .ok_or(BoostError::MathOverflow)?;

    msg!(
        "Staked {} shares. User total: {}, Pool total: {}",
        amount,
        stake.staked_shares,
        boost_pool.total_staked
    );

    Ok(())
}
