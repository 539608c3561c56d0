use anchor_lang::prelude::*;

use nectar::cpi::accounts::TransferShares;
use nectar::program::Nectar;

use crate::constants::{BOOST_POOL_SEED, BOOST_STAKE_SEED};
use crate::error::BoostError;
use crate::state::{BoostPool, BoostStake};

/// Unstake vault shares from the boost pool
///
/// Pending rewards are settled into the unclaimed balance before the staked
/// amount changes. Withdrawing staked shares from the vault ledger always
/// goes through here first: the shares sit in the pool's custody row until
/// unstaked.
///
/// # Arguments
/// * `ctx` - The context containing all accounts
/// * `amount` - Vault shares to unstake
///
#[derive(Accounts)]
pub struct Unstake<'info> {
    /// User unstaking their vault shares
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
}

pub fn handler_unstake(ctx: Context<Unstake>, amount: u64) -> Result<()> {
    // Validate amount
    require!(amount > 0, BoostError::InvalidAmount);
    require!(
        ctx.accounts.stake.staked_shares >= amount,
        BoostError::InsufficientStake
    );

    let clock = Clock::get()?;

    let boost_pool = &mut ctx.accounts.boost_pool;
    let stake = &mut ctx.accounts.stake;

    // Settle pending first, then change the staked amount
    boost_pool.update_accumulator(clock.unix_timestamp)?;
    stake.settle(boost_pool.acc_reward_per_share)?;
    stake.record_unstake(amount, clock.unix_timestamp)?;

    // Move shares on the vault ledger: pool custody -> user.
    // The pool PDA signs for its custody row.
    let vault_key = boost_pool.vault;
    let seeds = &[BOOST_POOL_SEED, vault_key.as_ref(), &[boost_pool.bump]];
    let signer_seeds = &[&seeds[..]];

    nectar::cpi::transfer_shares(
        CpiContext::new_with_signer(
            ctx.accounts.nectar_program.to_account_info(),
            TransferShares {
                from_owner: boost_pool.to_account_info(),
                vault: ctx.accounts.vault.to_account_info(),
                from_holder: ctx.accounts.custody_holder.to_account_info(),
                to_owner: ctx.accounts.user.to_account_info(),
                to_holder: ctx.accounts.user_holder.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )?;

    boost_pool.total_staked = boost_pool
        .total_staked
        .checked_sub(amount)
        .ok_or(BoostError::MathUnderflow)?;

    // Decrement staker count if fully unstaked
    if stake.staked_shares == 0 {
        boost_pool.staker_count = boost_pool
            .staker_count
            .checked_sub(1)
            .ok_or(BoostError::MathUnderflow)?;
    }

    msg!(
        "Unstaked {} shares. User remaining: {}, Pool total: {}",
        amount,
        stake.staked_shares,
        boost_pool.total_staked
    );

    Ok(())
}
