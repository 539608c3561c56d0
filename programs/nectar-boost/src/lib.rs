use anchor_lang::prelude::*;

pub mod constants;
pub mod error;
pub mod instructions;
pub mod state;

use instructions::*;

declare_id!("DDBrk7Z3A7qDtpKYrAKqGYKWdPUEqB5HLoBGbB8pJeXd");

#[program]
pub mod nectar_boost {
    use super::*;

    /// Initialize a boost pool over one NECTAR vault
    ///
    /// # Accounts
    /// * `admin` - Pool admin (signer, payer)
    /// * `boost_pool` - Boost pool PDA to create
    /// * `vault` - The NECTAR vault whose shares will be staked
    /// * `reward_mint` - Reward token mint
    /// * `reward_vault` - Vault to hold reward tokens
    /// * `custody_holder` - The pool's custody row on the share ledger
    ///
    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        instructions::initialize::handler_initialize(ctx)
    }

    /// Stake vault shares; pending rewards are settled first
    ///
    /// # Arguments
    /// * `amount` - Vault shares to stake
    ///
    pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
        instructions::stake::handler_stake(ctx, amount)
    }

    /// Unstake vault shares; pending rewards are settled before the staked
    /// amount changes
    ///
    /// # Arguments
    /// * `amount` - Vault shares to unstake
    ///
    pub fn unstake(ctx: Context<Unstake>, amount: u64) -> Result<()> {
        instructions::unstake::handler_unstake(ctx, amount)
    }

    /// Claim accumulated boost rewards
    pub fn claim(ctx: Context<Claim>) -> Result<()> {
        instructions::claim::handler_claim(ctx)
    }

    /// Fund a reward period (admin only)
    ///
    /// # Arguments
    /// * `amount` - Reward tokens to add
    /// * `duration` - Seconds the new period runs
    ///
    pub fn fund(ctx: Context<Fund>, amount: u64, duration: i64) -> Result<()> {
        instructions::fund::handler_fund(ctx, amount, duration)
    }

    /// Pause or unpause the boost pool (admin only)
    pub fn pause_pool(ctx: Context<PausePool>, paused: bool) -> Result<()> {
        instructions::admin::pause_pool(ctx, paused)
    }

    /// Transfer admin rights to a new address (admin only)
    pub fn transfer_admin(ctx: Context<TransferAdmin>) -> Result<()> {
        instructions::admin::transfer_admin(ctx)
    }
}
