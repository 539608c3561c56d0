use anchor_lang::prelude::*;

#[error_code]
pub enum BoostError {
    // Pool State Errors (6000-6009)
    #[msg("Boost pool is paused")]
    PoolPaused,

    // Amount Errors (6010-6019)
    #[msg("Invalid amount: must be greater than zero")]
    InvalidAmount,

    #[msg("Amount below minimum stake")]
    BelowMinimumStake,

    #[msg("Insufficient staked balance")]
    InsufficientStake,

    #[msg("No rewards available to claim")]
    NoRewardsToClaim,

    #[msg("Insufficient balance in reward vault")]
    InsufficientRewardBalance,

    #[msg("Invalid funding duration")]
    InvalidDuration,

    // Authorization Errors (6020-6029)
    #[msg("Unauthorized: admin only")]
    Unauthorized,

    #[msg("Invalid authority")]
    InvalidAuthority,

    // Math Errors (6030-6039)
    #[msg("Math overflow")]
    MathOverflow,

    #[msg("Math underflow")]
    MathUnderflow,

    #[msg("Division by zero")]
    DivisionByZero,

    // Account Validation Errors (6040-6049)
    #[msg("Invalid vault for this boost pool")]
    InvalidVault,

    #[msg("Invalid reward mint")]
    InvalidRewardMint,

    #[msg("Invalid PDA")]
    InvalidPDA,

    #[msg("Invalid token account owner")]
    InvalidTokenAccountOwner,

    #[msg("Holder account does not match pool custody")]
    InvalidCustodyHolder,
}
