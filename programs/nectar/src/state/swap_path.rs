// =============================================================================
// SwapPath State Account
// =============================================================================
// Cached resolution of (venue, token_in, token_out) -> ordered hop list. The
// off-chain path resolver populates these entries; set_swap_path doubles as
// the manual override. Reads during compounding are idempotent account
// lookups, so resolution never costs more than one deserialization.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::MAX_SWAP_PATH_HOPS;
use crate::error::NectarError;

/// One cached swap route.
///
/// PDA derived from ["swap_path", venue_program, token_in, token_out].
#[account]
#[derive(InitSpace)]
pub struct SwapPath {
    /// The swap venue (router) program this route is valid on
    pub venue: Pubkey,

    /// Input token mint
    pub token_in: Pubkey,

    /// Output token mint
    pub token_out: Pubkey,

    /// Who may overwrite this route
    pub authority: Pubkey,

    /// Ordered hop mints, endpoints included: [token_in, .., token_out]
    #[max_len(4)]
    pub hops: Vec<Pubkey>,

    /// Bump seed for this PDA
    pub bump: u8,
}

impl SwapPath {
    /// A route is usable when it has both endpoints. An empty entry is the
    /// resolver's way of marking a pair unroutable.
    pub fn is_routable(&self) -> bool {
        self.hops.len() >= 2
    }

    /// Validate a hop list against this entry's pair
    pub fn validate_hops(
        hops: &[Pubkey],
        token_in: &Pubkey,
        token_out: &Pubkey,
    ) -> Result<()> {
        if hops.is_empty() {
            // explicit unroutable marker
            return Ok(());
        }
        require!(hops.len() >= 2, NectarError::InvalidSwapPath);
        require!(hops.len() <= MAX_SWAP_PATH_HOPS, NectarError::InvalidSwapPath);
        require!(hops.first() == Some(token_in), NectarError::InvalidSwapPath);
        require!(hops.last() == Some(token_out), NectarError::InvalidSwapPath);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hops_must_span_the_pair() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let mid = Pubkey::new_unique();

        assert!(SwapPath::validate_hops(&[a, b], &a, &b).is_ok());
        assert!(SwapPath::validate_hops(&[a, mid, b], &a, &b).is_ok());

        // wrong endpoints
        assert!(SwapPath::validate_hops(&[mid, b], &a, &b).is_err());
        assert!(SwapPath::validate_hops(&[a, mid], &a, &b).is_err());
        // a single node is not a route
        assert!(SwapPath::validate_hops(&[a], &a, &b).is_err());
        // too many hops
        let long = vec![a, mid, mid, mid, b];
        assert!(SwapPath::validate_hops(&long, &a, &b).is_err());
    }

    #[test]
    fn empty_entry_marks_unroutable() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        assert!(SwapPath::validate_hops(&[], &a, &b).is_ok());

        let path = SwapPath {
            venue: Pubkey::new_unique(),
            token_in: a,
            token_out: b,
            authority: Pubkey::new_unique(),
            hops: vec![],
            bump: 255,
        };
        assert!(!path.is_routable());
    }
}
