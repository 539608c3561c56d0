// =============================================================================
// Swap Venue Glue
// =============================================================================
// Manual CPI against the configured swap venue (router) program. Two calls
// are consumed by the compounding cycle:
//
// - quote_amounts_out: dry-run pricing, result comes back via return data and
//   feeds the slippage band (min_out = quote * (10000 - slippage_bps) / 10000)
// - swap_exact_input: the actual conversion, venue enforces min_out
//
// Wire format mirrors the venue's native instruction tags: a 1-byte tag,
// little-endian u64 amounts, then the hop list. The venue validates its own
// pair/reserve accounts; we forward them untouched.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::{get_return_data, invoke_signed};

use crate::constants::BPS_DENOMINATOR;
use crate::error::NectarError;

/// Venue instruction tag for swap_exact_input
pub const SWAP_EXACT_INPUT_TAG: u8 = 1;

/// Venue instruction tag for quote_amounts_out
pub const QUOTE_AMOUNTS_OUT_TAG: u8 = 2;

/// Serialize a swap/quote payload: tag, amounts, hop count, hop mints
fn build_venue_data(tag: u8, amount_in: u64, min_out: Option<u64>, hops: &[Pubkey]) -> Vec<u8> {
    let mut data = Vec::with_capacity(18 + hops.len() * 32);
    data.push(tag);
    data.extend_from_slice(&amount_in.to_le_bytes());
    if let Some(min_out) = min_out {
        data.extend_from_slice(&min_out.to_le_bytes());
    }
    data.push(hops.len() as u8);
    for hop in hops {
        data.extend_from_slice(hop.as_ref());
    }
    data
}

/// Minimum acceptable output for a quoted swap under the vault's slippage
/// tolerance. Floor division: the band can only get tighter, never looser.
pub fn min_out_for_quote(quote: u64, slippage_bps: u16) -> Result<u64> {
    let keep_bps = BPS_DENOMINATOR
        .checked_sub(slippage_bps as u64)
        .ok_or(error!(NectarError::MathUnderflow))?;
    let min_out = (quote as u128)
        .checked_mul(keep_bps as u128)
        .ok_or(error!(NectarError::MathOverflow))?
        .checked_div(BPS_DENOMINATOR as u128)
        .ok_or(error!(NectarError::DivisionByZero))?;
    Ok(min_out as u64)
}

/// Parse the final leg of a quote_amounts_out response. The venue returns the
/// per-hop amounts as a borsh vec of u64; the last element is the expected
/// output of the whole route.
pub fn parse_quote_response(data: &[u8]) -> Result<u64> {
    // 4-byte borsh length prefix plus at least one element
    require!(data.len() >= 12, NectarError::QuoteUnavailable);
    let mut word = [0u8; 8];
    word.copy_from_slice(&data[data.len() - 8..]);
    Ok(u64::from_le_bytes(word))
}

fn invoke_venue<'info>(
    venue_program: &AccountInfo<'info>,
    data: Vec<u8>,
    accounts: &[AccountInfo<'info>],
    authority: &Pubkey,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    let metas: Vec<AccountMeta> = accounts
        .iter()
        .map(|info| AccountMeta {
            pubkey: *info.key,
            is_signer: info.is_signer || info.key == authority,
            is_writable: info.is_writable,
        })
        .collect();

    let ix = Instruction {
        program_id: venue_program.key(),
        accounts: metas,
        data,
    };

    let mut infos: Vec<AccountInfo<'info>> = Vec::with_capacity(accounts.len() + 1);
    infos.extend_from_slice(accounts);
    infos.push(venue_program.clone());

    invoke_signed(&ix, &infos, signer_seeds)
        .map_err(|_| error!(NectarError::SlippageExceeded))?;

    Ok(())
}

/// Ask the venue what `amount_in` converts to along `hops`
pub fn quote_amounts_out<'info>(
    venue_program: &AccountInfo<'info>,
    amount_in: u64,
    hops: &[Pubkey],
    accounts: &[AccountInfo<'info>],
    authority: &Pubkey,
    signer_seeds: &[&[&[u8]]],
) -> Result<u64> {
    invoke_venue(
        venue_program,
        build_venue_data(QUOTE_AMOUNTS_OUT_TAG, amount_in, None, hops),
        accounts,
        authority,
        signer_seeds,
    )
    .map_err(|_| error!(NectarError::QuoteUnavailable))?;

    let (program, data) = get_return_data().ok_or(error!(NectarError::QuoteUnavailable))?;
    require!(program == venue_program.key(), NectarError::QuoteUnavailable);
    parse_quote_response(&data)
}

/// Swap exactly `amount_in` along `hops`, enforcing `min_out` at the venue
pub fn swap_exact_input<'info>(
    venue_program: &AccountInfo<'info>,
    amount_in: u64,
    min_out: u64,
    hops: &[Pubkey],
    accounts: &[AccountInfo<'info>],
    authority: &Pubkey,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    invoke_venue(
        venue_program,
        build_venue_data(SWAP_EXACT_INPUT_TAG, amount_in, Some(min_out), hops),
        accounts,
        authority,
        signer_seeds,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_out_applies_band() {
        // 1% slippage on 10_000 leaves 9_900
        assert_eq!(min_out_for_quote(10_000, 100).unwrap(), 9_900);
        // zero tolerance keeps the full quote
        assert_eq!(min_out_for_quote(10_000, 0).unwrap(), 10_000);
        // floor direction: 999 * 9950 / 10000 = 994.005 -> 994
        assert_eq!(min_out_for_quote(999, 50).unwrap(), 994);
    }

    #[test]
    fn venue_data_layout() {
        let hops = vec![Pubkey::new_unique(), Pubkey::new_unique()];
        let data = build_venue_data(SWAP_EXACT_INPUT_TAG, 1_000, Some(990), &hops);
        assert_eq!(data[0], SWAP_EXACT_INPUT_TAG);
        assert_eq!(&data[1..9], &1_000u64.to_le_bytes());
        assert_eq!(&data[9..17], &990u64.to_le_bytes());
        assert_eq!(data[17], 2);
        assert_eq!(&data[18..50], hops[0].as_ref());
        assert_eq!(data.len(), 18 + 64);
    }

    #[test]
    fn quote_data_has_no_min_out() {
        let hops = vec![Pubkey::new_unique()];
        let data = build_venue_data(QUOTE_AMOUNTS_OUT_TAG, 55, None, &hops);
        assert_eq!(data[0], QUOTE_AMOUNTS_OUT_TAG);
        assert_eq!(&data[1..9], &55u64.to_le_bytes());
        assert_eq!(data[9], 1);
        assert_eq!(data.len(), 10 + 32);
    }

    #[test]
    fn quote_response_takes_last_leg() {
        // borsh vec<u64> of [400, 380]
        let mut data = vec![2, 0, 0, 0];
        data.extend_from_slice(&400u64.to_le_bytes());
        data.extend_from_slice(&380u64.to_le_bytes());
        assert_eq!(parse_quote_response(&data).unwrap(), 380);
    }

    #[test]
    fn quote_response_rejects_empty() {
        assert!(parse_quote_response(&[0, 0, 0, 0]).is_err());
        assert!(parse_quote_response(&[]).is_err());
    }
}
