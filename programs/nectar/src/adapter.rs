// =============================================================================
// Protocol Adapter
// =============================================================================
// One strategy code path drives many structurally different external staking
// programs. Instead of one integration module per protocol, each vault stores
// an immutable AdapterDescriptor that encodes, for its protocol family:
//
// - the target program and the stake account backing balance queries
// - the selector bytes of the five operations (query balance, deposit,
//   withdraw, harvest, emergency withdraw) - 1 byte for native-style tags,
//   8 bytes for Anchor-style discriminators
// - whether a pool index is part of the call data and where it goes
// - where the staked balance lives: at an offset in the query operation's
//   return data, or at an offset in the stake account's data
//
// Call data is assembled from the descriptor at call time; swapping the
// descriptor retargets the strategy with no code change. Manual CPI is used
// throughout so no external crate dependency is pulled in per integration.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::{get_return_data, invoke_signed};

use crate::error::NectarError;

/// The five logical operations every external staking integration exposes.
/// Used as an index into the descriptor's selector table.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AdapterOp {
    QueryBalance,
    Deposit,
    Withdraw,
    Harvest,
    EmergencyWithdraw,
}

/// Whether and where the descriptor's pool index is injected into call data
#[derive(
    AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, PartialEq, Eq, Debug, Default,
)]
pub enum PoolIdLayout {
    /// The target program addresses positions by account, not pool index
    #[default]
    None,
    /// Pool index is serialized before the amount argument
    Prefix,
    /// Pool index is serialized after the amount argument
    Suffix,
}

/// Where the staked-balance word is read from after a query
#[derive(
    AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, PartialEq, Eq, Debug, Default,
)]
pub enum BalanceSource {
    /// Invoke the query operation, then read the return data
    #[default]
    ReturnData,
    /// Read the stake account's data directly, no CPI needed
    StakeAccount,
}

/// Immutable per-vault calling convention for one external staking program.
/// Built once at vault creation and never mutated afterwards.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, PartialEq, Eq, Debug)]
pub struct AdapterDescriptor {
    /// The external staking program to invoke
    pub target_program: Pubkey,

    /// The external account holding this vault's position. Balance queries
    /// with `BalanceSource::StakeAccount` read it directly; it is also the
    /// anchor point validated against the accounts supplied at call time.
    pub stake_account: Pubkey,

    /// Selector bytes per operation, indexed by AdapterOp. Only the first
    /// `selector_len` bytes of each row are used.
    pub selectors: [[u8; 8]; 5],

    /// Number of significant selector bytes (1..=8), uniform per family
    pub selector_len: u8,

    /// Pool index placement in call data
    pub pool_id_layout: PoolIdLayout,

    /// Pool index value, meaningful when layout is not None
    pub pool_id: u64,

    /// Where the balance word is found for the query operation
    pub balance_source: BalanceSource,

    /// Byte offset of the little-endian u64 balance within the source
    pub balance_offset: u16,
}

impl Default for AdapterDescriptor {
    fn default() -> Self {
        Self {
            target_program: Pubkey::default(),
            stake_account: Pubkey::default(),
            selectors: [[0u8; 8]; 5],
            selector_len: 1,
            pool_id_layout: PoolIdLayout::None,
            pool_id: 0,
            balance_source: BalanceSource::ReturnData,
            balance_offset: 0,
        }
    }
}

impl AdapterDescriptor {
    /// Validate the descriptor once, at vault creation. It is never
    /// re-checked or re-derived at call time.
    pub fn validate(&self) -> Result<()> {
        require!(
            self.target_program != Pubkey::default(),
            NectarError::InvalidAdapterDescriptor
        );
        require!(
            self.selector_len >= 1 && self.selector_len <= 8,
            NectarError::InvalidAdapterDescriptor
        );
        if self.balance_source == BalanceSource::StakeAccount {
            require!(
                self.stake_account != Pubkey::default(),
                NectarError::InvalidAdapterDescriptor
            );
        }
        Ok(())
    }
}

/// Assemble the call data for one operation from the descriptor.
///
/// Layout: selector bytes, then the optional pool index and amount in the
/// order the layout tag dictates. Harvest and emergency withdraw carry no
/// amount; the pool index is still injected when the family uses one.
pub fn build_call_data(
    descriptor: &AdapterDescriptor,
    op: AdapterOp,
    amount: Option<u64>,
) -> Vec<u8> {
    let mut data = Vec::with_capacity(24);
    data.extend_from_slice(&descriptor.selectors[op as usize][..descriptor.selector_len as usize]);

    if descriptor.pool_id_layout == PoolIdLayout::Prefix {
        data.extend_from_slice(&descriptor.pool_id.to_le_bytes());
    }
    if let Some(amount) = amount {
        data.extend_from_slice(&amount.to_le_bytes());
    }
    if descriptor.pool_id_layout == PoolIdLayout::Suffix {
        data.extend_from_slice(&descriptor.pool_id.to_le_bytes());
    }
    data
}

/// Read the little-endian u64 balance at `offset` from a response buffer.
/// Short buffers surface as AdapterMalformedResponse, never as a panic.
pub fn read_balance_word(data: &[u8], offset: usize) -> Result<u64> {
    let end = offset
        .checked_add(8)
        .ok_or(error!(NectarError::AdapterMalformedResponse))?;
    let bytes = data
        .get(offset..end)
        .ok_or(error!(NectarError::AdapterMalformedResponse))?;
    let mut word = [0u8; 8];
    word.copy_from_slice(bytes);
    Ok(u64::from_le_bytes(word))
}

/// Invoke one adapter operation against the external staking program.
///
/// `accounts` is the pass-through slice the caller received for the external
/// protocol; the target program validates its own accounts. `authority` is
/// marked as a signer in the metas so the vault PDA's invoke_signed
/// privilege carries through.
pub fn invoke_adapter<'info>(
    descriptor: &AdapterDescriptor,
    op: AdapterOp,
    amount: Option<u64>,
    target_program: &AccountInfo<'info>,
    accounts: &[AccountInfo<'info>],
    authority: &Pubkey,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    require!(
        target_program.key() == descriptor.target_program,
        NectarError::InvalidAuthority
    );

    let metas: Vec<AccountMeta> = accounts
        .iter()
        .map(|info| AccountMeta {
            pubkey: *info.key,
            is_signer: info.is_signer || info.key == authority,
            is_writable: info.is_writable,
        })
        .collect();

    let ix = Instruction {
        program_id: descriptor.target_program,
        accounts: metas,
        data: build_call_data(descriptor, op, amount),
    };

    let mut infos: Vec<AccountInfo<'info>> = Vec::with_capacity(accounts.len() + 1);
    infos.extend_from_slice(accounts);
    infos.push(target_program.clone());

    invoke_signed(&ix, &infos, signer_seeds)
        .map_err(|_| error!(NectarError::AdapterCallFailed))?;

    Ok(())
}

/// Query the vault's live staked balance through the descriptor.
///
/// This is always the authoritative source for `total_underlying`: it is
/// re-read after every deposit, withdrawal and compound rather than being
/// maintained by local arithmetic.
pub fn query_staked_balance<'info>(
    descriptor: &AdapterDescriptor,
    target_program: &AccountInfo<'info>,
    accounts: &[AccountInfo<'info>],
    authority: &Pubkey,
    signer_seeds: &[&[&[u8]]],
) -> Result<u64> {
    match descriptor.balance_source {
        BalanceSource::StakeAccount => {
            let stake_account = accounts
                .iter()
                .find(|info| *info.key == descriptor.stake_account)
                .ok_or(error!(NectarError::AdapterAccountMissing))?;
            let data = stake_account.try_borrow_data()?;
            read_balance_word(&data, descriptor.balance_offset as usize)
        }
        BalanceSource::ReturnData => {
            invoke_adapter(
                descriptor,
                AdapterOp::QueryBalance,
                None,
                target_program,
                accounts,
                authority,
                signer_seeds,
            )?;
            let (program, data) =
                get_return_data().ok_or(error!(NectarError::AdapterMalformedResponse))?;
            require!(
                program == descriptor.target_program,
                NectarError::AdapterMalformedResponse
            );
            read_balance_word(&data, descriptor.balance_offset as usize)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(layout: PoolIdLayout, selector_len: u8) -> AdapterDescriptor {
        AdapterDescriptor {
            target_program: Pubkey::new_unique(),
            stake_account: Pubkey::new_unique(),
            selectors: [
                [0xa1, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7, 0xa8],
                [0xb1, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, 0xb7, 0xb8],
                [0xc1, 0xc2, 0xc3, 0xc4, 0xc5, 0xc6, 0xc7, 0xc8],
                [0xd1, 0xd2, 0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8],
                [0xe1, 0xe2, 0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8],
            ],
            selector_len,
            pool_id_layout: layout,
            pool_id: 7,
            balance_source: BalanceSource::ReturnData,
            balance_offset: 0,
        }
    }

    #[test]
    fn call_data_amount_only() {
        let d = descriptor(PoolIdLayout::None, 8);
        let data = build_call_data(&d, AdapterOp::Deposit, Some(500));
        assert_eq!(&data[..8], &d.selectors[AdapterOp::Deposit as usize][..]);
        assert_eq!(&data[8..16], &500u64.to_le_bytes());
        assert_eq!(data.len(), 16);
    }

    #[test]
    fn call_data_pool_id_prefix() {
        let d = descriptor(PoolIdLayout::Prefix, 8);
        let data = build_call_data(&d, AdapterOp::Withdraw, Some(42));
        assert_eq!(&data[8..16], &7u64.to_le_bytes());
        assert_eq!(&data[16..24], &42u64.to_le_bytes());
    }

    #[test]
    fn call_data_pool_id_suffix() {
        let d = descriptor(PoolIdLayout::Suffix, 8);
        let data = build_call_data(&d, AdapterOp::Withdraw, Some(42));
        assert_eq!(&data[8..16], &42u64.to_le_bytes());
        assert_eq!(&data[16..24], &7u64.to_le_bytes());
    }

    #[test]
    fn call_data_single_byte_selector() {
        let d = descriptor(PoolIdLayout::Prefix, 1);
        let data = build_call_data(&d, AdapterOp::Harvest, None);
        // native-style tag, then the pool index, no amount
        assert_eq!(data[0], 0xd1);
        assert_eq!(&data[1..9], &7u64.to_le_bytes());
        assert_eq!(data.len(), 9);
    }

    #[test]
    fn call_data_harvest_without_pool_id() {
        let d = descriptor(PoolIdLayout::None, 8);
        let data = build_call_data(&d, AdapterOp::Harvest, None);
        assert_eq!(data.len(), 8);
    }

    #[test]
    fn balance_word_reads_at_offset() {
        let mut buf = vec![0u8; 32];
        buf[16..24].copy_from_slice(&123_456u64.to_le_bytes());
        assert_eq!(read_balance_word(&buf, 16).unwrap(), 123_456);
    }

    #[test]
    fn balance_word_rejects_short_buffer() {
        let buf = vec![0u8; 10];
        assert!(read_balance_word(&buf, 8).is_err());
        assert!(read_balance_word(&buf, usize::MAX).is_err());
    }

    #[test]
    fn descriptor_validation() {
        let mut d = descriptor(PoolIdLayout::None, 8);
        assert!(d.validate().is_ok());

        d.selector_len = 0;
        assert!(d.validate().is_err());
        d.selector_len = 9;
        assert!(d.validate().is_err());
        d.selector_len = 8;

        d.balance_source = BalanceSource::StakeAccount;
        d.stake_account = Pubkey::default();
        assert!(d.validate().is_err());

        d.target_program = Pubkey::default();
        assert!(d.validate().is_err());
    }
}
