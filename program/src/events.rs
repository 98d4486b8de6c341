//! Typed events emitted after every successful ledger mutation.
//!
//! Events are written to the program log with `sol_log_data` as a single
//! buffer: a one-byte tag followed by the little-endian fields. Vectors are
//! prefixed with their `u32` length.

use solana_program::{log::sol_log_data, program_error::ProgramError, pubkey::Pubkey};

use crate::codec::{pack_u32_vec, pack_u64_vec, Reader};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SiloEvent {
    /// 0 - Tokens added to a crate.
    AddDeposit {
        account: Pubkey,
        token: Pubkey,
        season: u32,
        amount: u64,
        bdv: u64,
    },
    /// 1 - Tokens removed from a crate.
    RemoveDeposit {
        account: Pubkey,
        token: Pubkey,
        season: u32,
        amount: u64,
        bdv: u64,
    },
    /// 2 - Tokens removed from several crates in one operation.
    RemoveDeposits {
        account: Pubkey,
        token: Pubkey,
        seasons: Vec<u32>,
        amounts: Vec<u64>,
        bdvs: Vec<u64>,
        total: u64,
    },
    /// 3 - Tokens queued for withdrawal.
    AddWithdrawal {
        account: Pubkey,
        token: Pubkey,
        season: u32,
        amount: u64,
    },
    /// 4 - A withdrawal was claimed.
    RemoveWithdrawal {
        account: Pubkey,
        token: Pubkey,
        season: u32,
        amount: u64,
    },
    /// 5 - Several withdrawals were claimed in one operation.
    RemoveWithdrawals {
        account: Pubkey,
        token: Pubkey,
        seasons: Vec<u32>,
        amount: u64,
    },
    /// 6 - Net change of an account's stalk balance.
    StalkBalanceChanged { account: Pubkey, delta: i128 },
    /// 7 - Net change of an account's seeds balance.
    SeedsBalanceChanged { account: Pubkey, delta: i128 },
}

impl SiloEvent {
    /// Writes the event to the program log.
    pub fn emit(&self) {
        sol_log_data(&[&self.pack()]);
    }

    /// Packs a [SiloEvent](enum.SiloEvent.html) into a byte buffer.
    pub fn pack(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(128);

        match self {
            SiloEvent::AddDeposit {
                account,
                token,
                season,
                amount,
                bdv,
            } => {
                data.push(0);
                data.extend_from_slice(account.as_ref());
                data.extend_from_slice(token.as_ref());
                data.extend_from_slice(&season.to_le_bytes());
                data.extend_from_slice(&amount.to_le_bytes());
                data.extend_from_slice(&bdv.to_le_bytes());
            }
            SiloEvent::RemoveDeposit {
                account,
                token,
                season,
                amount,
                bdv,
            } => {
                data.push(1);
                data.extend_from_slice(account.as_ref());
                data.extend_from_slice(token.as_ref());
                data.extend_from_slice(&season.to_le_bytes());
                data.extend_from_slice(&amount.to_le_bytes());
                data.extend_from_slice(&bdv.to_le_bytes());
            }
            SiloEvent::RemoveDeposits {
                account,
                token,
                seasons,
                amounts,
                bdvs,
                total,
            } => {
                data.push(2);
                data.extend_from_slice(account.as_ref());
                data.extend_from_slice(token.as_ref());
                pack_u32_vec(&mut data, seasons);
                pack_u64_vec(&mut data, amounts);
                pack_u64_vec(&mut data, bdvs);
                data.extend_from_slice(&total.to_le_bytes());
            }
            SiloEvent::AddWithdrawal {
                account,
                token,
                season,
                amount,
            } => {
                data.push(3);
                data.extend_from_slice(account.as_ref());
                data.extend_from_slice(token.as_ref());
                data.extend_from_slice(&season.to_le_bytes());
                data.extend_from_slice(&amount.to_le_bytes());
            }
            SiloEvent::RemoveWithdrawal {
                account,
                token,
                season,
                amount,
            } => {
                data.push(4);
                data.extend_from_slice(account.as_ref());
                data.extend_from_slice(token.as_ref());
                data.extend_from_slice(&season.to_le_bytes());
                data.extend_from_slice(&amount.to_le_bytes());
            }
            SiloEvent::RemoveWithdrawals {
                account,
                token,
                seasons,
                amount,
            } => {
                data.push(5);
                data.extend_from_slice(account.as_ref());
                data.extend_from_slice(token.as_ref());
                pack_u32_vec(&mut data, seasons);
                data.extend_from_slice(&amount.to_le_bytes());
            }
            SiloEvent::StalkBalanceChanged { account, delta } => {
                data.push(6);
                data.extend_from_slice(account.as_ref());
                data.extend_from_slice(&delta.to_le_bytes());
            }
            SiloEvent::SeedsBalanceChanged { account, delta } => {
                data.push(7);
                data.extend_from_slice(account.as_ref());
                data.extend_from_slice(&delta.to_le_bytes());
            }
        }

        data
    }

    /// Unpacks a byte buffer into a [SiloEvent](enum.SiloEvent.html).
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input
            .split_first()
            .ok_or(ProgramError::InvalidInstructionData)?;
        let mut reader = Reader(rest);

        let event = match tag {
            0 => SiloEvent::AddDeposit {
                account: reader.pubkey()?,
                token: reader.pubkey()?,
                season: reader.u32()?,
                amount: reader.u64()?,
                bdv: reader.u64()?,
            },
            1 => SiloEvent::RemoveDeposit {
                account: reader.pubkey()?,
                token: reader.pubkey()?,
                season: reader.u32()?,
                amount: reader.u64()?,
                bdv: reader.u64()?,
            },
            2 => SiloEvent::RemoveDeposits {
                account: reader.pubkey()?,
                token: reader.pubkey()?,
                seasons: reader.u32_vec()?,
                amounts: reader.u64_vec()?,
                bdvs: reader.u64_vec()?,
                total: reader.u64()?,
            },
            3 => SiloEvent::AddWithdrawal {
                account: reader.pubkey()?,
                token: reader.pubkey()?,
                season: reader.u32()?,
                amount: reader.u64()?,
            },
            4 => SiloEvent::RemoveWithdrawal {
                account: reader.pubkey()?,
                token: reader.pubkey()?,
                season: reader.u32()?,
                amount: reader.u64()?,
            },
            5 => SiloEvent::RemoveWithdrawals {
                account: reader.pubkey()?,
                token: reader.pubkey()?,
                seasons: reader.u32_vec()?,
                amount: reader.u64()?,
            },
            6 => SiloEvent::StalkBalanceChanged {
                account: reader.pubkey()?,
                delta: reader.i128()?,
            },
            7 => SiloEvent::SeedsBalanceChanged {
                account: reader.pubkey()?,
                delta: reader.i128()?,
            },
            _ => return Err(ProgramError::InvalidInstructionData),
        };

        if !reader.is_empty() {
            return Err(ProgramError::InvalidInstructionData);
        }

        Ok(event)
    }
}

/// Emits the balance change events for an account, skipping zero deltas.
pub fn emit_balance_changes(account: Pubkey, stalk: (u128, u128), seeds: (u128, u128)) {
    let stalk_delta = stalk.1 as i128 - stalk.0 as i128;
    let seeds_delta = seeds.1 as i128 - seeds.0 as i128;

    if stalk_delta != 0 {
        SiloEvent::StalkBalanceChanged {
            account,
            delta: stalk_delta,
        }
        .emit();
    }

    if seeds_delta != 0 {
        SiloEvent::SeedsBalanceChanged {
            account,
            delta: seeds_delta,
        }
        .emit();
    }
}
