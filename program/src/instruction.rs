use num_traits::FromPrimitive;
use shank::{ShankContext, ShankInstruction, ShankType};
use solana_program::program_error::ProgramError;

use crate::{
    bdv::BdvPolicy,
    codec::{pack_u32_vec, pack_u64_vec, Reader},
};

/// Enum defining all instructions in the Silo program.
#[repr(C)]
#[derive(Clone, Debug, Eq, PartialEq, ShankContext, ShankInstruction)]
#[rustfmt::skip]
pub enum SiloInstruction {
    /// Creates the Silo config account.
    ///
    /// The config account must be created and assigned to the Silo program
    /// beforehand. The season starts at 1.
    #[account(
        0,
        writable,
        name = "config",
        desc = "Silo config account"
    )]
    #[account(
        1,
        name = "config_authority",
        desc = "Config authority"
    )]
    InitializeConfig {
        withdraw_seasons: u32,
    },

    /// Sets a new config authority.
    #[account(
        0,
        writable,
        name = "config",
        desc = "Silo config account"
    )]
    #[account(
        1,
        signer,
        name = "authority",
        desc = "Current config authority"
    )]
    #[account(
        2,
        name = "new_authority",
        desc = "New config authority"
    )]
    SetAuthority,

    /// Updates a config parameter.
    #[account(
        0,
        writable,
        name = "config",
        desc = "Silo config account"
    )]
    #[account(
        1,
        signer,
        name = "config_authority",
        desc = "Config authority"
    )]
    UpdateConfig(ConfigField),

    /// Advances the current season by one.
    #[account(
        0,
        writable,
        name = "config",
        desc = "Silo config account"
    )]
    #[account(
        1,
        signer,
        name = "config_authority",
        desc = "Config authority"
    )]
    Sunrise,

    /// Whitelists a token for deposit.
    ///
    /// The silo token account must be pre-funded with the rent-exempt
    /// minimum. For curve-derived tokens the BDV source is the curve pool
    /// account; for the other policies it is the token mint.
    #[account(
        0,
        name = "config",
        desc = "Silo config account"
    )]
    #[account(
        1,
        writable,
        name = "silo_token",
        desc = "Silo token account (pda of `['silo::state::silo_token', config, mint]`)"
    )]
    #[account(
        2,
        signer,
        name = "config_authority",
        desc = "Config authority"
    )]
    #[account(
        3,
        name = "mint",
        desc = "Token mint"
    )]
    #[account(
        4,
        name = "vault",
        desc = "Token vault (owned by pda of `['token-owner', config]`)"
    )]
    #[account(
        5,
        name = "bdv_source",
        desc = "Curve pool or token mint"
    )]
    #[account(
        6,
        name = "ripe_mint",
        desc = "Ripe underlying mint (unripe tokens only)"
    )]
    #[account(
        7,
        name = "system_program",
        desc = "System program"
    )]
    WhitelistToken {
        policy: BdvPolicy,
        stalk_per_bdv: u32,
        seeds_per_bdv: u32,
        fixed_rate: u64,
        legacy_bdv_rate: u64,
    },

    /// Stops accepting new deposits of a token.
    ///
    /// Existing crates can still be withdrawn, transferred and claimed.
    #[account(
        0,
        name = "config",
        desc = "Silo config account"
    )]
    #[account(
        1,
        writable,
        name = "silo_token",
        desc = "Silo token account"
    )]
    #[account(
        2,
        signer,
        name = "config_authority",
        desc = "Config authority"
    )]
    DewhitelistToken,

    /// Records ripe underlying added to back an unripe token.
    ///
    /// Instruction data: amount of underlying, as a little-endian `u64`.
    #[account(
        0,
        name = "config",
        desc = "Silo config account"
    )]
    #[account(
        1,
        writable,
        name = "silo_token",
        desc = "Silo token account"
    )]
    #[account(
        2,
        signer,
        name = "config_authority",
        desc = "Config authority"
    )]
    AddUnderlying(u64),

    /// Deposits tokens into the crate of the current season.
    ///
    /// The farmer and deposit accounts are created when empty, so they must
    /// be pre-funded with the rent-exempt minimum.
    ///
    /// Instruction data: amount of tokens to deposit, as a little-endian `u64`.
    #[account(
        0,
        writable,
        name = "config",
        desc = "Silo config account"
    )]
    #[account(
        1,
        writable,
        name = "silo_token",
        desc = "Silo token account"
    )]
    #[account(
        2,
        writable,
        name = "farmer",
        desc = "Farmer account (pda of `['silo::state::farmer', config, owner]`)"
    )]
    #[account(
        3,
        writable,
        name = "deposit",
        desc = "Crate account (pda of `['silo::state::deposit', silo_token, owner, season]`)"
    )]
    #[account(
        4,
        signer,
        name = "owner",
        desc = "Depositor and source token account authority"
    )]
    #[account(
        5,
        writable,
        name = "source_token_account",
        desc = "Source token account"
    )]
    #[account(
        6,
        name = "mint",
        desc = "Token mint"
    )]
    #[account(
        7,
        writable,
        name = "vault",
        desc = "Token vault"
    )]
    #[account(
        8,
        name = "bdv_source",
        desc = "BDV source of the token"
    )]
    #[account(
        9,
        name = "token_program",
        desc = "Token program"
    )]
    #[account(
        10,
        name = "system_program",
        desc = "System program"
    )]
    Deposit(u64),

    /// Withdraws tokens from a crate into the withdrawal queue.
    ///
    /// The withdrawal account is keyed by the release season
    /// (`current_season + withdraw_seasons`) and created when empty.
    #[account(
        0,
        writable,
        name = "config",
        desc = "Silo config account"
    )]
    #[account(
        1,
        writable,
        name = "silo_token",
        desc = "Silo token account"
    )]
    #[account(
        2,
        writable,
        name = "farmer",
        desc = "Farmer account"
    )]
    #[account(
        3,
        writable,
        name = "deposit",
        desc = "Crate account"
    )]
    #[account(
        4,
        writable,
        name = "withdrawal",
        desc = "Withdrawal account (pda of `['silo::state::withdrawal', silo_token, owner, release_season]`)"
    )]
    #[account(
        5,
        writable,
        signer,
        name = "owner",
        desc = "Crate owner"
    )]
    #[account(
        6,
        name = "system_program",
        desc = "System program"
    )]
    WithdrawDeposit {
        season: u32,
        amount: u64,
    },

    /// Withdraws tokens from several crates into a single withdrawal.
    ///
    /// The crate accounts follow the listed accounts, in the order of
    /// `seasons`.
    #[account(
        0,
        writable,
        name = "config",
        desc = "Silo config account"
    )]
    #[account(
        1,
        writable,
        name = "silo_token",
        desc = "Silo token account"
    )]
    #[account(
        2,
        writable,
        name = "farmer",
        desc = "Farmer account"
    )]
    #[account(
        3,
        writable,
        name = "withdrawal",
        desc = "Withdrawal account"
    )]
    #[account(
        4,
        writable,
        signer,
        name = "owner",
        desc = "Crate owner"
    )]
    #[account(
        5,
        name = "system_program",
        desc = "System program"
    )]
    WithdrawDeposits {
        seasons: Vec<u32>,
        amounts: Vec<u64>,
    },

    /// Claims a withdrawal whose release season has been reached.
    ///
    /// Instruction data: release season, as a little-endian `u32`.
    #[account(
        0,
        name = "config",
        desc = "Silo config account"
    )]
    #[account(
        1,
        writable,
        name = "silo_token",
        desc = "Silo token account"
    )]
    #[account(
        2,
        writable,
        name = "withdrawal",
        desc = "Withdrawal account"
    )]
    #[account(
        3,
        writable,
        signer,
        name = "owner",
        desc = "Withdrawal owner"
    )]
    #[account(
        4,
        writable,
        name = "destination_token_account",
        desc = "Destination token account"
    )]
    #[account(
        5,
        name = "mint",
        desc = "Token mint"
    )]
    #[account(
        6,
        writable,
        name = "vault",
        desc = "Token vault"
    )]
    #[account(
        7,
        name = "vault_authority",
        desc = "Vault authority (pda of `['token-owner', config]`)"
    )]
    #[account(
        8,
        name = "token_program",
        desc = "Token program"
    )]
    ClaimWithdrawal(u32),

    /// Claims several withdrawals with a single transfer.
    ///
    /// The withdrawal accounts follow the listed accounts, in the order of the
    /// release seasons; any further accounts are passed to the token transfer.
    #[account(
        0,
        name = "config",
        desc = "Silo config account"
    )]
    #[account(
        1,
        writable,
        name = "silo_token",
        desc = "Silo token account"
    )]
    #[account(
        2,
        writable,
        signer,
        name = "owner",
        desc = "Withdrawal owner"
    )]
    #[account(
        3,
        writable,
        name = "destination_token_account",
        desc = "Destination token account"
    )]
    #[account(
        4,
        name = "mint",
        desc = "Token mint"
    )]
    #[account(
        5,
        writable,
        name = "vault",
        desc = "Token vault"
    )]
    #[account(
        6,
        name = "vault_authority",
        desc = "Vault authority (pda of `['token-owner', config]`)"
    )]
    #[account(
        7,
        name = "token_program",
        desc = "Token program"
    )]
    ClaimWithdrawals(Vec<u32>),

    /// Transfers part of a crate to another account, keeping its season.
    ///
    /// The recipient farmer and crate are created when empty.
    #[account(
        0,
        writable,
        name = "config",
        desc = "Silo config account"
    )]
    #[account(
        1,
        writable,
        name = "silo_token",
        desc = "Silo token account"
    )]
    #[account(
        2,
        writable,
        name = "sender_farmer",
        desc = "Sender farmer account"
    )]
    #[account(
        3,
        writable,
        name = "recipient_farmer",
        desc = "Recipient farmer account"
    )]
    #[account(
        4,
        writable,
        name = "sender_deposit",
        desc = "Sender crate account"
    )]
    #[account(
        5,
        writable,
        name = "recipient_deposit",
        desc = "Recipient crate account"
    )]
    #[account(
        6,
        writable,
        signer,
        name = "owner",
        desc = "Sender"
    )]
    #[account(
        7,
        name = "recipient",
        desc = "Recipient"
    )]
    #[account(
        8,
        name = "system_program",
        desc = "System program"
    )]
    TransferDeposit {
        season: u32,
        amount: u64,
    },

    /// Transfers parts of several crates to another account.
    ///
    /// The listed accounts are followed by one `(sender crate, recipient crate)`
    /// pair per season.
    #[account(
        0,
        writable,
        name = "config",
        desc = "Silo config account"
    )]
    #[account(
        1,
        writable,
        name = "silo_token",
        desc = "Silo token account"
    )]
    #[account(
        2,
        writable,
        name = "sender_farmer",
        desc = "Sender farmer account"
    )]
    #[account(
        3,
        writable,
        name = "recipient_farmer",
        desc = "Recipient farmer account"
    )]
    #[account(
        4,
        writable,
        signer,
        name = "owner",
        desc = "Sender"
    )]
    #[account(
        5,
        name = "recipient",
        desc = "Recipient"
    )]
    #[account(
        6,
        name = "system_program",
        desc = "System program"
    )]
    TransferDeposits {
        seasons: Vec<u32>,
        amounts: Vec<u64>,
    },

    /// Re-prices an unripe crate at the current underlying ratio.
    #[account(
        0,
        writable,
        name = "config",
        desc = "Silo config account"
    )]
    #[account(
        1,
        writable,
        name = "silo_token",
        desc = "Silo token account"
    )]
    #[account(
        2,
        writable,
        name = "farmer",
        desc = "Farmer account"
    )]
    #[account(
        3,
        writable,
        name = "deposit",
        desc = "Crate account"
    )]
    #[account(
        4,
        signer,
        name = "owner",
        desc = "Crate owner"
    )]
    #[account(
        5,
        name = "bdv_source",
        desc = "Unripe token mint"
    )]
    UpdateUnripeDeposit {
        season: u32,
        amount: u64,
    },

    /// Re-prices several unripe crates.
    ///
    /// The crate accounts follow the listed accounts, in the order of
    /// `seasons`.
    #[account(
        0,
        writable,
        name = "config",
        desc = "Silo config account"
    )]
    #[account(
        1,
        writable,
        name = "silo_token",
        desc = "Silo token account"
    )]
    #[account(
        2,
        writable,
        name = "farmer",
        desc = "Farmer account"
    )]
    #[account(
        3,
        signer,
        name = "owner",
        desc = "Crate owner"
    )]
    #[account(
        4,
        name = "bdv_source",
        desc = "Unripe token mint"
    )]
    UpdateUnripeDeposits {
        seasons: Vec<u32>,
        amounts: Vec<u64>,
    },
}

impl SiloInstruction {
    /// Packs a [SiloInstruction](enum.SiloInstruction.html) into a byte buffer.
    pub fn pack(&self) -> Vec<u8> {
        match self {
            SiloInstruction::InitializeConfig { withdraw_seasons } => {
                let mut data = Vec::with_capacity(5);
                data.push(0);
                data.extend_from_slice(&withdraw_seasons.to_le_bytes());
                data
            }
            SiloInstruction::SetAuthority => vec![1],
            SiloInstruction::UpdateConfig(field) => {
                let mut data = Vec::with_capacity(6);
                data.push(2);
                match field {
                    ConfigField::WithdrawSeasons(value) => {
                        data.push(0);
                        data.extend_from_slice(&value.to_le_bytes());
                    }
                }
                data
            }
            SiloInstruction::Sunrise => vec![3],
            SiloInstruction::WhitelistToken {
                policy,
                stalk_per_bdv,
                seeds_per_bdv,
                fixed_rate,
                legacy_bdv_rate,
            } => {
                let mut data = Vec::with_capacity(26);
                data.push(4);
                data.push(*policy as u8);
                data.extend_from_slice(&stalk_per_bdv.to_le_bytes());
                data.extend_from_slice(&seeds_per_bdv.to_le_bytes());
                data.extend_from_slice(&fixed_rate.to_le_bytes());
                data.extend_from_slice(&legacy_bdv_rate.to_le_bytes());
                data
            }
            SiloInstruction::DewhitelistToken => vec![5],
            SiloInstruction::AddUnderlying(amount) => {
                let mut data = Vec::with_capacity(9);
                data.push(6);
                data.extend_from_slice(&amount.to_le_bytes());
                data
            }
            SiloInstruction::Deposit(amount) => {
                let mut data = Vec::with_capacity(9);
                data.push(7);
                data.extend_from_slice(&amount.to_le_bytes());
                data
            }
            SiloInstruction::WithdrawDeposit { season, amount } => {
                let mut data = Vec::with_capacity(13);
                data.push(8);
                data.extend_from_slice(&season.to_le_bytes());
                data.extend_from_slice(&amount.to_le_bytes());
                data
            }
            SiloInstruction::WithdrawDeposits { seasons, amounts } => {
                let mut data = Vec::with_capacity(9 + seasons.len() * 4 + amounts.len() * 8);
                data.push(9);
                pack_u32_vec(&mut data, seasons);
                pack_u64_vec(&mut data, amounts);
                data
            }
            SiloInstruction::ClaimWithdrawal(release_season) => {
                let mut data = Vec::with_capacity(5);
                data.push(10);
                data.extend_from_slice(&release_season.to_le_bytes());
                data
            }
            SiloInstruction::ClaimWithdrawals(release_seasons) => {
                let mut data = Vec::with_capacity(5 + release_seasons.len() * 4);
                data.push(11);
                pack_u32_vec(&mut data, release_seasons);
                data
            }
            SiloInstruction::TransferDeposit { season, amount } => {
                let mut data = Vec::with_capacity(13);
                data.push(12);
                data.extend_from_slice(&season.to_le_bytes());
                data.extend_from_slice(&amount.to_le_bytes());
                data
            }
            SiloInstruction::TransferDeposits { seasons, amounts } => {
                let mut data = Vec::with_capacity(9 + seasons.len() * 4 + amounts.len() * 8);
                data.push(13);
                pack_u32_vec(&mut data, seasons);
                pack_u64_vec(&mut data, amounts);
                data
            }
            SiloInstruction::UpdateUnripeDeposit { season, amount } => {
                let mut data = Vec::with_capacity(13);
                data.push(14);
                data.extend_from_slice(&season.to_le_bytes());
                data.extend_from_slice(&amount.to_le_bytes());
                data
            }
            SiloInstruction::UpdateUnripeDeposits { seasons, amounts } => {
                let mut data = Vec::with_capacity(9 + seasons.len() * 4 + amounts.len() * 8);
                data.push(15);
                pack_u32_vec(&mut data, seasons);
                pack_u64_vec(&mut data, amounts);
                data
            }
        }
    }

    /// Unpacks a byte buffer into a [SiloInstruction](enum.SiloInstruction.html).
    ///
    /// Batch instructions decode their two vectors independently; matching
    /// lengths are checked by the processor.
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input
            .split_first()
            .ok_or(ProgramError::InvalidInstructionData)?;
        let mut reader = Reader(rest);

        let instruction = match tag {
            // 0 - InitializeConfig: u32 (4)
            0 => SiloInstruction::InitializeConfig {
                withdraw_seasons: reader.u32()?,
            },
            // 1 - SetAuthority
            1 => SiloInstruction::SetAuthority,
            // 2 - UpdateConfig: ConfigField (u8 + u32)
            2 => {
                let field = match reader.u8()? {
                    0 => ConfigField::WithdrawSeasons(reader.u32()?),
                    _ => return Err(ProgramError::InvalidInstructionData),
                };

                SiloInstruction::UpdateConfig(field)
            }
            // 3 - Sunrise
            3 => SiloInstruction::Sunrise,
            // 4 - WhitelistToken: u8 (1) + u32 (4) + u32 (4) + u64 (8) + u64 (8)
            4 => {
                let policy =
                    BdvPolicy::from_u8(reader.u8()?).ok_or(ProgramError::InvalidInstructionData)?;

                SiloInstruction::WhitelistToken {
                    policy,
                    stalk_per_bdv: reader.u32()?,
                    seeds_per_bdv: reader.u32()?,
                    fixed_rate: reader.u64()?,
                    legacy_bdv_rate: reader.u64()?,
                }
            }
            // 5 - DewhitelistToken
            5 => SiloInstruction::DewhitelistToken,
            // 6 - AddUnderlying: u64 (8)
            6 => SiloInstruction::AddUnderlying(reader.u64()?),
            // 7 - Deposit: u64 (8)
            7 => SiloInstruction::Deposit(reader.u64()?),
            // 8 - WithdrawDeposit: u32 (4) + u64 (8)
            8 => SiloInstruction::WithdrawDeposit {
                season: reader.u32()?,
                amount: reader.u64()?,
            },
            // 9 - WithdrawDeposits: Vec<u32> + Vec<u64>
            9 => SiloInstruction::WithdrawDeposits {
                seasons: reader.u32_vec()?,
                amounts: reader.u64_vec()?,
            },
            // 10 - ClaimWithdrawal: u32 (4)
            10 => SiloInstruction::ClaimWithdrawal(reader.u32()?),
            // 11 - ClaimWithdrawals: Vec<u32>
            11 => SiloInstruction::ClaimWithdrawals(reader.u32_vec()?),
            // 12 - TransferDeposit: u32 (4) + u64 (8)
            12 => SiloInstruction::TransferDeposit {
                season: reader.u32()?,
                amount: reader.u64()?,
            },
            // 13 - TransferDeposits: Vec<u32> + Vec<u64>
            13 => SiloInstruction::TransferDeposits {
                seasons: reader.u32_vec()?,
                amounts: reader.u64_vec()?,
            },
            // 14 - UpdateUnripeDeposit: u32 (4) + u64 (8)
            14 => SiloInstruction::UpdateUnripeDeposit {
                season: reader.u32()?,
                amount: reader.u64()?,
            },
            // 15 - UpdateUnripeDeposits: Vec<u32> + Vec<u64>
            15 => SiloInstruction::UpdateUnripeDeposits {
                seasons: reader.u32_vec()?,
                amounts: reader.u64_vec()?,
            },
            _ => return Err(ProgramError::InvalidInstructionData),
        };

        if !reader.is_empty() {
            return Err(ProgramError::InvalidInstructionData);
        }

        Ok(instruction)
    }
}

/// Enum to allow updating the config account in the same instruction
#[derive(Clone, Debug, Eq, PartialEq, ShankType)]
pub enum ConfigField {
    /// Number of seasons between a withdrawal and its release
    WithdrawSeasons(u32),
}
