//! Upgrade of legacy crates to the current crate format.

use solana_program::{msg, program_error::ProgramError};
use spl_discriminator::{ArrayDiscriminator, SplDiscriminate};

use crate::{
    processor::unpack_initialized,
    state::{Deposit, LegacyDeposit, SiloToken},
};

/// Format of the data stored at a crate address.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CrateFormat {
    Current(Deposit),
    Legacy(LegacyDeposit),
}

impl CrateFormat {
    /// Reads the crate format from the account data.
    pub fn read(data: &[u8]) -> Result<Self, ProgramError> {
        if data.len() != Deposit::LEN {
            return Err(ProgramError::InvalidAccountData);
        }

        match &data[..ArrayDiscriminator::LENGTH] {
            Deposit::SPL_DISCRIMINATOR_SLICE => {
                Ok(Self::Current(*unpack_initialized::<Deposit>(data)?))
            }
            LegacyDeposit::SPL_DISCRIMINATOR_SLICE => {
                Ok(Self::Legacy(*unpack_initialized::<LegacyDeposit>(data)?))
            }
            _ => Err(ProgramError::InvalidAccountData),
        }
    }
}

/// Rewrites a legacy crate in place as a current crate.
///
/// The BDV is derived from the token's legacy rate. Stalk and seeds were
/// credited when the legacy crate was created, so no totals change. Returns
/// `true` when the data was rewritten; calling it on a current crate is a
/// no-op.
pub fn migrate_crate(data: &mut [u8], token: &SiloToken) -> Result<bool, ProgramError> {
    match CrateFormat::read(data)? {
        CrateFormat::Current(_) => Ok(false),
        CrateFormat::Legacy(legacy) => {
            let deposit = legacy.to_deposit(token.legacy_bdv_rate.into())?;
            data.copy_from_slice(bytemuck::bytes_of(&deposit));

            msg!(
                "Migrated legacy crate at season {} (amount {}, bdv {})",
                deposit.season(),
                deposit.amount(),
                deposit.bdv()
            );

            Ok(true)
        }
    }
}
