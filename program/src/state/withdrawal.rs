use bytemuck::{Pod, Zeroable};
use shank::ShankAccount;
use solana_program::{program_error::ProgramError, program_pack::IsInitialized, pubkey::Pubkey};
use spl_discriminator::SplDiscriminate;
use spl_pod::primitives::{PodU32, PodU64};

use crate::{err, error::SiloError};

/// Tokens waiting for their release season before they can be claimed.
///
/// Withdrawals from the same owner and token that share a release season are
/// merged into a single account.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, ShankAccount, SplDiscriminate, Zeroable)]
#[discriminator_hash_input("silo::state::withdrawal")]
pub struct Withdrawal {
    /// Account discriminator.
    discriminator: [u8; 8],

    pub owner: Pubkey,

    pub silo_token: Pubkey,

    /// First season at which the withdrawal can be claimed.
    pub release_season: PodU32,

    /// Amount of tokens pending.
    pub amount: PodU64,
}

impl Withdrawal {
    pub const LEN: usize = std::mem::size_of::<Withdrawal>();

    /// Checks whether the discriminator has been set and it is equal to
    /// `Withdrawal::SPL_DISCRIMINATOR_SLICE` or not.
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.discriminator.as_slice() == Withdrawal::SPL_DISCRIMINATOR_SLICE
    }

    /// Creates an empty `Withdrawal`.
    pub fn new(owner: Pubkey, silo_token: Pubkey, release_season: u32) -> Self {
        Self {
            discriminator: Withdrawal::SPL_DISCRIMINATOR.into(),
            owner,
            silo_token,
            release_season: release_season.into(),
            amount: PodU64::default(),
        }
    }

    #[inline(always)]
    pub fn amount(&self) -> u64 {
        self.amount.into()
    }

    /// Merges `amount` into the pending withdrawal.
    pub fn enqueue(&mut self, amount: u64) -> Result<(), ProgramError> {
        self.amount = self
            .amount()
            .checked_add(amount)
            .ok_or(ProgramError::ArithmeticOverflow)?
            .into();

        Ok(())
    }

    /// Whether the withdrawal can be claimed at `current_season`.
    #[inline(always)]
    pub fn is_claimable(&self, current_season: u32) -> bool {
        current_season >= u32::from(self.release_season)
    }

    /// Empties the withdrawal and returns the amount to pay out.
    pub fn claim(&mut self, current_season: u32) -> Result<u64, ProgramError> {
        let release_season = u32::from(self.release_season);

        if !self.is_claimable(current_season) {
            return err!(
                SiloError::NotYetClaimable,
                "withdrawal releases at season {}, current season is {}",
                release_season,
                current_season
            );
        }

        let amount = self.amount();

        if amount == 0 {
            return err!(
                SiloError::NothingToClaim,
                "withdrawal for season {} is empty",
                release_season
            );
        }

        self.amount = PodU64::default();

        Ok(amount)
    }
}

impl IsInitialized for Withdrawal {
    fn is_initialized(&self) -> bool {
        self.is_initialized()
    }
}
