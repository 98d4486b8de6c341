use bytemuck::{Pod, Zeroable};
use shank::ShankAccount;
use solana_program::{program_error::ProgramError, program_pack::IsInitialized};
use spl_discriminator::SplDiscriminate;
use spl_pod::{
    optional_keys::OptionalNonZeroPubkey,
    primitives::{PodU128, PodU32},
};

/// Number of seasons a withdrawal waits before it can be claimed.
pub const DEFAULT_WITHDRAW_SEASONS: u32 = 25;

/// Global configuration of a Silo.
///
/// Holds the current season (the epoch every crate and withdrawal is keyed
/// by) and the protocol-wide stalk and seeds totals.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, ShankAccount, SplDiscriminate, Zeroable)]
#[discriminator_hash_input("silo::state::config")]
pub struct Config {
    /// Account discriminator.
    ///
    /// The discriminator is equal to `ArrayDiscriminator::UNINITIALIZED` when
    /// the account is empty, and equal to `Config::DISCRIMINATOR` when the account
    /// is initialized.
    discriminator: [u8; 8],

    /// Authority that can modify any elements in the config and manage the
    /// token whitelist.
    pub authority: OptionalNonZeroPubkey,

    /// Current season.
    ///
    /// Starts at 1 and only moves forward through `Sunrise`.
    pub current_season: PodU32,

    /// Delay, in seasons, between a withdrawal and the moment it can be claimed.
    pub withdraw_seasons: PodU32,

    /// Sum of the stalk balances of every farmer.
    pub total_stalk: PodU128,

    /// Sum of the seeds balances of every farmer.
    pub total_seeds: PodU128,

    /// Bump seed for the vault authority PDA.
    pub vault_authority_bump: u8,
}

impl Config {
    pub const LEN: usize = std::mem::size_of::<Config>();

    /// Checks whether the discriminator has been set and it is equal to
    /// `Config::SPL_DISCRIMINATOR_SLICE` or not.
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.discriminator.as_slice() == Config::SPL_DISCRIMINATOR_SLICE
    }

    /// Creates a new `Config` at season 1.
    pub fn new(
        authority: OptionalNonZeroPubkey,
        withdraw_seasons: u32,
        vault_authority_bump: u8,
    ) -> Self {
        Self {
            discriminator: Config::SPL_DISCRIMINATOR.into(),
            authority,
            current_season: PodU32::from(1),
            withdraw_seasons: withdraw_seasons.into(),
            vault_authority_bump,
            ..Default::default()
        }
    }

    #[inline(always)]
    pub fn current_season(&self) -> u32 {
        self.current_season.into()
    }

    /// Season at which a withdrawal made now becomes claimable.
    pub fn release_season(&self) -> Result<u32, ProgramError> {
        u32::from(self.current_season)
            .checked_add(self.withdraw_seasons.into())
            .ok_or(ProgramError::ArithmeticOverflow)
    }

    /// Moves the season forward by one.
    pub fn advance_season(&mut self) -> Result<u32, ProgramError> {
        let season = u32::from(self.current_season)
            .checked_add(1)
            .ok_or(ProgramError::ArithmeticOverflow)?;
        self.current_season = season.into();

        Ok(season)
    }
}

impl IsInitialized for Config {
    fn is_initialized(&self) -> bool {
        self.is_initialized()
    }
}
