use bytemuck::{Pod, Zeroable};
use shank::ShankAccount;
use solana_program::{program_error::ProgramError, program_pack::IsInitialized, pubkey::Pubkey};
use spl_discriminator::SplDiscriminate;
use spl_pod::primitives::{PodU32, PodU64};

use super::RATE_PRECISION;

/// A season-stamped deposit ("crate").
///
/// The crate address is derived from `(silo_token, owner, season)`; deposits
/// made in the same season merge into the same crate. A crate whose amount
/// reaches zero is closed.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, ShankAccount, SplDiscriminate, Zeroable)]
#[discriminator_hash_input("silo::state::deposit")]
pub struct Deposit {
    /// Account discriminator.
    ///
    /// Legacy crates carry the `LegacyDeposit` discriminator at the same
    /// address until they are migrated.
    discriminator: [u8; 8],

    pub owner: Pubkey,

    pub silo_token: Pubkey,

    /// Season the crate is stamped with.
    pub season: PodU32,

    /// Deposited amount in raw token units.
    pub amount: PodU64,

    /// BDV of the deposited amount.
    pub bdv: PodU64,
}

impl Deposit {
    pub const LEN: usize = std::mem::size_of::<Deposit>();

    /// Checks whether the discriminator has been set and it is equal to
    /// `Deposit::SPL_DISCRIMINATOR_SLICE` or not.
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.discriminator.as_slice() == Deposit::SPL_DISCRIMINATOR_SLICE
    }

    /// Creates an empty `Deposit` stamped with `season`.
    pub fn new(owner: Pubkey, silo_token: Pubkey, season: u32) -> Self {
        Self {
            discriminator: Deposit::SPL_DISCRIMINATOR.into(),
            owner,
            silo_token,
            season: season.into(),
            amount: PodU64::default(),
            bdv: PodU64::default(),
        }
    }

    #[inline(always)]
    pub fn season(&self) -> u32 {
        self.season.into()
    }

    #[inline(always)]
    pub fn amount(&self) -> u64 {
        self.amount.into()
    }

    #[inline(always)]
    pub fn bdv(&self) -> u64 {
        self.bdv.into()
    }

    /// Whether the crate has been fully withdrawn or transferred out.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.amount() == 0
    }
}

impl IsInitialized for Deposit {
    fn is_initialized(&self) -> bool {
        self.is_initialized()
    }
}

/// A crate written before BDV was stored per crate.
///
/// Shares the address derivation and size of `Deposit` so it can be upgraded
/// in place.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, ShankAccount, SplDiscriminate, Zeroable)]
#[discriminator_hash_input("silo::state::legacy_deposit")]
pub struct LegacyDeposit {
    /// Account discriminator.
    discriminator: [u8; 8],

    pub owner: Pubkey,

    pub silo_token: Pubkey,

    pub season: PodU32,

    pub amount: PodU64,

    _reserved: [u8; 8],
}

impl LegacyDeposit {
    pub const LEN: usize = std::mem::size_of::<LegacyDeposit>();

    /// Checks whether the discriminator has been set and it is equal to
    /// `LegacyDeposit::SPL_DISCRIMINATOR_SLICE` or not.
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.discriminator.as_slice() == LegacyDeposit::SPL_DISCRIMINATOR_SLICE
    }

    pub fn new(owner: Pubkey, silo_token: Pubkey, season: u32, amount: u64) -> Self {
        Self {
            discriminator: LegacyDeposit::SPL_DISCRIMINATOR.into(),
            owner,
            silo_token,
            season: season.into(),
            amount: amount.into(),
            _reserved: [0; 8],
        }
    }

    /// Returns the current-format crate equivalent to this legacy crate.
    ///
    /// The BDV is derived with the rate in force when the crate was created,
    /// not with the token's current pricing.
    pub fn to_deposit(&self, legacy_bdv_rate: u64) -> Result<Deposit, ProgramError> {
        let amount = u64::from(self.amount);
        let bdv = (amount as u128)
            .checked_mul(legacy_bdv_rate as u128)
            .map(|value| value / RATE_PRECISION as u128)
            .and_then(|value| u64::try_from(value).ok())
            .ok_or(ProgramError::ArithmeticOverflow)?;

        let mut deposit = Deposit::new(self.owner, self.silo_token, self.season.into());
        deposit.amount = amount.into();
        deposit.bdv = bdv.into();

        Ok(deposit)
    }
}

impl IsInitialized for LegacyDeposit {
    fn is_initialized(&self) -> bool {
        self.is_initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layouts_match() {
        assert_eq!(Deposit::LEN, LegacyDeposit::LEN);
        assert_ne!(
            Deposit::SPL_DISCRIMINATOR_SLICE,
            LegacyDeposit::SPL_DISCRIMINATOR_SLICE
        );
    }

    #[test]
    fn test_legacy_to_deposit_uses_legacy_rate() {
        let owner = Pubkey::new_unique();
        let silo_token = Pubkey::new_unique();
        let legacy = LegacyDeposit::new(owner, silo_token, 2, 1_000);

        // 0.5 BDV per unit
        let deposit = legacy.to_deposit(500_000).unwrap();

        assert!(deposit.is_initialized());
        assert_eq!(deposit.owner, owner);
        assert_eq!(deposit.silo_token, silo_token);
        assert_eq!(deposit.season(), 2);
        assert_eq!(deposit.amount(), 1_000);
        assert_eq!(deposit.bdv(), 500);
    }

    #[test]
    fn test_legacy_to_deposit_truncates() {
        let legacy = LegacyDeposit::new(Pubkey::new_unique(), Pubkey::new_unique(), 2, 3);

        // 3 * 0.333333 = 0.999999
        assert_eq!(legacy.to_deposit(333_333).unwrap().bdv(), 0);
    }
}
