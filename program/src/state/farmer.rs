use bytemuck::{Pod, Zeroable};
use shank::ShankAccount;
use solana_program::{program_pack::IsInitialized, pubkey::Pubkey};
use spl_discriminator::SplDiscriminate;
use spl_pod::primitives::{PodU128, PodU32};

/// Stalk and seeds balances of a single account.
///
/// Created on the account's first deposit (or first incoming crate transfer)
/// and never closed.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, ShankAccount, SplDiscriminate, Zeroable)]
#[discriminator_hash_input("silo::state::farmer")]
pub struct Farmer {
    /// Account discriminator.
    discriminator: [u8; 8],

    /// Silo config the balances belong to.
    pub config: Pubkey,

    /// Owner of the balances.
    pub owner: Pubkey,

    /// Stalk balance, including grown stalk credited up to `last_update`.
    pub stalk: PodU128,

    /// Seeds balance.
    pub seeds: PodU128,

    /// Season at which grown stalk was last credited.
    pub last_update: PodU32,
}

impl Farmer {
    pub const LEN: usize = std::mem::size_of::<Farmer>();

    /// Checks whether the discriminator has been set and it is equal to
    /// `Farmer::SPL_DISCRIMINATOR_SLICE` or not.
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.discriminator.as_slice() == Farmer::SPL_DISCRIMINATOR_SLICE
    }

    /// Creates an empty `Farmer` whose grown stalk starts accruing at `season`.
    pub fn new(config: Pubkey, owner: Pubkey, season: u32) -> Self {
        Self {
            discriminator: Farmer::SPL_DISCRIMINATOR.into(),
            config,
            owner,
            last_update: season.into(),
            ..Default::default()
        }
    }

    #[inline(always)]
    pub fn stalk(&self) -> u128 {
        self.stalk.into()
    }

    #[inline(always)]
    pub fn seeds(&self) -> u128 {
        self.seeds.into()
    }
}

impl IsInitialized for Farmer {
    fn is_initialized(&self) -> bool {
        self.is_initialized()
    }
}
