use bytemuck::{Pod, Zeroable};
use num_traits::FromPrimitive;
use shank::ShankAccount;
use solana_program::{
    msg, program_error::ProgramError, program_pack::IsInitialized, pubkey::Pubkey,
};
use spl_discriminator::SplDiscriminate;
use spl_pod::primitives::{PodBool, PodU32, PodU64};

use crate::{bdv::BdvPolicy, error::SiloError};

/// A token eligible for deposit in the Silo.
///
/// Besides the reward rates and BDV policy fixed at whitelisting, the account
/// also carries the per-token totals of the ledger.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, ShankAccount, SplDiscriminate, Zeroable)]
#[discriminator_hash_input("silo::state::silo_token")]
pub struct SiloToken {
    /// Account discriminator.
    discriminator: [u8; 8],

    /// Silo config the token belongs to.
    pub config: Pubkey,

    /// Mint of the deposited token.
    pub mint: Pubkey,

    /// Token account holding every deposit and unclaimed withdrawal.
    pub vault: Pubkey,

    /// Account the BDV is read from: the curve pool for curve-derived tokens,
    /// the token mint otherwise.
    pub bdv_source: Pubkey,

    /// Underlying ripe mint of an unripe token (default key for other policies).
    pub ripe_mint: Pubkey,

    /// `BdvPolicy` discriminant.
    policy: u8,

    /// Whether new deposits are accepted.
    pub whitelisted: PodBool,

    /// Stalk credited per unit of BDV.
    pub stalk_per_bdv: PodU32,

    /// Seeds credited per unit of BDV.
    pub seeds_per_bdv: PodU32,

    /// BDV per token unit for the fixed policy, scaled by `RATE_PRECISION`.
    pub fixed_rate: PodU64,

    /// BDV per token unit in force before the current crate format, scaled by
    /// `RATE_PRECISION`. Used to migrate legacy crates.
    pub legacy_bdv_rate: PodU64,

    /// Redeemable ripe underlying backing an unripe token.
    pub underlying_amount: PodU64,

    /// Sum of the amounts of every crate of this token.
    pub total_deposited: PodU64,

    /// Sum of the BDV of every crate of this token.
    pub total_deposited_bdv: PodU64,

    /// Amount withdrawn and not yet claimed.
    pub total_withdrawn: PodU64,
}

/// Parameters of a token at whitelisting.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TokenSettings {
    pub policy: BdvPolicy,
    pub stalk_per_bdv: u32,
    pub seeds_per_bdv: u32,
    pub fixed_rate: u64,
    pub legacy_bdv_rate: u64,
}

impl SiloToken {
    pub const LEN: usize = std::mem::size_of::<SiloToken>();

    /// Checks whether the discriminator has been set and it is equal to
    /// `SiloToken::SPL_DISCRIMINATOR_SLICE` or not.
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.discriminator.as_slice() == SiloToken::SPL_DISCRIMINATOR_SLICE
    }

    /// Creates a new whitelisted `SiloToken`.
    pub fn new(
        config: Pubkey,
        mint: Pubkey,
        vault: Pubkey,
        bdv_source: Pubkey,
        ripe_mint: Pubkey,
        settings: TokenSettings,
    ) -> Self {
        Self {
            discriminator: SiloToken::SPL_DISCRIMINATOR.into(),
            config,
            mint,
            vault,
            bdv_source,
            ripe_mint,
            policy: settings.policy as u8,
            whitelisted: true.into(),
            stalk_per_bdv: settings.stalk_per_bdv.into(),
            seeds_per_bdv: settings.seeds_per_bdv.into(),
            fixed_rate: settings.fixed_rate.into(),
            legacy_bdv_rate: settings.legacy_bdv_rate.into(),
            ..Default::default()
        }
    }

    /// Returns the BDV policy of the token.
    ///
    /// A stored value that does not map to a policy means the entry is not a
    /// token this program knows how to price.
    pub fn policy(&self) -> Result<BdvPolicy, ProgramError> {
        BdvPolicy::from_u8(self.policy).ok_or_else(|| SiloError::UnknownToken.into())
    }

    #[inline(always)]
    pub fn is_whitelisted(&self) -> bool {
        bool::from(self.whitelisted)
    }

    /// Adds a crate's amount and BDV to the token totals.
    pub fn add_deposited(&mut self, amount: u64, bdv: u64) -> Result<(), ProgramError> {
        self.total_deposited = u64::from(self.total_deposited)
            .checked_add(amount)
            .ok_or(ProgramError::ArithmeticOverflow)?
            .into();
        self.total_deposited_bdv = u64::from(self.total_deposited_bdv)
            .checked_add(bdv)
            .ok_or(ProgramError::ArithmeticOverflow)?
            .into();

        Ok(())
    }

    /// Removes a crate's amount and BDV from the token totals.
    pub fn remove_deposited(&mut self, amount: u64, bdv: u64) -> Result<(), ProgramError> {
        let totals = (
            u64::from(self.total_deposited).checked_sub(amount),
            u64::from(self.total_deposited_bdv).checked_sub(bdv),
        );

        let (Some(total_deposited), Some(total_deposited_bdv)) = totals else {
            msg!(
                "[FATAL] invariant violation: removal of {} tokens ({} bdv) of {} exceeds totals \
                 (deposited {}, bdv {})",
                amount,
                bdv,
                self.mint,
                u64::from(self.total_deposited),
                u64::from(self.total_deposited_bdv)
            );
            return Err(SiloError::Underflow.into());
        };

        self.total_deposited = total_deposited.into();
        self.total_deposited_bdv = total_deposited_bdv.into();

        Ok(())
    }

    pub fn add_withdrawn(&mut self, amount: u64) -> Result<(), ProgramError> {
        self.total_withdrawn = u64::from(self.total_withdrawn)
            .checked_add(amount)
            .ok_or(ProgramError::ArithmeticOverflow)?
            .into();

        Ok(())
    }

    pub fn remove_withdrawn(&mut self, amount: u64) -> Result<(), ProgramError> {
        let Some(total_withdrawn) = u64::from(self.total_withdrawn).checked_sub(amount) else {
            msg!(
                "[FATAL] invariant violation: claim of {} tokens of {} exceeds withdrawn total {}",
                amount,
                self.mint,
                u64::from(self.total_withdrawn)
            );
            return Err(SiloError::Underflow.into());
        };

        self.total_withdrawn = total_withdrawn.into();

        Ok(())
    }
}

impl IsInitialized for SiloToken {
    fn is_initialized(&self) -> bool {
        self.is_initialized()
    }
}
