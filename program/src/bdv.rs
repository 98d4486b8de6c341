//! Conversion of deposited token amounts into BDV.
//!
//! Pricing is split in two steps: [`load_bdv_source`] reads the external
//! price inputs of a token, and [`compute_bdv`] is a pure function of those
//! inputs. Processors always load the source before touching any crate, so a
//! failed price read leaves the ledger untouched.

use num_derive::FromPrimitive;
use shank::ShankType;
use solana_program::{account_info::AccountInfo, program_error::ProgramError};
use spl_token_2022::{extension::PodStateWithExtensions, pod::PodMint};

use crate::{
    err,
    error::SiloError,
    require,
    state::{CurvePool, SiloToken, RATE_PRECISION, VIRTUAL_PRICE_PRECISION},
};

/// Number of decimals of a BDV amount.
pub const BDV_DECIMALS: u8 = 6;

/// How a token's BDV is derived.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, Eq, FromPrimitive, PartialEq, ShankType)]
pub enum BdvPolicy {
    /// Constant BDV per token unit.
    #[default]
    Fixed,
    /// BDV follows the virtual price of an external curve pool.
    CurveDerived,
    /// BDV is the pro-rata share of the ripe underlying backing the token.
    UnripeProrata,
}

/// Price inputs of a token at the time of the call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BdvSource {
    Fixed {
        /// BDV per token unit, scaled by `RATE_PRECISION`.
        rate: u64,
    },
    Curve {
        /// Virtual price, scaled by `VIRTUAL_PRICE_PRECISION`.
        virtual_price: u128,
        /// Decimals of the LP token.
        decimals: u8,
    },
    Unripe {
        /// Redeemable ripe underlying.
        underlying: u64,
        /// Total supply of the unripe token.
        supply: u64,
    },
}

/// Reads the price inputs of `token` from `source_info`.
///
/// `decimals` are the decimals of the deposited token's mint.
pub fn load_bdv_source(
    token: &SiloToken,
    source_info: &AccountInfo,
    decimals: u8,
) -> Result<BdvSource, ProgramError> {
    require!(
        source_info.key == &token.bdv_source,
        SiloError::InvalidBdvSource,
        "bdv_source (expected {}, found {})",
        token.bdv_source,
        source_info.key
    );

    match token.policy()? {
        BdvPolicy::Fixed => Ok(BdvSource::Fixed {
            rate: token.fixed_rate.into(),
        }),
        BdvPolicy::CurveDerived => {
            let data = source_info.try_borrow_data()?;
            let pool = CurvePool::read(&data)?;

            Ok(BdvSource::Curve {
                virtual_price: pool.virtual_price.into(),
                decimals,
            })
        }
        BdvPolicy::UnripeProrata => {
            require!(
                source_info.owner == &spl_token_2022::ID,
                ProgramError::InvalidAccountOwner,
                "bdv_source (unripe mint)"
            );

            let data = source_info.try_borrow_data()?;
            let mint = PodStateWithExtensions::<PodMint>::unpack(&data)?;

            Ok(BdvSource::Unripe {
                underlying: token.underlying_amount.into(),
                supply: mint.base.supply.into(),
            })
        }
    }
}

/// Computes the BDV of `amount` token units.
///
/// Every division truncates toward zero.
pub fn compute_bdv(source: &BdvSource, amount: u64) -> Result<u64, ProgramError> {
    let amount = amount as u128;

    let bdv = match *source {
        BdvSource::Fixed { rate } => amount
            .checked_mul(rate as u128)
            .map(|value| value / RATE_PRECISION as u128),
        BdvSource::Curve {
            virtual_price,
            decimals,
        } => {
            if virtual_price == 0 {
                return err!(SiloError::OracleUnavailable, "virtual price is zero");
            }

            let value = amount.checked_mul(virtual_price);

            if decimals >= BDV_DECIMALS {
                let scale = 10u128
                    .checked_pow((decimals - BDV_DECIMALS) as u32)
                    .and_then(|scale| scale.checked_mul(VIRTUAL_PRICE_PRECISION));
                value.zip(scale).map(|(value, scale)| value / scale)
            } else {
                let scale = 10u128.checked_pow((BDV_DECIMALS - decimals) as u32);
                value
                    .zip(scale)
                    .and_then(|(value, scale)| value.checked_mul(scale))
                    .map(|value| value / VIRTUAL_PRICE_PRECISION)
            }
        }
        BdvSource::Unripe { underlying, supply } => {
            if supply == 0 {
                return err!(SiloError::OracleUnavailable, "unripe supply is zero");
            }

            amount
                .checked_mul(underlying as u128)
                .map(|value| value / supply as u128)
        }
    };

    bdv.and_then(|bdv| u64::try_from(bdv).ok())
        .ok_or(ProgramError::ArithmeticOverflow)
}
