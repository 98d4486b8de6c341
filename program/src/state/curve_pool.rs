use bytemuck::{Pod, Zeroable};
use solana_program::program_error::ProgramError;
use spl_pod::primitives::PodU128;

use crate::{err, error::SiloError};

/// Precision of the curve virtual price.
pub const VIRTUAL_PRICE_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Price data published by an external two-asset curve pool.
///
/// The Silo only reads this account; it is owned and written by the pool.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct CurvePool {
    /// Value of one LP token in BDV, scaled by `VIRTUAL_PRICE_PRECISION`.
    pub virtual_price: PodU128,

    /// Reserves of the two pool assets.
    pub balances: [PodU128; 2],

    /// Total supply of LP tokens.
    pub supply: PodU128,
}

impl CurvePool {
    pub const LEN: usize = std::mem::size_of::<CurvePool>();

    /// Reads the pool from the start of `data`.
    ///
    /// The pool is unavailable when the data is too short or when any of the
    /// published values is zero.
    pub fn read(data: &[u8]) -> Result<Self, ProgramError> {
        let pool = match data.get(..Self::LEN) {
            Some(bytes) => bytemuck::pod_read_unaligned::<CurvePool>(bytes),
            None => return err!(SiloError::OracleUnavailable, "curve pool data too short"),
        };

        let virtual_price = u128::from(pool.virtual_price);
        let supply = u128::from(pool.supply);

        if virtual_price == 0
            || supply == 0
            || pool.balances.iter().any(|balance| u128::from(*balance) == 0)
        {
            return err!(
                SiloError::OracleUnavailable,
                "curve pool is not live (virtual price {}, supply {})",
                virtual_price,
                supply
            );
        }

        Ok(pool)
    }
}
