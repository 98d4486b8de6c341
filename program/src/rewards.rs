//! Stalk and seeds accounting.
//!
//! Every balance change is applied to the farmer and to the config totals in
//! the same call, which keeps the sum of all farmer balances equal to the
//! global totals.

use solana_program::{msg, program_error::ProgramError};

use crate::{
    error::SiloError,
    state::{Config, Farmer, SiloToken},
};

/// Stalk and seeds attributed to an amount of BDV.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RewardDelta {
    pub stalk: u128,
    pub seeds: u128,
}

/// Rewards carried by `bdv` of `token` stamped at `crate_season`.
///
/// Seeds grow one stalk per season, so a crate also carries the stalk its
/// seeds have grown between `crate_season` and `current_season`.
pub fn rewards_for(
    token: &SiloToken,
    bdv: u64,
    crate_season: u32,
    current_season: u32,
) -> Result<RewardDelta, ProgramError> {
    let bdv = bdv as u128;
    let seeds = bdv
        .checked_mul(u32::from(token.seeds_per_bdv) as u128)
        .ok_or(ProgramError::ArithmeticOverflow)?;
    let grown = seeds
        .checked_mul(current_season.saturating_sub(crate_season) as u128)
        .ok_or(ProgramError::ArithmeticOverflow)?;
    let stalk = bdv
        .checked_mul(u32::from(token.stalk_per_bdv) as u128)
        .and_then(|stalk| stalk.checked_add(grown))
        .ok_or(ProgramError::ArithmeticOverflow)?;

    Ok(RewardDelta { stalk, seeds })
}

/// Credits the stalk grown by the farmer's seeds since its last update.
pub fn mow(config: &mut Config, farmer: &mut Farmer) -> Result<u128, ProgramError> {
    let current_season = config.current_season();
    let elapsed = current_season.saturating_sub(farmer.last_update.into());

    let grown = farmer
        .seeds()
        .checked_mul(elapsed as u128)
        .ok_or(ProgramError::ArithmeticOverflow)?;

    if grown > 0 {
        credit(
            config,
            farmer,
            RewardDelta {
                stalk: grown,
                seeds: 0,
            },
        )?;
    }

    farmer.last_update = current_season.into();

    Ok(grown)
}

/// Adds `delta` to the farmer and to the global totals.
pub fn credit(
    config: &mut Config,
    farmer: &mut Farmer,
    delta: RewardDelta,
) -> Result<(), ProgramError> {
    let farmer_stalk = farmer
        .stalk()
        .checked_add(delta.stalk)
        .ok_or(ProgramError::ArithmeticOverflow)?;
    let farmer_seeds = farmer
        .seeds()
        .checked_add(delta.seeds)
        .ok_or(ProgramError::ArithmeticOverflow)?;
    let total_stalk = u128::from(config.total_stalk)
        .checked_add(delta.stalk)
        .ok_or(ProgramError::ArithmeticOverflow)?;
    let total_seeds = u128::from(config.total_seeds)
        .checked_add(delta.seeds)
        .ok_or(ProgramError::ArithmeticOverflow)?;

    farmer.stalk = farmer_stalk.into();
    farmer.seeds = farmer_seeds.into();
    config.total_stalk = total_stalk.into();
    config.total_seeds = total_seeds.into();

    Ok(())
}

/// Subtracts `delta` from the farmer and from the global totals.
///
/// Nothing is written unless every balance can absorb the debit.
pub fn debit(
    config: &mut Config,
    farmer: &mut Farmer,
    delta: RewardDelta,
) -> Result<(), ProgramError> {
    let balances = (
        farmer.stalk().checked_sub(delta.stalk),
        farmer.seeds().checked_sub(delta.seeds),
        u128::from(config.total_stalk).checked_sub(delta.stalk),
        u128::from(config.total_seeds).checked_sub(delta.seeds),
    );

    let (Some(farmer_stalk), Some(farmer_seeds), Some(total_stalk), Some(total_seeds)) = balances
    else {
        msg!(
            "[FATAL] invariant violation: debit of {} stalk and {} seeds from {} exceeds balance \
             (stalk {}, seeds {})",
            delta.stalk,
            delta.seeds,
            farmer.owner,
            farmer.stalk(),
            farmer.seeds()
        );
        return Err(SiloError::Underflow.into());
    };

    farmer.stalk = farmer_stalk.into();
    farmer.seeds = farmer_seeds.into();
    config.total_stalk = total_stalk.into();
    config.total_seeds = total_seeds.into();

    Ok(())
}

#[cfg(test)]
mod tests {
    use solana_program::pubkey::Pubkey;
    use spl_pod::optional_keys::OptionalNonZeroPubkey;

    use super::*;
    use crate::{bdv::BdvPolicy, state::TokenSettings};

    fn setup() -> (Config, SiloToken, Farmer) {
        let config = Config::new(OptionalNonZeroPubkey::default(), 25, 255);
        let token = SiloToken::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::default(),
            TokenSettings {
                policy: BdvPolicy::Fixed,
                stalk_per_bdv: 10_000,
                seeds_per_bdv: 1,
                fixed_rate: 1_000_000,
                legacy_bdv_rate: 1_000_000,
            },
        );
        let farmer = Farmer::new(Pubkey::new_unique(), Pubkey::new_unique(), 1);

        (config, token, farmer)
    }

    #[test]
    fn test_rewards_for_includes_grown_stalk() {
        let (_, token, _) = setup();

        assert_eq!(
            rewards_for(&token, 500, 2, 2).unwrap(),
            RewardDelta {
                stalk: 5_000_000,
                seeds: 500
            }
        );
        assert_eq!(
            rewards_for(&token, 500, 2, 3).unwrap(),
            RewardDelta {
                stalk: 5_000_500,
                seeds: 500
            }
        );
    }

    #[test]
    fn test_credit_and_debit_are_symmetric() {
        let (mut config, token, mut farmer) = setup();
        let delta = rewards_for(&token, 1_000, 1, 1).unwrap();

        credit(&mut config, &mut farmer, delta).unwrap();
        assert_eq!(farmer.stalk(), 10_000_000);
        assert_eq!(farmer.seeds(), 1_000);
        assert_eq!(u128::from(config.total_stalk), 10_000_000);
        assert_eq!(u128::from(config.total_seeds), 1_000);

        debit(&mut config, &mut farmer, delta).unwrap();
        assert_eq!(farmer.stalk(), 0);
        assert_eq!(farmer.seeds(), 0);
        assert_eq!(u128::from(config.total_stalk), 0);
        assert_eq!(u128::from(config.total_seeds), 0);
    }

    #[test]
    fn test_debit_underflow_leaves_balances_untouched() {
        let (mut config, _, mut farmer) = setup();
        credit(
            &mut config,
            &mut farmer,
            RewardDelta {
                stalk: 100,
                seeds: 10,
            },
        )
        .unwrap();

        let result = debit(
            &mut config,
            &mut farmer,
            RewardDelta {
                stalk: 50,
                seeds: 11,
            },
        );

        assert_eq!(
            result.unwrap_err(),
            ProgramError::Custom(SiloError::Underflow as u32)
        );
        assert_eq!(farmer.stalk(), 100);
        assert_eq!(farmer.seeds(), 10);
        assert_eq!(u128::from(config.total_stalk), 100);
    }

    #[test]
    fn test_mow_credits_grown_stalk() {
        let (mut config, _, mut farmer) = setup();
        credit(
            &mut config,
            &mut farmer,
            RewardDelta {
                stalk: 10_000_000,
                seeds: 1_000,
            },
        )
        .unwrap();

        config.advance_season().unwrap();
        config.advance_season().unwrap();

        assert_eq!(mow(&mut config, &mut farmer).unwrap(), 2_000);
        assert_eq!(farmer.stalk(), 10_002_000);
        assert_eq!(u128::from(config.total_stalk), 10_002_000);
        assert_eq!(u32::from(farmer.last_update), 3);

        // Same season: nothing left to grow.
        assert_eq!(mow(&mut config, &mut farmer).unwrap(), 0);
        assert_eq!(farmer.stalk(), 10_002_000);
    }
}
