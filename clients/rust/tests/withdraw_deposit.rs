#![cfg(feature = "test-sbf")]

mod setup;

use setup::{FarmerManager, SiloManager};
use silo_program_client::{accounts::RATE_PRECISION, error::SiloError};
use solana_program_test::{tokio, ProgramTest};

mod withdraw_deposit {

    use super::*;

    #[tokio::test]
    async fn withdraw_part_of_crate() {
        let mut context = ProgramTest::new("silo_program", silo_program_client::ID, None)
            .start_with_context()
            .await;

        // Given a farmer with a 1_000 tokens crate at season 2.

        let silo = SiloManager::new(&mut context).await;
        let token = silo.whitelist_fixed(&mut context, RATE_PRECISION).await;
        let farmer = FarmerManager::new(&mut context, &token, 1_000).await;
        silo.sunrise(&mut context, 1).await;

        farmer
            .deposit(&mut context, &silo, &token, 1_000)
            .await
            .unwrap();

        // When the farmer withdraws half of the crate.

        let release_season = farmer
            .withdraw(&mut context, &silo, &token, 2, 500)
            .await
            .unwrap();

        // Then the crate keeps the other half.

        let deposit = farmer.crate_at(&mut context, &token, 2).await.unwrap();
        assert_eq!(deposit.amount(), 500);
        assert_eq!(deposit.bdv(), 500);

        // And the tokens are queued until 25 seasons later.

        assert_eq!(release_season, 27);
        let withdrawal = farmer
            .withdrawal_at(&mut context, &token, 27)
            .await
            .unwrap();
        assert_eq!(withdrawal.amount(), 500);

        let state = farmer.state(&mut context, &silo).await;
        assert_eq!(state.stalk(), 5_000_000);
        assert_eq!(state.seeds(), 500);

        let token_state = token.state(&mut context).await;
        assert_eq!(u64::from(token_state.total_deposited), 500);
        assert_eq!(u64::from(token_state.total_deposited_bdv), 500);
        assert_eq!(u64::from(token_state.total_withdrawn), 500);
    }

    #[tokio::test]
    async fn withdraw_whole_crate_closes_it() {
        let mut context = ProgramTest::new("silo_program", silo_program_client::ID, None)
            .start_with_context()
            .await;

        let silo = SiloManager::new(&mut context).await;
        let token = silo.whitelist_fixed(&mut context, RATE_PRECISION).await;
        let farmer = FarmerManager::new(&mut context, &token, 1_000).await;

        farmer
            .deposit(&mut context, &silo, &token, 1_000)
            .await
            .unwrap();

        farmer
            .withdraw(&mut context, &silo, &token, 1, 1_000)
            .await
            .unwrap();

        // The crate account is gone and the rewards are cleared.

        assert!(farmer.crate_at(&mut context, &token, 1).await.is_none());

        let state = farmer.state(&mut context, &silo).await;
        assert_eq!(state.stalk(), 0);
        assert_eq!(state.seeds(), 0);

        let config = silo.config(&mut context).await;
        assert_eq!(u128::from(config.total_stalk), 0);
        assert_eq!(u128::from(config.total_seeds), 0);
    }

    #[tokio::test]
    async fn fail_withdraw_more_than_crate() {
        let mut context = ProgramTest::new("silo_program", silo_program_client::ID, None)
            .start_with_context()
            .await;

        let silo = SiloManager::new(&mut context).await;
        let token = silo.whitelist_fixed(&mut context, RATE_PRECISION).await;
        let farmer = FarmerManager::new(&mut context, &token, 1_000).await;

        farmer
            .deposit(&mut context, &silo, &token, 1_000)
            .await
            .unwrap();

        let err = farmer
            .withdraw(&mut context, &silo, &token, 1, 1_001)
            .await
            .unwrap_err();

        assert_custom_error!(err, SiloError::InsufficientCrateBalance);

        let deposit = farmer.crate_at(&mut context, &token, 1).await.unwrap();
        assert_eq!(deposit.amount(), 1_000);
    }

    #[tokio::test]
    async fn fail_withdraw_missing_crate() {
        let mut context = ProgramTest::new("silo_program", silo_program_client::ID, None)
            .start_with_context()
            .await;

        // Given a farmer with a crate at season 1 only.

        let silo = SiloManager::new(&mut context).await;
        let token = silo.whitelist_fixed(&mut context, RATE_PRECISION).await;
        let farmer = FarmerManager::new(&mut context, &token, 1_000).await;

        farmer
            .deposit(&mut context, &silo, &token, 1_000)
            .await
            .unwrap();

        // When the farmer tries to withdraw from season 5.

        let err = farmer
            .withdraw(&mut context, &silo, &token, 5, 100)
            .await
            .unwrap_err();

        // Then we expect an error.

        assert_custom_error!(err, SiloError::CrateNotFound);
    }

    #[tokio::test]
    async fn fail_withdraw_zero_amount() {
        let mut context = ProgramTest::new("silo_program", silo_program_client::ID, None)
            .start_with_context()
            .await;

        let silo = SiloManager::new(&mut context).await;
        let token = silo.whitelist_fixed(&mut context, RATE_PRECISION).await;
        let farmer = FarmerManager::new(&mut context, &token, 1_000).await;

        farmer
            .deposit(&mut context, &silo, &token, 1_000)
            .await
            .unwrap();

        let err = farmer
            .withdraw(&mut context, &silo, &token, 1, 0)
            .await
            .unwrap_err();

        assert_custom_error!(err, SiloError::ZeroAmount);
    }
}
