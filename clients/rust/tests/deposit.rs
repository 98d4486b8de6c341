#![cfg(feature = "test-sbf")]

mod setup;

use setup::{set_curve_pool, token_balance, FarmerManager, SiloManager};
use silo_program_client::{
    accounts::{RATE_PRECISION, VIRTUAL_PRICE_PRECISION},
    error::SiloError,
    instructions::dewhitelist_token,
};
use solana_program_test::{tokio, ProgramTest};
use solana_sdk::{pubkey::Pubkey, signature::Signer, transaction::Transaction};

mod deposit {

    use super::*;

    #[tokio::test]
    async fn deposit_fixed_token() {
        let mut context = ProgramTest::new("silo_program", silo_program_client::ID, None)
            .start_with_context()
            .await;

        // Given a fixed-rate token (1 bdv per unit) and a farmer with 1_000 tokens.

        let silo = SiloManager::new(&mut context).await;
        let token = silo.whitelist_fixed(&mut context, RATE_PRECISION).await;
        let farmer = FarmerManager::new(&mut context, &token, 1_000).await;

        // When the farmer deposits 1_000 tokens at season 1.

        farmer
            .deposit(&mut context, &silo, &token, 1_000)
            .await
            .unwrap();

        // Then a crate is created for the current season.

        let deposit = farmer.crate_at(&mut context, &token, 1).await.unwrap();
        assert_eq!(deposit.owner, farmer.owner.pubkey());
        assert_eq!(deposit.silo_token, token.silo_token);
        assert_eq!(deposit.season(), 1);
        assert_eq!(deposit.amount(), 1_000);
        assert_eq!(deposit.bdv(), 1_000);

        // And the rewards are credited to the farmer and the config.

        let state = farmer.state(&mut context, &silo).await;
        assert_eq!(state.stalk(), 10_000_000);
        assert_eq!(state.seeds(), 1_000);

        let config = silo.config(&mut context).await;
        assert_eq!(u128::from(config.total_stalk), 10_000_000);
        assert_eq!(u128::from(config.total_seeds), 1_000);

        // And the tokens are held by the vault.

        let token_state = token.state(&mut context).await;
        assert_eq!(u64::from(token_state.total_deposited), 1_000);
        assert_eq!(u64::from(token_state.total_deposited_bdv), 1_000);
        assert_eq!(token_balance(&mut context, &token.vault).await, 1_000);
        assert_eq!(token_balance(&mut context, &farmer.token_account).await, 0);
    }

    #[tokio::test]
    async fn deposit_twice_in_same_season_merges_crate() {
        let mut context = ProgramTest::new("silo_program", silo_program_client::ID, None)
            .start_with_context()
            .await;

        // Given a farmer with a crate at season 2.

        let silo = SiloManager::new(&mut context).await;
        let token = silo.whitelist_fixed(&mut context, RATE_PRECISION).await;
        let farmer = FarmerManager::new(&mut context, &token, 2_000).await;
        silo.sunrise(&mut context, 1).await;

        farmer
            .deposit(&mut context, &silo, &token, 1_000)
            .await
            .unwrap();

        // When the farmer deposits again in the same season.

        farmer
            .deposit(&mut context, &silo, &token, 1_000)
            .await
            .unwrap();

        // Then both deposits share one crate.

        let deposit = farmer.crate_at(&mut context, &token, 2).await.unwrap();
        assert_eq!(deposit.amount(), 2_000);
        assert_eq!(deposit.bdv(), 2_000);

        let state = farmer.state(&mut context, &silo).await;
        assert_eq!(state.stalk(), 20_000_000);
        assert_eq!(state.seeds(), 2_000);
    }

    #[tokio::test]
    async fn deposit_curve_token() {
        let mut context = ProgramTest::new("silo_program", silo_program_client::ID, None)
            .start_with_context()
            .await;

        // Given an LP token priced by a curve pool at virtual price 1.0.

        let silo = SiloManager::new(&mut context).await;
        let pool = Pubkey::new_unique();
        set_curve_pool(&mut context, &pool, VIRTUAL_PRICE_PRECISION, 1_000_000_000);

        let token = silo.whitelist_curve(&mut context, &pool).await;
        let farmer = FarmerManager::new(&mut context, &token, 200_000_000).await;

        // When the farmer deposits 200 LP tokens.

        farmer
            .deposit(&mut context, &silo, &token, 200_000_000)
            .await
            .unwrap();

        // Then the crate is valued at 200 bdv.

        let deposit = farmer.crate_at(&mut context, &token, 1).await.unwrap();
        assert_eq!(deposit.bdv(), 200_000_000);

        let state = farmer.state(&mut context, &silo).await;
        assert_eq!(state.seeds(), 800_000_000);
    }

    #[tokio::test]
    async fn fail_deposit_curve_token_with_unavailable_pool() {
        let mut context = ProgramTest::new("silo_program", silo_program_client::ID, None)
            .start_with_context()
            .await;

        // Given an LP token whose pool has been drained after whitelisting.

        let silo = SiloManager::new(&mut context).await;
        let pool = Pubkey::new_unique();
        set_curve_pool(&mut context, &pool, VIRTUAL_PRICE_PRECISION, 1_000_000_000);

        let token = silo.whitelist_curve(&mut context, &pool).await;
        let farmer = FarmerManager::new(&mut context, &token, 200_000_000).await;

        set_curve_pool(&mut context, &pool, 0, 1_000_000_000);

        // When the farmer tries to deposit.

        let err = farmer
            .deposit(&mut context, &silo, &token, 200_000_000)
            .await
            .unwrap_err();

        // Then we expect an error and nothing was recorded.

        assert_custom_error!(err, SiloError::OracleUnavailable);
        assert!(farmer.crate_at(&mut context, &token, 1).await.is_none());
        assert_eq!(
            token_balance(&mut context, &farmer.token_account).await,
            200_000_000
        );
    }

    #[tokio::test]
    async fn fail_deposit_zero_amount() {
        let mut context = ProgramTest::new("silo_program", silo_program_client::ID, None)
            .start_with_context()
            .await;

        let silo = SiloManager::new(&mut context).await;
        let token = silo.whitelist_fixed(&mut context, RATE_PRECISION).await;
        let farmer = FarmerManager::new(&mut context, &token, 1_000).await;

        let err = farmer
            .deposit(&mut context, &silo, &token, 0)
            .await
            .unwrap_err();

        assert_custom_error!(err, SiloError::ZeroAmount);
    }

    #[tokio::test]
    async fn fail_deposit_dewhitelisted_token() {
        let mut context = ProgramTest::new("silo_program", silo_program_client::ID, None)
            .start_with_context()
            .await;

        // Given a token that has been dewhitelisted.

        let silo = SiloManager::new(&mut context).await;
        let token = silo.whitelist_fixed(&mut context, RATE_PRECISION).await;
        let farmer = FarmerManager::new(&mut context, &token, 1_000).await;

        let tx = Transaction::new_signed_with_payer(
            &[dewhitelist_token(
                &silo.config,
                &silo.authority.pubkey(),
                &token.mint.pubkey(),
            )],
            Some(&context.payer.pubkey()),
            &[&context.payer, &silo.authority],
            context.last_blockhash,
        );
        context.banks_client.process_transaction(tx).await.unwrap();

        // When the farmer tries to deposit.

        let err = farmer
            .deposit(&mut context, &silo, &token, 1_000)
            .await
            .unwrap_err();

        // Then we expect an error.

        assert_custom_error!(err, SiloError::TokenNotWhitelisted);
    }

    #[tokio::test]
    async fn fail_deposit_more_than_balance() {
        let mut context = ProgramTest::new("silo_program", silo_program_client::ID, None)
            .start_with_context()
            .await;

        // Given a farmer holding 500 tokens.

        let silo = SiloManager::new(&mut context).await;
        let token = silo.whitelist_fixed(&mut context, RATE_PRECISION).await;
        let farmer = FarmerManager::new(&mut context, &token, 500).await;

        // When the farmer tries to deposit 1_000 tokens.

        let result = farmer.deposit(&mut context, &silo, &token, 1_000).await;

        // Then the token transfer fails and the whole deposit is reverted.

        assert!(result.is_err());
        assert!(farmer.crate_at(&mut context, &token, 1).await.is_none());
        assert_eq!(u64::from(token.state(&mut context).await.total_deposited), 0);
    }
}
