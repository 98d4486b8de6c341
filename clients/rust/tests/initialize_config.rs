#![cfg(feature = "test-sbf")]

mod setup;

use setup::get_state;
use silo_program_client::{accounts::Config, instructions::initialize_config};
use solana_program_test::{tokio, ProgramTest};
use solana_sdk::{
    instruction::InstructionError,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction,
    transaction::Transaction,
};

mod initialize_config {

    use super::*;

    #[tokio::test]
    async fn initialize_config_at_season_one() {
        let mut context = ProgramTest::new("silo_program", silo_program_client::ID, None)
            .start_with_context()
            .await;

        // Given an empty config account.

        let config = Keypair::new();
        let authority = Keypair::new().pubkey();

        let create_ix = system_instruction::create_account(
            &context.payer.pubkey(),
            &config.pubkey(),
            context
                .banks_client
                .get_rent()
                .await
                .unwrap()
                .minimum_balance(Config::LEN),
            Config::LEN as u64,
            &silo_program_client::ID,
        );

        // When we initialize the config with a 25 seasons withdraw delay.

        let tx = Transaction::new_signed_with_payer(
            &[
                create_ix,
                initialize_config(&config.pubkey(), &authority, 25),
            ],
            Some(&context.payer.pubkey()),
            &[&context.payer, &config],
            context.last_blockhash,
        );
        context.banks_client.process_transaction(tx).await.unwrap();

        // Then the config starts at season 1 with empty totals.

        let account = get_account!(context, config.pubkey());
        assert_eq!(account.data.len(), Config::LEN);

        let config_account = get_state::<Config>(&mut context, &config.pubkey()).await;
        assert_eq!(Option::<Pubkey>::from(config_account.authority), Some(authority));
        assert_eq!(config_account.current_season(), 1);
        assert_eq!(u32::from(config_account.withdraw_seasons), 25);
        assert_eq!(u128::from(config_account.total_stalk), 0);
        assert_eq!(u128::from(config_account.total_seeds), 0);
    }

    #[tokio::test]
    async fn fail_initialize_config_twice() {
        let mut context = ProgramTest::new("silo_program", silo_program_client::ID, None)
            .start_with_context()
            .await;

        // Given an initialized config account.

        let config = Keypair::new();
        let authority = Keypair::new().pubkey();

        let create_ix = system_instruction::create_account(
            &context.payer.pubkey(),
            &config.pubkey(),
            context
                .banks_client
                .get_rent()
                .await
                .unwrap()
                .minimum_balance(Config::LEN),
            Config::LEN as u64,
            &silo_program_client::ID,
        );

        let tx = Transaction::new_signed_with_payer(
            &[
                create_ix,
                initialize_config(&config.pubkey(), &authority, 25),
            ],
            Some(&context.payer.pubkey()),
            &[&context.payer, &config],
            context.last_blockhash,
        );
        context.banks_client.process_transaction(tx).await.unwrap();

        // When we try to initialize it again.

        context.get_new_latest_blockhash().await.unwrap();

        let tx = Transaction::new_signed_with_payer(
            &[initialize_config(&config.pubkey(), &authority, 10)],
            Some(&context.payer.pubkey()),
            &[&context.payer],
            context.last_blockhash,
        );
        let err = context
            .banks_client
            .process_transaction(tx)
            .await
            .unwrap_err();

        // Then we expect an error.

        assert_instruction_error!(err, InstructionError::AccountAlreadyInitialized);
    }

    #[tokio::test]
    async fn fail_initialize_config_with_wrong_account_length() {
        let mut context = ProgramTest::new("silo_program", silo_program_client::ID, None)
            .start_with_context()
            .await;

        // Given a config account with the wrong length.

        let config = Keypair::new();

        let create_ix = system_instruction::create_account(
            &context.payer.pubkey(),
            &config.pubkey(),
            context
                .banks_client
                .get_rent()
                .await
                .unwrap()
                .minimum_balance(Config::LEN + 8),
            (Config::LEN + 8) as u64,
            &silo_program_client::ID,
        );

        // When we try to initialize it.

        let tx = Transaction::new_signed_with_payer(
            &[
                create_ix,
                initialize_config(&config.pubkey(), &Pubkey::new_unique(), 25),
            ],
            Some(&context.payer.pubkey()),
            &[&context.payer, &config],
            context.last_blockhash,
        );
        let err = context
            .banks_client
            .process_transaction(tx)
            .await
            .unwrap_err();

        // Then we expect an error.

        assert_custom_error!(
            err,
            silo_program_client::error::SiloError::InvalidAccountDataLength
        );
    }
}
