#![allow(dead_code)]

pub mod config;
pub mod farmer;
pub mod token;

pub use config::*;
pub use farmer::*;
pub use token::*;

use bytemuck::Pod;
use solana_program_test::ProgramTestContext;
use solana_sdk::{account::AccountSharedData, pubkey::Pubkey};

#[macro_export]
macro_rules! assert_instruction_error {
    ( $error:expr, $matcher:pat ) => {
        match $error {
            solana_program_test::BanksClientError::TransactionError(
                solana_sdk::transaction::TransactionError::InstructionError(_, $matcher),
            ) => {
                assert!(true)
            }
            err => assert!(false, "Expected instruction error but got '{:#?}'", err),
        };
    };
}

#[macro_export]
macro_rules! assert_custom_error {
    ( $error:expr, $matcher:pat ) => {
        match $error {
            solana_program_test::BanksClientError::TransactionError(
                solana_sdk::transaction::TransactionError::InstructionError(
                    _,
                    solana_sdk::instruction::InstructionError::Custom(x),
                ),
            ) => match num_traits::FromPrimitive::from_i32(x as i32) {
                Some($matcher) => assert!(true),
                Some(other) => {
                    assert!(
                        false,
                        "Expected another custom instruction error than '{:#?}'",
                        other
                    )
                }
                None => assert!(false, "Expected custom instruction error"),
            },
            err => assert!(
                false,
                "Expected custom instruction error but got '{:#?}'",
                err
            ),
        };
    };
}

#[macro_export]
macro_rules! get_account {
    ( $context:expr, $pubkey:expr ) => {{
        let account = $context
            .banks_client
            .get_account($pubkey)
            .await
            .expect(&format!("account not found: {}", $pubkey));

        assert!(account.is_some());

        account.unwrap()
    }};
}

/// Reads a program account as `T`.
pub async fn get_state<T: Pod>(context: &mut ProgramTestContext, address: &Pubkey) -> T {
    let account = get_account!(context, *address);
    bytemuck::pod_read_unaligned::<T>(&account.data[..std::mem::size_of::<T>()])
}

/// Returns `true` when `address` holds no data (never created or closed).
pub async fn is_closed(context: &mut ProgramTestContext, address: &Pubkey) -> bool {
    context
        .banks_client
        .get_account(*address)
        .await
        .unwrap()
        .map_or(true, |account| account.data.is_empty())
}

/// Overwrites the state of a program account with `state`.
pub async fn set_state<T: Pod>(context: &mut ProgramTestContext, address: &Pubkey, state: &T) {
    let mut account = get_account!(context, *address);
    account.data = bytemuck::bytes_of(state).to_vec();

    context.set_account(address, &AccountSharedData::from(account));
}
