use solana_program::{entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};
use spl_pod::optional_keys::OptionalNonZeroPubkey;

use crate::{
    error::SiloError,
    instruction::accounts::{Context, InitializeConfigAccounts},
    require,
    state::{find_vault_pda, Config},
};

/// Creates the Silo config account.
///
/// ### Accounts:
///
///   0. `[w]` config
///   1. `[]` config_authority
pub fn process_initialize_config(
    program_id: &Pubkey,
    ctx: Context<InitializeConfigAccounts>,
    withdraw_seasons: u32,
) -> ProgramResult {
    // Accounts validation.

    // 1. config
    // - owner must be this program
    // - have the correct length
    // - be uninitialized

    require!(
        ctx.accounts.config.owner == program_id,
        ProgramError::InvalidAccountOwner,
        "config"
    );

    let mut data = ctx.accounts.config.try_borrow_mut_data()?;

    require!(
        data.len() == Config::LEN,
        SiloError::InvalidAccountDataLength,
        "config"
    );

    let config = bytemuck::from_bytes_mut::<Config>(&mut data);

    require!(
        !config.is_initialized(),
        ProgramError::AccountAlreadyInitialized,
        "config"
    );

    // Initialize the config account.

    let (_, bump) = find_vault_pda(ctx.accounts.config.key, program_id);

    *config = Config::new(
        OptionalNonZeroPubkey(*ctx.accounts.config_authority.key),
        withdraw_seasons,
        bump,
    );

    Ok(())
}
