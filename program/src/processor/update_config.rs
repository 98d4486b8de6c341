use solana_program::{
    entrypoint::ProgramResult, msg, program_error::ProgramError, pubkey::Pubkey,
};

use crate::{
    instruction::{
        accounts::{Context, UpdateConfigAccounts},
        ConfigField,
    },
    processor::{check_config_authority, unpack_initialized_mut},
    require,
    state::Config,
};

/// Updates configuration parameters.
///
/// ### Accounts:
///
///   0. `[w]` config
///   1. `[s]` config_authority
pub fn process_update_config(
    program_id: &Pubkey,
    ctx: Context<UpdateConfigAccounts>,
    field: ConfigField,
) -> ProgramResult {
    // Accounts validation.

    // 1. config
    // - owner must be this program
    // - must be initialized

    require!(
        ctx.accounts.config.owner == program_id,
        ProgramError::InvalidAccountOwner,
        "config"
    );

    let mut data = ctx.accounts.config.try_borrow_mut_data()?;
    let config = unpack_initialized_mut::<Config>(&mut data)?;

    // 2. config_authority
    // - must be a signer
    // - must match the authority on the config account

    check_config_authority(config, ctx.accounts.config_authority)?;

    match field {
        ConfigField::WithdrawSeasons(withdraw_seasons) => {
            msg!("Setting withdraw_seasons to {}", withdraw_seasons);
            config.withdraw_seasons = withdraw_seasons.into();
        }
    }

    Ok(())
}
