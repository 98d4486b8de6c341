use solana_program::{entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    instruction::accounts::{Context, DewhitelistTokenAccounts},
    processor::{check_config_authority, unpack_initialized, unpack_silo_token_mut},
    require,
    state::Config,
};

/// Stops accepting new deposits of a token.
///
/// ### Accounts:
///
///   0. `[]` config
///   1. `[w]` silo_token
///   2. `[s]` config_authority
pub fn process_dewhitelist_token(
    program_id: &Pubkey,
    ctx: Context<DewhitelistTokenAccounts>,
) -> ProgramResult {
    // config
    // - owner must be this program
    // - must be initialized
    require!(
        ctx.accounts.config.owner == program_id,
        ProgramError::InvalidAccountOwner,
        "config"
    );
    let config_data = ctx.accounts.config.try_borrow_data()?;
    let config = unpack_initialized::<Config>(&config_data)?;

    check_config_authority(config, ctx.accounts.config_authority)?;

    // silo_token
    // - owner must be this program
    // - must belong to the config
    require!(
        ctx.accounts.silo_token.owner == program_id,
        ProgramError::InvalidAccountOwner,
        "silo_token"
    );
    let mut token_data = ctx.accounts.silo_token.try_borrow_mut_data()?;
    let token = unpack_silo_token_mut(
        &mut token_data,
        ctx.accounts.silo_token.key,
        ctx.accounts.config.key,
        program_id,
    )?;

    token.whitelisted = false.into();

    Ok(())
}
