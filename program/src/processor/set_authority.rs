use solana_program::{entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};
use spl_pod::optional_keys::OptionalNonZeroPubkey;

use crate::{
    instruction::accounts::{Context, SetAuthorityAccounts},
    processor::{check_config_authority, unpack_initialized_mut},
    require,
    state::Config,
};

/// Sets a new authority on the config account.
///
/// ### Accounts:
///
///   0. `[w]` config
///   1. `[s]` authority
///   2. `[]` new_authority
pub fn process_set_authority(
    program_id: &Pubkey,
    ctx: Context<SetAuthorityAccounts>,
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

    // 2. authority
    // - must be a signer
    // - must match the authority on the config account

    check_config_authority(config, ctx.accounts.authority)?;

    config.authority = OptionalNonZeroPubkey(*ctx.accounts.new_authority.key);

    Ok(())
}
