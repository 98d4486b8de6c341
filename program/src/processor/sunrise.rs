use solana_program::{
    entrypoint::ProgramResult, msg, program_error::ProgramError, pubkey::Pubkey,
};

use crate::{
    instruction::accounts::{Context, SunriseAccounts},
    processor::{check_config_authority, unpack_initialized_mut},
    require,
    state::Config,
};

/// Advances the current season by one.
///
/// Grown stalk is credited lazily, the next time each farmer is touched.
///
/// ### Accounts:
///
///   0. `[w]` config
///   1. `[s]` config_authority
pub fn process_sunrise(program_id: &Pubkey, ctx: Context<SunriseAccounts>) -> ProgramResult {
    require!(
        ctx.accounts.config.owner == program_id,
        ProgramError::InvalidAccountOwner,
        "config"
    );

    let mut data = ctx.accounts.config.try_borrow_mut_data()?;
    let config = unpack_initialized_mut::<Config>(&mut data)?;

    check_config_authority(config, ctx.accounts.config_authority)?;

    let season = config.advance_season()?;
    msg!("Season {}", season);

    Ok(())
}
