use solana_program::{
    entrypoint::ProgramResult, msg, program_error::ProgramError, pubkey::Pubkey,
};

use crate::{
    bdv::BdvPolicy,
    error::SiloError,
    instruction::accounts::{AddUnderlyingAccounts, Context},
    processor::{check_config_authority, unpack_initialized, unpack_silo_token_mut},
    require,
    state::Config,
};

/// Records ripe underlying added to back an unripe token.
///
/// Raising the underlying raises the BDV of new deposits and of crates
/// re-priced with `UpdateUnripeDeposit`.
///
/// ### Accounts:
///
///   0. `[]` config
///   1. `[w]` silo_token
///   2. `[s]` config_authority
///
/// Instruction data: amount of underlying, as a little-endian `u64`.
pub fn process_add_underlying(
    program_id: &Pubkey,
    ctx: Context<AddUnderlyingAccounts>,
    amount: u64,
) -> ProgramResult {
    require!(
        ctx.accounts.config.owner == program_id,
        ProgramError::InvalidAccountOwner,
        "config"
    );
    let config_data = ctx.accounts.config.try_borrow_data()?;
    let config = unpack_initialized::<Config>(&config_data)?;

    check_config_authority(config, ctx.accounts.config_authority)?;

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

    require!(
        token.policy()? == BdvPolicy::UnripeProrata,
        SiloError::NotUnripeToken,
        "token {}",
        token.mint
    );
    require!(amount > 0, SiloError::ZeroAmount, "amount");

    let underlying = u64::from(token.underlying_amount)
        .checked_add(amount)
        .ok_or(ProgramError::ArithmeticOverflow)?;
    token.underlying_amount = underlying.into();

    msg!("Underlying of {} is now {}", token.mint, underlying);

    Ok(())
}
