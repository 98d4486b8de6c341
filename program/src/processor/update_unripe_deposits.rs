use solana_program::{entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    bdv::{load_bdv_source, BdvPolicy},
    error::SiloError,
    events::{emit_balance_changes, SiloEvent},
    instruction::accounts::{Context, UpdateUnripeDepositsAccounts},
    ledger::reprice_deposit,
    processor::{
        check_batch_lengths, load_crate, unpack_farmer_mut, unpack_initialized_mut,
        unpack_silo_token_mut,
    },
    require,
    state::{Config, Deposit},
};

/// Re-prices several unripe crates at the current underlying ratio.
///
/// 0. `[w]` Config
/// 1. `[w]` Silo token
/// 2. `[w]` Farmer
/// 3. `[s]` Owner
/// 4. `[ ]` BDV source (the unripe mint)
/// 5.. `[w]` Crates, one per season
pub fn process_update_unripe_deposits(
    program_id: &Pubkey,
    ctx: Context<UpdateUnripeDepositsAccounts>,
    seasons: Vec<u32>,
    amounts: Vec<u64>,
) -> ProgramResult {
    check_batch_lengths(&seasons, &amounts)?;
    require!(!seasons.is_empty(), SiloError::ZeroAmount, "no crates");
    require!(
        ctx.remaining_accounts.len() >= seasons.len(),
        ProgramError::NotEnoughAccountKeys,
        "crates"
    );

    // config
    // - owner must be this program
    // - must be initialized
    require!(
        ctx.accounts.config.owner == program_id,
        ProgramError::InvalidAccountOwner,
        "config"
    );
    let mut config_data = ctx.accounts.config.try_borrow_mut_data()?;
    let config = unpack_initialized_mut::<Config>(&mut config_data)?;

    // silo token
    // - owner must be this program
    // - must belong to the config
    // - must be an unripe token
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

    // owner
    // - must be a signer
    require!(
        ctx.accounts.owner.is_signer,
        ProgramError::MissingRequiredSignature,
        "owner"
    );
    let owner = *ctx.accounts.owner.key;

    let source = load_bdv_source(token, ctx.accounts.bdv_source, 0)?;

    // farmer
    // - owner must be this program
    // - have the correct PDA derivation
    require!(
        ctx.accounts.farmer.owner == program_id,
        ProgramError::InvalidAccountOwner,
        "farmer"
    );
    let mut farmer_data = ctx.accounts.farmer.try_borrow_mut_data()?;
    let farmer = unpack_farmer_mut(
        &mut farmer_data,
        ctx.accounts.farmer.key,
        &owner,
        ctx.accounts.config.key,
        program_id,
    )?;

    let deposits = &ctx.remaining_accounts[..seasons.len()];
    let balances = (farmer.stalk(), farmer.seeds());

    for ((deposit_info, season), amount) in deposits.iter().zip(&seasons).zip(&amounts) {
        require!(*amount > 0, SiloError::ZeroAmount, "amount (season {})", season);

        load_crate(
            program_id,
            ctx.accounts.silo_token.key,
            &owner,
            *season,
            deposit_info,
            token,
        )?;

        let mut deposit_data = deposit_info.try_borrow_mut_data()?;
        let deposit = unpack_initialized_mut::<Deposit>(&mut deposit_data)?;

        let (removal, bdv) = reprice_deposit(config, token, farmer, deposit, &source, *amount)?;

        SiloEvent::RemoveDeposit {
            account: owner,
            token: token.mint,
            season: *season,
            amount: removal.amount,
            bdv: removal.bdv,
        }
        .emit();
        SiloEvent::AddDeposit {
            account: owner,
            token: token.mint,
            season: *season,
            amount: *amount,
            bdv,
        }
        .emit();
    }

    emit_balance_changes(
        owner,
        (balances.0, farmer.stalk()),
        (balances.1, farmer.seeds()),
    );

    Ok(())
}
