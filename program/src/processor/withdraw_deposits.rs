use solana_program::{entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    error::SiloError,
    events::{emit_balance_changes, SiloEvent},
    instruction::accounts::{Context, WithdrawDepositsAccounts},
    ledger::withdraw_deposit,
    processor::{
        check_batch_lengths, close_empty_crates, init_withdrawal_if_empty, load_crate,
        unpack_farmer_mut, unpack_initialized_mut, unpack_silo_token_mut,
    },
    require,
    state::{Config, Deposit, Withdrawal},
};

/// Withdraws tokens from several crates into a single withdrawal.
///
/// Every entry is applied in order; the first failing entry fails the whole
/// instruction.
///
/// 0. `[w]` Config
/// 1. `[w]` Silo token
/// 2. `[w]` Farmer
/// 3. `[w]` Withdrawal
/// 4. `[ws]` Owner
/// 5. `[ ]` System program
/// 6.. `[w]` Crates, one per season
pub fn process_withdraw_deposits(
    program_id: &Pubkey,
    ctx: Context<WithdrawDepositsAccounts>,
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

    // owner
    // - must be a signer
    require!(
        ctx.accounts.owner.is_signer,
        ProgramError::MissingRequiredSignature,
        "owner"
    );
    let owner = *ctx.accounts.owner.key;

    // withdrawal
    // - have the correct PDA derivation for the release season
    // - created when empty
    let release_season = config.release_season()?;
    init_withdrawal_if_empty(
        program_id,
        ctx.accounts.silo_token.key,
        &owner,
        release_season,
        ctx.accounts.withdrawal,
    )?;

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

    let mut withdrawal_data = ctx.accounts.withdrawal.try_borrow_mut_data()?;
    let withdrawal = unpack_initialized_mut::<Withdrawal>(&mut withdrawal_data)?;

    let deposits = &ctx.remaining_accounts[..seasons.len()];
    let balances = (farmer.stalk(), farmer.seeds());
    let mut bdvs = Vec::with_capacity(seasons.len());
    let mut total: u64 = 0;

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

        let removal = withdraw_deposit(config, token, farmer, deposit, withdrawal, *amount)?;

        bdvs.push(removal.bdv);
        total = total
            .checked_add(removal.amount)
            .ok_or(ProgramError::ArithmeticOverflow)?;
    }

    SiloEvent::RemoveDeposits {
        account: owner,
        token: token.mint,
        seasons,
        amounts,
        bdvs,
        total,
    }
    .emit();
    SiloEvent::AddWithdrawal {
        account: owner,
        token: token.mint,
        season: release_season,
        amount: total,
    }
    .emit();
    emit_balance_changes(
        owner,
        (balances.0, farmer.stalk()),
        (balances.1, farmer.seeds()),
    );

    drop(withdrawal_data);

    close_empty_crates(program_id, deposits, ctx.accounts.owner)
}
