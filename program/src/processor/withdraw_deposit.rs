use solana_program::{entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    error::SiloError,
    events::{emit_balance_changes, SiloEvent},
    instruction::accounts::{Context, WithdrawDepositAccounts},
    ledger::withdraw_deposit,
    processor::{
        close_empty_crates, init_withdrawal_if_empty, load_crate, unpack_farmer_mut,
        unpack_initialized_mut, unpack_silo_token_mut,
    },
    require,
    state::{Config, Deposit, Withdrawal},
};

/// Withdraws tokens from a crate into the withdrawal queue.
///
/// The removed BDV is proportional to the removed amount. The tokens stay in
/// the vault until the withdrawal is claimed; an emptied crate is closed and
/// its rent returned to the owner.
///
/// 0. `[w]` Config
/// 1. `[w]` Silo token
/// 2. `[w]` Farmer
/// 3. `[w]` Crate
/// 4. `[w]` Withdrawal, PDA with seeds
///    `['silo::state::withdrawal', silo_token, owner, release_season]`
/// 5. `[ws]` Owner
/// 6. `[ ]` System program
pub fn process_withdraw_deposit(
    program_id: &Pubkey,
    ctx: Context<WithdrawDepositAccounts>,
    season: u32,
    amount: u64,
) -> ProgramResult {
    require!(amount > 0, SiloError::ZeroAmount, "amount");

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

    // deposit
    // - have the correct PDA derivation
    // - must exist
    load_crate(
        program_id,
        ctx.accounts.silo_token.key,
        &owner,
        season,
        ctx.accounts.deposit,
        token,
    )?;

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

    let mut deposit_data = ctx.accounts.deposit.try_borrow_mut_data()?;
    let deposit = unpack_initialized_mut::<Deposit>(&mut deposit_data)?;
    let mut withdrawal_data = ctx.accounts.withdrawal.try_borrow_mut_data()?;
    let withdrawal = unpack_initialized_mut::<Withdrawal>(&mut withdrawal_data)?;

    // Update the ledger.
    let balances = (farmer.stalk(), farmer.seeds());
    let removal = withdraw_deposit(config, token, farmer, deposit, withdrawal, amount)?;

    SiloEvent::RemoveDeposit {
        account: owner,
        token: token.mint,
        season,
        amount: removal.amount,
        bdv: removal.bdv,
    }
    .emit();
    SiloEvent::AddWithdrawal {
        account: owner,
        token: token.mint,
        season: release_season,
        amount: removal.amount,
    }
    .emit();
    emit_balance_changes(
        owner,
        (balances.0, farmer.stalk()),
        (balances.1, farmer.seeds()),
    );

    drop(withdrawal_data);
    drop(deposit_data);

    close_empty_crates(
        program_id,
        std::slice::from_ref(ctx.accounts.deposit),
        ctx.accounts.owner,
    )
}
