use solana_program::{entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    error::SiloError,
    events::{emit_balance_changes, SiloEvent},
    instruction::accounts::{Context, TransferDepositAccounts},
    ledger::transfer_deposit,
    processor::{
        close_empty_crates, init_crate_if_empty, init_farmer_if_empty, load_crate,
        unpack_farmer_mut, unpack_initialized_mut, unpack_silo_token_mut,
    },
    require,
    state::{Config, Deposit},
};

/// Transfers part of a crate to another account.
///
/// The recipient receives a crate with the same season, so the grown stalk
/// carried by the transferred BDV moves with it.
///
/// NOTE: The recipient farmer and crate accounts are created when empty, so
/// they need to be pre-funded with the minimum rent balance by the caller.
///
/// 0. `[w]` Config
/// 1. `[w]` Silo token
/// 2. `[w]` Sender farmer
/// 3. `[w]` Recipient farmer
/// 4. `[w]` Sender crate
/// 5. `[w]` Recipient crate
/// 6. `[ws]` Owner (sender)
/// 7. `[ ]` Recipient
/// 8. `[ ]` System program
pub fn process_transfer_deposit(
    program_id: &Pubkey,
    ctx: Context<TransferDepositAccounts>,
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
    let sender = *ctx.accounts.owner.key;

    // recipient
    // - must not be the sender
    let recipient = *ctx.accounts.recipient.key;
    require!(
        recipient != sender,
        SiloError::InvalidDestinationAccount,
        "recipient"
    );

    // sender crate
    // - have the correct PDA derivation
    // - must exist
    load_crate(
        program_id,
        ctx.accounts.silo_token.key,
        &sender,
        season,
        ctx.accounts.sender_deposit,
        token,
    )?;

    // recipient farmer and crate
    // - have the correct PDA derivation
    // - created when empty
    init_farmer_if_empty(
        program_id,
        ctx.accounts.config.key,
        &recipient,
        ctx.accounts.recipient_farmer,
        config.current_season(),
    )?;
    init_crate_if_empty(
        program_id,
        ctx.accounts.silo_token.key,
        &recipient,
        season,
        ctx.accounts.recipient_deposit,
        token,
    )?;

    // sender farmer
    // - owner must be this program
    // - have the correct PDA derivation
    require!(
        ctx.accounts.sender_farmer.owner == program_id,
        ProgramError::InvalidAccountOwner,
        "sender_farmer"
    );
    let mut sender_farmer_data = ctx.accounts.sender_farmer.try_borrow_mut_data()?;
    let sender_farmer = unpack_farmer_mut(
        &mut sender_farmer_data,
        ctx.accounts.sender_farmer.key,
        &sender,
        ctx.accounts.config.key,
        program_id,
    )?;
    let mut recipient_farmer_data = ctx.accounts.recipient_farmer.try_borrow_mut_data()?;
    let recipient_farmer = unpack_farmer_mut(
        &mut recipient_farmer_data,
        ctx.accounts.recipient_farmer.key,
        &recipient,
        ctx.accounts.config.key,
        program_id,
    )?;

    let mut sender_deposit_data = ctx.accounts.sender_deposit.try_borrow_mut_data()?;
    let sender_deposit = unpack_initialized_mut::<Deposit>(&mut sender_deposit_data)?;
    let mut recipient_deposit_data = ctx.accounts.recipient_deposit.try_borrow_mut_data()?;
    let recipient_deposit = unpack_initialized_mut::<Deposit>(&mut recipient_deposit_data)?;

    // Update the ledger.
    let sender_balances = (sender_farmer.stalk(), sender_farmer.seeds());
    let recipient_balances = (recipient_farmer.stalk(), recipient_farmer.seeds());

    let removal = transfer_deposit(
        config,
        token,
        sender_farmer,
        sender_deposit,
        recipient_farmer,
        recipient_deposit,
        amount,
    )?;

    SiloEvent::RemoveDeposit {
        account: sender,
        token: token.mint,
        season,
        amount: removal.amount,
        bdv: removal.bdv,
    }
    .emit();
    SiloEvent::AddDeposit {
        account: recipient,
        token: token.mint,
        season,
        amount: removal.amount,
        bdv: removal.bdv,
    }
    .emit();
    emit_balance_changes(
        sender,
        (sender_balances.0, sender_farmer.stalk()),
        (sender_balances.1, sender_farmer.seeds()),
    );
    emit_balance_changes(
        recipient,
        (recipient_balances.0, recipient_farmer.stalk()),
        (recipient_balances.1, recipient_farmer.seeds()),
    );

    drop(recipient_deposit_data);
    drop(sender_deposit_data);

    close_empty_crates(
        program_id,
        std::slice::from_ref(ctx.accounts.sender_deposit),
        ctx.accounts.owner,
    )
}
