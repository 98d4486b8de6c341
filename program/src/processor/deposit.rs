use solana_program::{entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};
use spl_token_2022::{extension::PodStateWithExtensions, pod::PodMint};

use crate::{
    bdv::{compute_bdv, load_bdv_source},
    error::SiloError,
    events::{emit_balance_changes, SiloEvent},
    instruction::accounts::{Context, DepositAccounts},
    ledger::add_deposit,
    processor::{
        init_crate_if_empty, init_farmer_if_empty, unpack_farmer_mut, unpack_initialized_mut,
        unpack_silo_token_mut,
    },
    require,
    state::{Config, Deposit},
};

/// Deposits tokens into the crate of the current season.
///
/// NOTE: The farmer and crate accounts are created on the first deposit, so
/// they need to be pre-funded with the minimum rent balance by the caller.
///
/// 0. `[w]` Config
/// 1. `[w]` Silo token
/// 2. `[w]` Farmer
/// 3. `[w]` Crate
/// 4. `[s]` Owner (source token account authority)
/// 5. `[w]` Source token account
/// 6. `[ ]` Mint
/// 7. `[w]` Vault
/// 8. `[ ]` BDV source
/// 9. `[ ]` Token program
/// 10. `[ ]` System program
/// 11. Extra accounts required for the transfer hook
///
/// Instruction data: amount of tokens to deposit, as a little-endian `u64`.
pub fn process_deposit<'a>(
    program_id: &Pubkey,
    ctx: Context<'a, DepositAccounts<'a>>,
    amount: u64,
) -> ProgramResult {
    // Account validation.

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
    // - must be whitelisted
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
        token.is_whitelisted(),
        SiloError::TokenNotWhitelisted,
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

    // mint
    // - must match the silo token mint
    require!(
        ctx.accounts.mint.key == &token.mint,
        SiloError::InvalidMint,
        "mint"
    );
    let mint_data = ctx.accounts.mint.try_borrow_data()?;
    let mint = PodStateWithExtensions::<PodMint>::unpack(&mint_data)?;
    let decimals = mint.base.decimals;

    // vault
    // - must be the token account on the silo token account
    require!(
        ctx.accounts.vault.key == &token.vault,
        SiloError::IncorrectVaultAccount,
    );

    require!(amount > 0, SiloError::ZeroAmount, "amount");

    // Price the deposit before touching the ledger.
    let source = load_bdv_source(token, ctx.accounts.bdv_source, decimals)?;
    let bdv = compute_bdv(&source, amount)?;
    drop(mint_data);

    let season = config.current_season();
    let owner = *ctx.accounts.owner.key;

    // farmer
    // - have the correct PDA derivation
    // - created when empty
    init_farmer_if_empty(
        program_id,
        ctx.accounts.config.key,
        &owner,
        ctx.accounts.farmer,
        season,
    )?;
    let mut farmer_data = ctx.accounts.farmer.try_borrow_mut_data()?;
    let farmer = unpack_farmer_mut(
        &mut farmer_data,
        ctx.accounts.farmer.key,
        &owner,
        ctx.accounts.config.key,
        program_id,
    )?;

    // deposit
    // - have the correct PDA derivation for the current season
    // - created when empty, migrated when legacy
    init_crate_if_empty(
        program_id,
        ctx.accounts.silo_token.key,
        &owner,
        season,
        ctx.accounts.deposit,
        token,
    )?;
    let mut deposit_data = ctx.accounts.deposit.try_borrow_mut_data()?;
    let deposit = unpack_initialized_mut::<Deposit>(&mut deposit_data)?;

    // Update the ledger.
    let balances = (farmer.stalk(), farmer.seeds());
    add_deposit(config, token, farmer, deposit, amount, bdv)?;

    SiloEvent::AddDeposit {
        account: owner,
        token: token.mint,
        season,
        amount,
        bdv,
    }
    .emit();
    emit_balance_changes(
        owner,
        (balances.0, farmer.stalk()),
        (balances.1, farmer.seeds()),
    );

    // Transfer the tokens to the vault.
    drop(deposit_data);
    drop(farmer_data);
    drop(token_data);
    drop(config_data);

    spl_token_2022::onchain::invoke_transfer_checked(
        &spl_token_2022::ID,
        ctx.accounts.source_token_account.clone(),
        ctx.accounts.mint.clone(),
        ctx.accounts.vault.clone(),
        ctx.accounts.owner.clone(),
        ctx.remaining_accounts,
        amount,
        decimals,
        &[],
    )
}
