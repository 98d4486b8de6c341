use bytemuck::Pod;
use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, msg, program::invoke_signed,
    program_error::ProgramError, program_pack::IsInitialized, pubkey::Pubkey, rent::Rent,
    system_instruction, system_program, sysvar::Sysvar,
};

use crate::{
    err,
    error::SiloError,
    instruction::{
        accounts::{
            AddUnderlyingAccounts, ClaimWithdrawalAccounts, ClaimWithdrawalsAccounts,
            DepositAccounts, DewhitelistTokenAccounts, InitializeConfigAccounts,
            SetAuthorityAccounts, SunriseAccounts, TransferDepositAccounts,
            TransferDepositsAccounts, UpdateConfigAccounts, UpdateUnripeDepositAccounts,
            UpdateUnripeDepositsAccounts, WhitelistTokenAccounts, WithdrawDepositAccounts,
            WithdrawDepositsAccounts,
        },
        SiloInstruction,
    },
    migration::migrate_crate,
    state::{
        find_deposit_pda, find_farmer_pda, find_silo_token_pda, find_withdrawal_pda,
        get_deposit_pda_signer_seeds, get_farmer_pda_signer_seeds,
        get_withdrawal_pda_signer_seeds, Config, Deposit, Farmer, SiloToken, TokenSettings,
        Withdrawal,
    },
};

mod add_underlying;
mod claim_withdrawal;
mod claim_withdrawals;
mod deposit;
mod dewhitelist_token;
mod initialize_config;
mod set_authority;
mod sunrise;
mod transfer_deposit;
mod transfer_deposits;
mod update_config;
mod update_unripe_deposit;
mod update_unripe_deposits;
mod whitelist_token;
mod withdraw_deposit;
mod withdraw_deposits;

#[inline(always)]
pub fn process_instruction<'a>(
    program_id: &Pubkey,
    accounts: &'a [AccountInfo<'a>],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = SiloInstruction::unpack(instruction_data)?;

    match instruction {
        SiloInstruction::InitializeConfig { withdraw_seasons } => {
            msg!("Instruction: InitializeConfig");
            initialize_config::process_initialize_config(
                program_id,
                InitializeConfigAccounts::context(accounts)?,
                withdraw_seasons,
            )
        }
        SiloInstruction::SetAuthority => {
            msg!("Instruction: SetAuthority");
            set_authority::process_set_authority(
                program_id,
                SetAuthorityAccounts::context(accounts)?,
            )
        }
        SiloInstruction::UpdateConfig(field) => {
            msg!("Instruction: UpdateConfig");
            update_config::process_update_config(
                program_id,
                UpdateConfigAccounts::context(accounts)?,
                field,
            )
        }
        SiloInstruction::Sunrise => {
            msg!("Instruction: Sunrise");
            sunrise::process_sunrise(program_id, SunriseAccounts::context(accounts)?)
        }
        SiloInstruction::WhitelistToken {
            policy,
            stalk_per_bdv,
            seeds_per_bdv,
            fixed_rate,
            legacy_bdv_rate,
        } => {
            msg!("Instruction: WhitelistToken");
            whitelist_token::process_whitelist_token(
                program_id,
                WhitelistTokenAccounts::context(accounts)?,
                TokenSettings {
                    policy,
                    stalk_per_bdv,
                    seeds_per_bdv,
                    fixed_rate,
                    legacy_bdv_rate,
                },
            )
        }
        SiloInstruction::DewhitelistToken => {
            msg!("Instruction: DewhitelistToken");
            dewhitelist_token::process_dewhitelist_token(
                program_id,
                DewhitelistTokenAccounts::context(accounts)?,
            )
        }
        SiloInstruction::AddUnderlying(amount) => {
            msg!("Instruction: AddUnderlying");
            add_underlying::process_add_underlying(
                program_id,
                AddUnderlyingAccounts::context(accounts)?,
                amount,
            )
        }
        SiloInstruction::Deposit(amount) => {
            msg!("Instruction: Deposit");
            deposit::process_deposit(program_id, DepositAccounts::context(accounts)?, amount)
        }
        SiloInstruction::WithdrawDeposit { season, amount } => {
            msg!("Instruction: WithdrawDeposit");
            withdraw_deposit::process_withdraw_deposit(
                program_id,
                WithdrawDepositAccounts::context(accounts)?,
                season,
                amount,
            )
        }
        SiloInstruction::WithdrawDeposits { seasons, amounts } => {
            msg!("Instruction: WithdrawDeposits");
            withdraw_deposits::process_withdraw_deposits(
                program_id,
                WithdrawDepositsAccounts::context(accounts)?,
                seasons,
                amounts,
            )
        }
        SiloInstruction::ClaimWithdrawal(release_season) => {
            msg!("Instruction: ClaimWithdrawal");
            claim_withdrawal::process_claim_withdrawal(
                program_id,
                ClaimWithdrawalAccounts::context(accounts)?,
                release_season,
            )
        }
        SiloInstruction::ClaimWithdrawals(release_seasons) => {
            msg!("Instruction: ClaimWithdrawals");
            claim_withdrawals::process_claim_withdrawals(
                program_id,
                ClaimWithdrawalsAccounts::context(accounts)?,
                release_seasons,
            )
        }
        SiloInstruction::TransferDeposit { season, amount } => {
            msg!("Instruction: TransferDeposit");
            transfer_deposit::process_transfer_deposit(
                program_id,
                TransferDepositAccounts::context(accounts)?,
                season,
                amount,
            )
        }
        SiloInstruction::TransferDeposits { seasons, amounts } => {
            msg!("Instruction: TransferDeposits");
            transfer_deposits::process_transfer_deposits(
                program_id,
                TransferDepositsAccounts::context(accounts)?,
                seasons,
                amounts,
            )
        }
        SiloInstruction::UpdateUnripeDeposit { season, amount } => {
            msg!("Instruction: UpdateUnripeDeposit");
            update_unripe_deposit::process_update_unripe_deposit(
                program_id,
                UpdateUnripeDepositAccounts::context(accounts)?,
                season,
                amount,
            )
        }
        SiloInstruction::UpdateUnripeDeposits { seasons, amounts } => {
            msg!("Instruction: UpdateUnripeDeposits");
            update_unripe_deposits::process_update_unripe_deposits(
                program_id,
                UpdateUnripeDepositsAccounts::context(accounts)?,
                seasons,
                amounts,
            )
        }
    }
}

#[macro_export]
macro_rules! require {
    ( $constraint:expr, $error:expr $(,)? ) => {
        if !$constraint {
            return Err($error.into());
        }
    };
    ( $constraint:expr, $error:expr, $message:expr $(,)? ) => {
        if !$constraint {
            solana_program::msg!("Constraint failed: {}", $message);
            return Err($error.into());
        }
    };
    ( $constraint:expr, $error:expr, $message:literal, $($args:tt)+ ) => {
        require!( $constraint, $error, format!($message, $($args)+) );
    };
}

#[inline]
pub fn unpack_initialized<T: Pod + IsInitialized>(data: &[u8]) -> Result<&T, ProgramError> {
    let account =
        bytemuck::try_from_bytes::<T>(data).map_err(|_error| ProgramError::InvalidAccountData)?;

    require!(account.is_initialized(), ProgramError::UninitializedAccount);

    Ok(account)
}

/// Unpacks an initialized account from the given data and
/// returns a mutable reference to it.
#[inline]
pub fn unpack_initialized_mut<T: Pod + IsInitialized>(
    data: &mut [u8],
) -> Result<&mut T, ProgramError> {
    let account = bytemuck::try_from_bytes_mut::<T>(data)
        .map_err(|_error| ProgramError::InvalidAccountData)?;

    require!(account.is_initialized(), ProgramError::UninitializedAccount);

    Ok(account)
}

/// Unpacks a `SiloToken` account and returns a mutable reference to it.
///
/// This function will validate that the token belongs to `config` and that
/// the account matches the expected PDA derivation.
#[inline]
pub fn unpack_silo_token_mut<'a>(
    data: &'a mut [u8],
    silo_token: &Pubkey,
    config: &Pubkey,
    program_id: &Pubkey,
) -> Result<&'a mut SiloToken, ProgramError> {
    let token = bytemuck::try_from_bytes_mut::<SiloToken>(data)
        .map_err(|_error| ProgramError::from(SiloError::UnknownToken))?;

    require!(token.is_initialized(), SiloError::UnknownToken, "silo_token");
    require!(
        &token.config == config,
        SiloError::UnknownToken,
        "silo_token (config {})",
        token.config
    );

    let (derivation, _) = find_silo_token_pda(config, &token.mint, program_id);
    require!(
        silo_token == &derivation,
        ProgramError::InvalidSeeds,
        "silo_token"
    );

    Ok(token)
}

/// Unpacks a `Farmer` account and returns a mutable reference to it.
///
/// This function will validate that the account is initialized and the
/// derivation matches the expected PDA for `owner`.
#[inline]
pub fn unpack_farmer_mut<'a>(
    data: &'a mut [u8],
    farmer: &Pubkey,
    owner: &Pubkey,
    config: &Pubkey,
    program_id: &Pubkey,
) -> Result<&'a mut Farmer, ProgramError> {
    let (derivation, _) = find_farmer_pda(config, owner, program_id);
    require!(farmer == &derivation, ProgramError::InvalidSeeds, "farmer");

    unpack_initialized_mut::<Farmer>(data)
}

/// Checks that `authority` signed and is the config authority.
pub(crate) fn check_config_authority(config: &Config, authority: &AccountInfo) -> ProgramResult {
    require!(
        authority.is_signer,
        ProgramError::MissingRequiredSignature,
        "config_authority"
    );

    let current_authority: Option<Pubkey> = config.authority.into();
    require!(
        current_authority == Some(*authority.key),
        SiloError::InvalidAuthority,
        "config_authority"
    );

    Ok(())
}

/// Allocates `space` bytes for a PDA and assigns it to this program.
///
/// NOTE: The account needs to be pre-funded with the minimum rent balance by
/// the caller.
pub(crate) fn create_pda_account(
    program_id: &Pubkey,
    account: &AccountInfo,
    space: usize,
    signer_seeds: &[&[u8]],
    name: &str,
) -> ProgramResult {
    require!(
        account.lamports() >= Rent::get()?.minimum_balance(space),
        ProgramError::AccountNotRentExempt,
        name,
    );

    invoke_signed(
        &system_instruction::allocate(account.key, space as u64),
        &[account.clone()],
        &[signer_seeds],
    )?;
    invoke_signed(
        &system_instruction::assign(account.key, program_id),
        &[account.clone()],
        &[signer_seeds],
    )
}

/// Closes a program account, moving its lamports to `destination`.
pub(crate) fn close_program_account(
    account: &AccountInfo,
    destination: &AccountInfo,
) -> ProgramResult {
    let destination_lamports = destination
        .lamports()
        .checked_add(account.lamports())
        .ok_or(ProgramError::ArithmeticOverflow)?;

    **destination.try_borrow_mut_lamports()? = destination_lamports;
    **account.try_borrow_mut_lamports()? = 0;

    account.try_borrow_mut_data()?.fill(0);
    account.realloc(0, false)?;
    account.assign(&system_program::ID);

    Ok(())
}

/// Creates the farmer account of `owner` when it does not exist yet.
///
/// Grown stalk of a new farmer starts accruing at `season`.
pub(crate) fn init_farmer_if_empty(
    program_id: &Pubkey,
    config: &Pubkey,
    owner: &Pubkey,
    farmer_info: &AccountInfo,
    season: u32,
) -> ProgramResult {
    let (derivation, bump) = find_farmer_pda(config, owner, program_id);
    require!(
        farmer_info.key == &derivation,
        ProgramError::InvalidSeeds,
        "farmer"
    );

    if !farmer_info.data_is_empty() {
        require!(
            farmer_info.owner == program_id,
            ProgramError::InvalidAccountOwner,
            "farmer"
        );
        return Ok(());
    }

    let bump_seed = [bump];
    let signer_seeds = get_farmer_pda_signer_seeds(config, owner, &bump_seed);
    create_pda_account(program_id, farmer_info, Farmer::LEN, &signer_seeds, "farmer")?;

    let mut data = farmer_info.try_borrow_mut_data()?;
    *bytemuck::from_bytes_mut::<Farmer>(&mut data) = Farmer::new(*config, *owner, season);

    Ok(())
}

/// Validates a crate account and upgrades it to the current format.
///
/// A crate that does not exist (or was closed after being emptied) is
/// reported as `CrateNotFound`.
pub(crate) fn load_crate(
    program_id: &Pubkey,
    silo_token: &Pubkey,
    owner: &Pubkey,
    season: u32,
    deposit_info: &AccountInfo,
    token: &SiloToken,
) -> ProgramResult {
    let (derivation, _) = find_deposit_pda(silo_token, owner, season, program_id);
    require!(
        deposit_info.key == &derivation,
        ProgramError::InvalidSeeds,
        "deposit (season {})",
        season
    );

    if deposit_info.data_is_empty() {
        return err!(
            SiloError::CrateNotFound,
            "no crate for {} at season {}",
            owner,
            season
        );
    }

    require!(
        deposit_info.owner == program_id,
        ProgramError::InvalidAccountOwner,
        "deposit"
    );

    let mut data = deposit_info.try_borrow_mut_data()?;
    migrate_crate(&mut data, token)?;

    Ok(())
}

/// Same as [`load_crate`], except that a missing crate is created empty.
pub(crate) fn init_crate_if_empty(
    program_id: &Pubkey,
    silo_token: &Pubkey,
    owner: &Pubkey,
    season: u32,
    deposit_info: &AccountInfo,
    token: &SiloToken,
) -> ProgramResult {
    if !deposit_info.data_is_empty() {
        return load_crate(program_id, silo_token, owner, season, deposit_info, token);
    }

    let (derivation, bump) = find_deposit_pda(silo_token, owner, season, program_id);
    require!(
        deposit_info.key == &derivation,
        ProgramError::InvalidSeeds,
        "deposit (season {})",
        season
    );

    let bump_seed = [bump];
    let season_seed = season.to_le_bytes();
    let signer_seeds = get_deposit_pda_signer_seeds(silo_token, owner, &season_seed, &bump_seed);
    create_pda_account(program_id, deposit_info, Deposit::LEN, &signer_seeds, "deposit")?;

    let mut data = deposit_info.try_borrow_mut_data()?;
    *bytemuck::from_bytes_mut::<Deposit>(&mut data) = Deposit::new(*owner, *silo_token, season);

    Ok(())
}

/// Creates the withdrawal account released at `release_season` when it does
/// not exist yet.
pub(crate) fn init_withdrawal_if_empty(
    program_id: &Pubkey,
    silo_token: &Pubkey,
    owner: &Pubkey,
    release_season: u32,
    withdrawal_info: &AccountInfo,
) -> ProgramResult {
    let (derivation, bump) = find_withdrawal_pda(silo_token, owner, release_season, program_id);
    require!(
        withdrawal_info.key == &derivation,
        ProgramError::InvalidSeeds,
        "withdrawal (season {})",
        release_season
    );

    if !withdrawal_info.data_is_empty() {
        require!(
            withdrawal_info.owner == program_id,
            ProgramError::InvalidAccountOwner,
            "withdrawal"
        );
        return Ok(());
    }

    let bump_seed = [bump];
    let season_seed = release_season.to_le_bytes();
    let signer_seeds =
        get_withdrawal_pda_signer_seeds(silo_token, owner, &season_seed, &bump_seed);
    create_pda_account(
        program_id,
        withdrawal_info,
        Withdrawal::LEN,
        &signer_seeds,
        "withdrawal",
    )?;

    let mut data = withdrawal_info.try_borrow_mut_data()?;
    *bytemuck::from_bytes_mut::<Withdrawal>(&mut data) =
        Withdrawal::new(*owner, *silo_token, release_season);

    Ok(())
}

/// Claims the withdrawal stored in `withdrawal_info` and returns the amount.
///
/// A withdrawal account that does not exist is claimed as an empty
/// withdrawal, so the caller gets `NotYetClaimable` or `NothingToClaim`.
pub(crate) fn claim_from_account(
    program_id: &Pubkey,
    config: &Config,
    token: &mut SiloToken,
    silo_token: &Pubkey,
    owner: &Pubkey,
    release_season: u32,
    withdrawal_info: &AccountInfo,
) -> Result<u64, ProgramError> {
    let (derivation, _) = find_withdrawal_pda(silo_token, owner, release_season, program_id);
    require!(
        withdrawal_info.key == &derivation,
        ProgramError::InvalidSeeds,
        "withdrawal (season {})",
        release_season
    );

    if withdrawal_info.data_is_empty() {
        let mut missing = Withdrawal::new(*owner, *silo_token, release_season);
        return crate::ledger::claim_withdrawal(config, token, &mut missing);
    }

    require!(
        withdrawal_info.owner == program_id,
        ProgramError::InvalidAccountOwner,
        "withdrawal"
    );

    let mut data = withdrawal_info.try_borrow_mut_data()?;
    let withdrawal = unpack_initialized_mut::<Withdrawal>(&mut data)?;

    crate::ledger::claim_withdrawal(config, token, withdrawal)
}

/// Closes every crate in `deposits` that has been emptied.
pub(crate) fn close_empty_crates(
    program_id: &Pubkey,
    deposits: &[AccountInfo],
    destination: &AccountInfo,
) -> ProgramResult {
    for deposit_info in deposits {
        if deposit_info.data_is_empty() || deposit_info.owner != program_id {
            continue;
        }

        let is_empty = {
            let data = deposit_info.try_borrow_data()?;
            unpack_initialized::<Deposit>(&data)?.is_empty()
        };

        if is_empty {
            close_program_account(deposit_info, destination)?;
        }
    }

    Ok(())
}

/// Checks that two batch vectors have the same length.
pub(crate) fn check_batch_lengths(seasons: &[u32], amounts: &[u64]) -> ProgramResult {
    if seasons.len() != amounts.len() {
        return err!(
            SiloError::LengthMismatch,
            "{} seasons, {} amounts",
            seasons.len(),
            amounts.len()
        );
    }

    Ok(())
}
