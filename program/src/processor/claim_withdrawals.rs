use solana_program::{entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};
use spl_token_2022::{
    extension::PodStateWithExtensions,
    pod::{PodAccount, PodMint},
};

use crate::{
    error::SiloError,
    events::SiloEvent,
    instruction::accounts::{ClaimWithdrawalsAccounts, Context},
    processor::{
        claim_from_account, close_program_account, unpack_initialized, unpack_silo_token_mut,
    },
    require,
    state::{create_vault_pda, get_vault_pda_signer_seeds, Config},
};

/// Claims several withdrawals with a single transfer.
///
/// 0. `[ ]` Config
/// 1. `[w]` Silo token
/// 2. `[ws]` Owner
/// 3. `[w]` Destination token account
/// 4. `[ ]` Mint
/// 5. `[w]` Vault
/// 6. `[ ]` Vault authority, PDA with seeds `['token-owner', config]`
/// 7. `[ ]` Token program
/// 8.. `[w]` Withdrawals, one per release season
/// 8 + n.. Extra accounts required for the transfer hook
pub fn process_claim_withdrawals<'a>(
    program_id: &Pubkey,
    ctx: Context<'a, ClaimWithdrawalsAccounts<'a>>,
    release_seasons: Vec<u32>,
) -> ProgramResult {
    require!(
        !release_seasons.is_empty(),
        SiloError::NothingToClaim,
        "no withdrawals"
    );
    require!(
        ctx.remaining_accounts.len() >= release_seasons.len(),
        ProgramError::NotEnoughAccountKeys,
        "withdrawals"
    );
    let (withdrawals, extra_accounts) = ctx.remaining_accounts.split_at(release_seasons.len());

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

    // vault
    // - must be the token account on the silo token account
    require!(
        ctx.accounts.vault.key == &token.vault,
        SiloError::IncorrectVaultAccount,
    );

    // vault authority
    // - derivation must match
    let signer_bump = [config.vault_authority_bump];
    let derivation = create_vault_pda(ctx.accounts.config.key, &signer_bump, program_id)?;
    require!(
        ctx.accounts.vault_authority.key == &derivation,
        SiloError::InvalidAuthority,
        "vault authority",
    );

    // mint
    // - must match the silo token mint
    require!(
        ctx.accounts.mint.key == &token.mint,
        SiloError::InvalidMint,
        "mint"
    );
    let mint_data = ctx.accounts.mint.try_borrow_data()?;
    let decimals = PodStateWithExtensions::<PodMint>::unpack(&mint_data)?
        .base
        .decimals;

    // destination
    // - must be a token account for the silo token mint
    let destination_data = ctx.accounts.destination_token_account.try_borrow_data()?;
    let destination = PodStateWithExtensions::<PodAccount>::unpack(&destination_data)
        .map_err(|_| SiloError::InvalidDestinationAccount)?;
    require!(
        destination.base.mint == token.mint,
        SiloError::InvalidDestinationAccount,
        "destination (mint {})",
        destination.base.mint
    );

    // Claim every withdrawal; a repeated season finds an empty withdrawal.
    let mut total: u64 = 0;

    for (withdrawal_info, release_season) in withdrawals.iter().zip(&release_seasons) {
        let amount = claim_from_account(
            program_id,
            config,
            token,
            ctx.accounts.silo_token.key,
            &owner,
            *release_season,
            withdrawal_info,
        )?;

        total = total
            .checked_add(amount)
            .ok_or(ProgramError::ArithmeticOverflow)?;
    }

    SiloEvent::RemoveWithdrawals {
        account: owner,
        token: token.mint,
        seasons: release_seasons,
        amount: total,
    }
    .emit();

    drop(destination_data);
    drop(mint_data);
    drop(token_data);

    // Transfer the tokens out of the vault.
    let signer_seeds = get_vault_pda_signer_seeds(ctx.accounts.config.key, &signer_bump);
    drop(config_data);

    spl_token_2022::onchain::invoke_transfer_checked(
        &spl_token_2022::ID,
        ctx.accounts.vault.clone(),
        ctx.accounts.mint.clone(),
        ctx.accounts.destination_token_account.clone(),
        ctx.accounts.vault_authority.clone(),
        extra_accounts,
        total,
        decimals,
        &[&signer_seeds],
    )?;

    for withdrawal_info in withdrawals {
        close_program_account(withdrawal_info, ctx.accounts.owner)?;
    }

    Ok(())
}
