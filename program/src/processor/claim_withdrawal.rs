use solana_program::{entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};
use spl_token_2022::{
    extension::PodStateWithExtensions,
    pod::{PodAccount, PodMint},
};

use crate::{
    error::SiloError,
    events::SiloEvent,
    instruction::accounts::{ClaimWithdrawalAccounts, Context},
    processor::{
        claim_from_account, close_program_account, unpack_initialized, unpack_silo_token_mut,
    },
    require,
    state::{create_vault_pda, get_vault_pda_signer_seeds, Config},
};

/// Claims a withdrawal whose release season has been reached.
///
/// The tokens are moved from the vault to the destination token account and
/// the emptied withdrawal account is closed.
///
/// 0. `[ ]` Config
/// 1. `[w]` Silo token
/// 2. `[w]` Withdrawal
/// 3. `[ws]` Owner
/// 4. `[w]` Destination token account
/// 5. `[ ]` Mint
/// 6. `[w]` Vault
/// 7. `[ ]` Vault authority, PDA with seeds `['token-owner', config]`
/// 8. `[ ]` Token program
/// 9.. Extra accounts required for the transfer hook
///
/// Instruction data: release season, as a little-endian `u32`.
pub fn process_claim_withdrawal<'a>(
    program_id: &Pubkey,
    ctx: Context<'a, ClaimWithdrawalAccounts<'a>>,
    release_season: u32,
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

    // Claim.
    let amount = claim_from_account(
        program_id,
        config,
        token,
        ctx.accounts.silo_token.key,
        &owner,
        release_season,
        ctx.accounts.withdrawal,
    )?;

    SiloEvent::RemoveWithdrawal {
        account: owner,
        token: token.mint,
        season: release_season,
        amount,
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
        ctx.remaining_accounts,
        amount,
        decimals,
        &[&signer_seeds],
    )?;

    close_program_account(ctx.accounts.withdrawal, ctx.accounts.owner)
}
