use solana_program::{
    entrypoint::ProgramResult, msg, program_error::ProgramError, pubkey::Pubkey,
};
use spl_token_2022::{
    extension::PodStateWithExtensions,
    pod::{PodAccount, PodMint},
};

use crate::{
    bdv::BdvPolicy,
    error::SiloError,
    instruction::accounts::{Context, WhitelistTokenAccounts},
    processor::{check_config_authority, create_pda_account, unpack_initialized},
    require,
    state::{
        find_silo_token_pda, find_vault_pda, get_silo_token_pda_signer_seeds, Config, CurvePool,
        SiloToken, TokenSettings,
    },
};

/// Whitelists a token for deposit.
///
/// NOTE: The silo token account is created and assigned to this program, so
/// it needs to be pre-funded with the minimum rent balance by the caller.
///
/// ### Accounts:
///
///   0. `[]` config
///   1. `[w]` silo_token
///   2. `[s]` config_authority
///   3. `[]` mint
///   4. `[]` vault
///   5. `[]` bdv_source
///   6. `[]` ripe_mint
///   7. `[]` system_program
pub fn process_whitelist_token(
    program_id: &Pubkey,
    ctx: Context<WhitelistTokenAccounts>,
    settings: TokenSettings,
) -> ProgramResult {
    // Accounts validation.

    // 1. config
    // - owner must be this program
    // - must be initialized

    require!(
        ctx.accounts.config.owner == program_id,
        ProgramError::InvalidAccountOwner,
        "config"
    );

    let config_data = ctx.accounts.config.try_borrow_data()?;
    let config = unpack_initialized::<Config>(&config_data)?;

    // 2. config_authority
    // - must be a signer
    // - must match the authority on the config account

    check_config_authority(config, ctx.accounts.config_authority)?;

    // 3. mint
    // - owner must be spl token 2022
    // - must be initialized

    require!(
        ctx.accounts.mint.owner == &spl_token_2022::ID,
        ProgramError::InvalidAccountOwner,
        "mint"
    );

    let mint_data = ctx.accounts.mint.try_borrow_data()?;
    // unpack checks if the mint is initialized
    PodStateWithExtensions::<PodMint>::unpack(&mint_data)?;

    // 4. vault (token account)
    // - must be initialized
    // - have the vault signer (PDA) as owner
    // - have the correct mint

    let vault_data = ctx.accounts.vault.try_borrow_data()?;
    // unpack checks if the token is initialized
    let vault = PodStateWithExtensions::<PodAccount>::unpack(&vault_data)?;

    let (vault_signer, _) = find_vault_pda(ctx.accounts.config.key, program_id);

    require!(
        vault.base.owner == vault_signer,
        SiloError::InvalidTokenOwner,
        "vault"
    );

    require!(
        &vault.base.mint == ctx.accounts.mint.key,
        SiloError::InvalidMint,
        "vault"
    );

    // 5. bdv_source
    // - curve-derived: must be a readable curve pool
    // - otherwise: must be the token mint
    //
    // 6. ripe_mint
    // - unripe: must be an initialized spl token 2022 mint
    // - otherwise: ignored

    let ripe_mint = match settings.policy {
        BdvPolicy::Fixed => {
            require!(
                settings.fixed_rate > 0,
                ProgramError::InvalidArgument,
                "fixed_rate"
            );
            require!(
                ctx.accounts.bdv_source.key == ctx.accounts.mint.key,
                SiloError::InvalidBdvSource,
                "bdv_source"
            );
            Pubkey::default()
        }
        BdvPolicy::CurveDerived => {
            let pool_data = ctx.accounts.bdv_source.try_borrow_data()?;
            CurvePool::read(&pool_data)?;
            Pubkey::default()
        }
        BdvPolicy::UnripeProrata => {
            require!(
                ctx.accounts.bdv_source.key == ctx.accounts.mint.key,
                SiloError::InvalidBdvSource,
                "bdv_source"
            );
            require!(
                ctx.accounts.ripe_mint.owner == &spl_token_2022::ID,
                ProgramError::InvalidAccountOwner,
                "ripe_mint"
            );
            let ripe_mint_data = ctx.accounts.ripe_mint.try_borrow_data()?;
            PodStateWithExtensions::<PodMint>::unpack(&ripe_mint_data)?;
            *ctx.accounts.ripe_mint.key
        }
    };

    // 7. silo_token
    // - have the correct PDA derivation
    // - be uninitialized (empty data)

    let (derivation, bump) =
        find_silo_token_pda(ctx.accounts.config.key, ctx.accounts.mint.key, program_id);

    require!(
        ctx.accounts.silo_token.key == &derivation,
        ProgramError::InvalidSeeds,
        "silo_token"
    );

    require!(
        ctx.accounts.silo_token.data_is_empty(),
        ProgramError::AccountAlreadyInitialized,
        "silo_token"
    );

    // Allocate and assign.

    let bump_seed = [bump];
    let signer_seeds = get_silo_token_pda_signer_seeds(
        ctx.accounts.config.key,
        ctx.accounts.mint.key,
        &bump_seed,
    );
    create_pda_account(
        program_id,
        ctx.accounts.silo_token,
        SiloToken::LEN,
        &signer_seeds,
        "silo_token",
    )?;

    // Initialize the silo token account.

    let mut data = ctx.accounts.silo_token.try_borrow_mut_data()?;
    *bytemuck::from_bytes_mut::<SiloToken>(&mut data) = SiloToken::new(
        *ctx.accounts.config.key,
        *ctx.accounts.mint.key,
        *ctx.accounts.vault.key,
        *ctx.accounts.bdv_source.key,
        ripe_mint,
        settings,
    );

    msg!(
        "Whitelisted {} ({:?}, {} stalk and {} seeds per bdv)",
        ctx.accounts.mint.key,
        settings.policy,
        settings.stalk_per_bdv,
        settings.seeds_per_bdv
    );

    Ok(())
}
