pub mod config;
pub mod curve_pool;
pub mod deposit;
pub mod farmer;
pub mod silo_token;
pub mod withdrawal;

pub use config::*;
pub use curve_pool::*;
pub use deposit::*;
pub use farmer::*;
pub use silo_token::*;
use solana_program::{program_error::ProgramError, pubkey::Pubkey};
pub use withdrawal::*;

/// Fixed-point precision of the per-token BDV rates (`fixed_rate` and
/// `legacy_bdv_rate`).
pub const RATE_PRECISION: u64 = 1_000_000;

/// Seed prefix of the vault authority PDA.
pub const VAULT_AUTHORITY_SEED: &[u8] = b"token-owner";

#[inline(always)]
pub fn find_vault_pda(config: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_AUTHORITY_SEED, config.as_ref()], program_id)
}

#[inline(always)]
pub fn create_vault_pda(
    config: &Pubkey,
    bump: &[u8],
    program_id: &Pubkey,
) -> Result<Pubkey, ProgramError> {
    Pubkey::create_program_address(&[VAULT_AUTHORITY_SEED, config.as_ref(), bump], program_id)
        .map_err(|_| ProgramError::InvalidSeeds)
}

#[inline(always)]
pub fn get_vault_pda_signer_seeds<'a>(config: &'a Pubkey, bump_seed: &'a [u8]) -> [&'a [u8]; 3] {
    [VAULT_AUTHORITY_SEED, config.as_ref(), bump_seed]
}

#[inline(always)]
pub fn find_silo_token_pda(config: &Pubkey, mint: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            "silo::state::silo_token".as_bytes(),
            config.as_ref(),
            mint.as_ref(),
        ],
        program_id,
    )
}

#[inline(always)]
pub fn get_silo_token_pda_signer_seeds<'a>(
    config: &'a Pubkey,
    mint: &'a Pubkey,
    bump_seed: &'a [u8],
) -> [&'a [u8]; 4] {
    [
        "silo::state::silo_token".as_bytes(),
        config.as_ref(),
        mint.as_ref(),
        bump_seed,
    ]
}

#[inline(always)]
pub fn find_farmer_pda(config: &Pubkey, owner: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            "silo::state::farmer".as_bytes(),
            config.as_ref(),
            owner.as_ref(),
        ],
        program_id,
    )
}

#[inline(always)]
pub fn get_farmer_pda_signer_seeds<'a>(
    config: &'a Pubkey,
    owner: &'a Pubkey,
    bump_seed: &'a [u8],
) -> [&'a [u8]; 4] {
    [
        "silo::state::farmer".as_bytes(),
        config.as_ref(),
        owner.as_ref(),
        bump_seed,
    ]
}

/// Finds the crate address for `(silo_token, owner, season)`.
///
/// Legacy and current crates share this derivation, so migrating a crate
/// never changes its address.
#[inline(always)]
pub fn find_deposit_pda(
    silo_token: &Pubkey,
    owner: &Pubkey,
    season: u32,
    program_id: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            "silo::state::deposit".as_bytes(),
            silo_token.as_ref(),
            owner.as_ref(),
            &season.to_le_bytes(),
        ],
        program_id,
    )
}

#[inline(always)]
pub fn get_deposit_pda_signer_seeds<'a>(
    silo_token: &'a Pubkey,
    owner: &'a Pubkey,
    season: &'a [u8; 4],
    bump_seed: &'a [u8],
) -> [&'a [u8]; 5] {
    [
        "silo::state::deposit".as_bytes(),
        silo_token.as_ref(),
        owner.as_ref(),
        season,
        bump_seed,
    ]
}

#[inline(always)]
pub fn find_withdrawal_pda(
    silo_token: &Pubkey,
    owner: &Pubkey,
    release_season: u32,
    program_id: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            "silo::state::withdrawal".as_bytes(),
            silo_token.as_ref(),
            owner.as_ref(),
            &release_season.to_le_bytes(),
        ],
        program_id,
    )
}

#[inline(always)]
pub fn get_withdrawal_pda_signer_seeds<'a>(
    silo_token: &'a Pubkey,
    owner: &'a Pubkey,
    release_season: &'a [u8; 4],
    bump_seed: &'a [u8],
) -> [&'a [u8]; 5] {
    [
        "silo::state::withdrawal".as_bytes(),
        silo_token.as_ref(),
        owner.as_ref(),
        release_season,
        bump_seed,
    ]
}
