use solana_program::pubkey::Pubkey;

pub fn find_vault_pda(config: &Pubkey) -> (Pubkey, u8) {
    silo_program::state::find_vault_pda(config, &crate::ID)
}

pub fn find_silo_token_pda(config: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    silo_program::state::find_silo_token_pda(config, mint, &crate::ID)
}

pub fn find_farmer_pda(config: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    silo_program::state::find_farmer_pda(config, owner, &crate::ID)
}

/// Finds the crate address of `owner` for `season`.
///
/// `silo_token` is the silo token account, not the mint.
pub fn find_deposit_pda(silo_token: &Pubkey, owner: &Pubkey, season: u32) -> (Pubkey, u8) {
    silo_program::state::find_deposit_pda(silo_token, owner, season, &crate::ID)
}

pub fn find_withdrawal_pda(
    silo_token: &Pubkey,
    owner: &Pubkey,
    release_season: u32,
) -> (Pubkey, u8) {
    silo_program::state::find_withdrawal_pda(silo_token, owner, release_season, &crate::ID)
}
