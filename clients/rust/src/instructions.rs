//! Instruction builders.
//!
//! Every builder derives the program addresses it needs from its arguments,
//! so callers only pass the keys they own (config, mint, owner, token
//! accounts) plus the seasons the instruction touches.

use silo_program::{bdv::BdvPolicy, instruction::ConfigField, instruction::SiloInstruction};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::pdas::{
    find_deposit_pda, find_farmer_pda, find_silo_token_pda, find_vault_pda, find_withdrawal_pda,
};

/// Per-token parameters of [`whitelist_token`].
#[derive(Clone, Copy, Debug)]
pub struct WhitelistArgs {
    pub policy: BdvPolicy,
    pub stalk_per_bdv: u32,
    pub seeds_per_bdv: u32,
    pub fixed_rate: u64,
    pub legacy_bdv_rate: u64,
}

pub fn initialize_config(
    config: &Pubkey,
    config_authority: &Pubkey,
    withdraw_seasons: u32,
) -> Instruction {
    Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new(*config, false),
            AccountMeta::new_readonly(*config_authority, false),
        ],
        data: SiloInstruction::InitializeConfig { withdraw_seasons }.pack(),
    }
}

pub fn set_authority(config: &Pubkey, authority: &Pubkey, new_authority: &Pubkey) -> Instruction {
    Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new(*config, false),
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new_readonly(*new_authority, false),
        ],
        data: SiloInstruction::SetAuthority.pack(),
    }
}

pub fn update_config(config: &Pubkey, config_authority: &Pubkey, field: ConfigField) -> Instruction {
    Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new(*config, false),
            AccountMeta::new_readonly(*config_authority, true),
        ],
        data: SiloInstruction::UpdateConfig(field).pack(),
    }
}

pub fn sunrise(config: &Pubkey, config_authority: &Pubkey) -> Instruction {
    Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new(*config, false),
            AccountMeta::new_readonly(*config_authority, true),
        ],
        data: SiloInstruction::Sunrise.pack(),
    }
}

/// Whitelists `mint`.
///
/// `bdv_source` is the curve pool for curve-derived tokens and the mint
/// otherwise. `ripe_mint` is only read for unripe tokens; pass the mint for
/// the other policies.
#[allow(clippy::too_many_arguments)]
pub fn whitelist_token(
    config: &Pubkey,
    config_authority: &Pubkey,
    mint: &Pubkey,
    vault: &Pubkey,
    bdv_source: &Pubkey,
    ripe_mint: &Pubkey,
    args: WhitelistArgs,
) -> Instruction {
    let silo_token = find_silo_token_pda(config, mint).0;

    Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new_readonly(*config, false),
            AccountMeta::new(silo_token, false),
            AccountMeta::new_readonly(*config_authority, true),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(*vault, false),
            AccountMeta::new_readonly(*bdv_source, false),
            AccountMeta::new_readonly(*ripe_mint, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: SiloInstruction::WhitelistToken {
            policy: args.policy,
            stalk_per_bdv: args.stalk_per_bdv,
            seeds_per_bdv: args.seeds_per_bdv,
            fixed_rate: args.fixed_rate,
            legacy_bdv_rate: args.legacy_bdv_rate,
        }
        .pack(),
    }
}

pub fn dewhitelist_token(config: &Pubkey, config_authority: &Pubkey, mint: &Pubkey) -> Instruction {
    Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new_readonly(*config, false),
            AccountMeta::new(find_silo_token_pda(config, mint).0, false),
            AccountMeta::new_readonly(*config_authority, true),
        ],
        data: SiloInstruction::DewhitelistToken.pack(),
    }
}

pub fn add_underlying(
    config: &Pubkey,
    config_authority: &Pubkey,
    mint: &Pubkey,
    amount: u64,
) -> Instruction {
    Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new_readonly(*config, false),
            AccountMeta::new(find_silo_token_pda(config, mint).0, false),
            AccountMeta::new_readonly(*config_authority, true),
        ],
        data: SiloInstruction::AddUnderlying(amount).pack(),
    }
}

/// Deposits `amount` into the crate of `season`, which must be the current
/// season of the config.
#[allow(clippy::too_many_arguments)]
pub fn deposit(
    config: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
    source_token_account: &Pubkey,
    vault: &Pubkey,
    bdv_source: &Pubkey,
    token_program: &Pubkey,
    season: u32,
    amount: u64,
) -> Instruction {
    let silo_token = find_silo_token_pda(config, mint).0;

    Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new(*config, false),
            AccountMeta::new(silo_token, false),
            AccountMeta::new(find_farmer_pda(config, owner).0, false),
            AccountMeta::new(find_deposit_pda(&silo_token, owner, season).0, false),
            AccountMeta::new_readonly(*owner, true),
            AccountMeta::new(*source_token_account, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(*vault, false),
            AccountMeta::new_readonly(*bdv_source, false),
            AccountMeta::new_readonly(*token_program, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: SiloInstruction::Deposit(amount).pack(),
    }
}

/// Withdraws `amount` from the crate of `season`.
///
/// `release_season` is `current_season + withdraw_seasons` at execution time.
pub fn withdraw_deposit(
    config: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
    season: u32,
    release_season: u32,
    amount: u64,
) -> Instruction {
    let silo_token = find_silo_token_pda(config, mint).0;

    Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new(*config, false),
            AccountMeta::new(silo_token, false),
            AccountMeta::new(find_farmer_pda(config, owner).0, false),
            AccountMeta::new(find_deposit_pda(&silo_token, owner, season).0, false),
            AccountMeta::new(
                find_withdrawal_pda(&silo_token, owner, release_season).0,
                false,
            ),
            AccountMeta::new(*owner, true),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: SiloInstruction::WithdrawDeposit { season, amount }.pack(),
    }
}

pub fn withdraw_deposits(
    config: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
    seasons: Vec<u32>,
    release_season: u32,
    amounts: Vec<u64>,
) -> Instruction {
    let silo_token = find_silo_token_pda(config, mint).0;

    let mut accounts = vec![
        AccountMeta::new(*config, false),
        AccountMeta::new(silo_token, false),
        AccountMeta::new(find_farmer_pda(config, owner).0, false),
        AccountMeta::new(
            find_withdrawal_pda(&silo_token, owner, release_season).0,
            false,
        ),
        AccountMeta::new(*owner, true),
        AccountMeta::new_readonly(system_program::ID, false),
    ];
    accounts.extend(
        seasons
            .iter()
            .map(|season| AccountMeta::new(find_deposit_pda(&silo_token, owner, *season).0, false)),
    );

    Instruction {
        program_id: crate::ID,
        accounts,
        data: SiloInstruction::WithdrawDeposits { seasons, amounts }.pack(),
    }
}

pub fn claim_withdrawal(
    config: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
    destination_token_account: &Pubkey,
    vault: &Pubkey,
    token_program: &Pubkey,
    release_season: u32,
) -> Instruction {
    let silo_token = find_silo_token_pda(config, mint).0;

    Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new_readonly(*config, false),
            AccountMeta::new(silo_token, false),
            AccountMeta::new(
                find_withdrawal_pda(&silo_token, owner, release_season).0,
                false,
            ),
            AccountMeta::new(*owner, true),
            AccountMeta::new(*destination_token_account, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(*vault, false),
            AccountMeta::new_readonly(find_vault_pda(config).0, false),
            AccountMeta::new_readonly(*token_program, false),
        ],
        data: SiloInstruction::ClaimWithdrawal(release_season).pack(),
    }
}

pub fn claim_withdrawals(
    config: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
    destination_token_account: &Pubkey,
    vault: &Pubkey,
    token_program: &Pubkey,
    release_seasons: Vec<u32>,
) -> Instruction {
    let silo_token = find_silo_token_pda(config, mint).0;

    let mut accounts = vec![
        AccountMeta::new_readonly(*config, false),
        AccountMeta::new(silo_token, false),
        AccountMeta::new(*owner, true),
        AccountMeta::new(*destination_token_account, false),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new(*vault, false),
        AccountMeta::new_readonly(find_vault_pda(config).0, false),
        AccountMeta::new_readonly(*token_program, false),
    ];
    accounts.extend(release_seasons.iter().map(|season| {
        AccountMeta::new(find_withdrawal_pda(&silo_token, owner, *season).0, false)
    }));

    Instruction {
        program_id: crate::ID,
        accounts,
        data: SiloInstruction::ClaimWithdrawals(release_seasons).pack(),
    }
}

pub fn transfer_deposit(
    config: &Pubkey,
    mint: &Pubkey,
    sender: &Pubkey,
    recipient: &Pubkey,
    season: u32,
    amount: u64,
) -> Instruction {
    let silo_token = find_silo_token_pda(config, mint).0;

    Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new(*config, false),
            AccountMeta::new(silo_token, false),
            AccountMeta::new(find_farmer_pda(config, sender).0, false),
            AccountMeta::new(find_farmer_pda(config, recipient).0, false),
            AccountMeta::new(find_deposit_pda(&silo_token, sender, season).0, false),
            AccountMeta::new(find_deposit_pda(&silo_token, recipient, season).0, false),
            AccountMeta::new(*sender, true),
            AccountMeta::new_readonly(*recipient, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: SiloInstruction::TransferDeposit { season, amount }.pack(),
    }
}

pub fn transfer_deposits(
    config: &Pubkey,
    mint: &Pubkey,
    sender: &Pubkey,
    recipient: &Pubkey,
    seasons: Vec<u32>,
    amounts: Vec<u64>,
) -> Instruction {
    let silo_token = find_silo_token_pda(config, mint).0;

    let mut accounts = vec![
        AccountMeta::new(*config, false),
        AccountMeta::new(silo_token, false),
        AccountMeta::new(find_farmer_pda(config, sender).0, false),
        AccountMeta::new(find_farmer_pda(config, recipient).0, false),
        AccountMeta::new(*sender, true),
        AccountMeta::new_readonly(*recipient, false),
        AccountMeta::new_readonly(system_program::ID, false),
    ];
    for season in &seasons {
        accounts.push(AccountMeta::new(
            find_deposit_pda(&silo_token, sender, *season).0,
            false,
        ));
        accounts.push(AccountMeta::new(
            find_deposit_pda(&silo_token, recipient, *season).0,
            false,
        ));
    }

    Instruction {
        program_id: crate::ID,
        accounts,
        data: SiloInstruction::TransferDeposits { seasons, amounts }.pack(),
    }
}

pub fn update_unripe_deposit(
    config: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
    season: u32,
    amount: u64,
) -> Instruction {
    let silo_token = find_silo_token_pda(config, mint).0;

    Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new(*config, false),
            AccountMeta::new(silo_token, false),
            AccountMeta::new(find_farmer_pda(config, owner).0, false),
            AccountMeta::new(find_deposit_pda(&silo_token, owner, season).0, false),
            AccountMeta::new_readonly(*owner, true),
            AccountMeta::new_readonly(*mint, false),
        ],
        data: SiloInstruction::UpdateUnripeDeposit { season, amount }.pack(),
    }
}

pub fn update_unripe_deposits(
    config: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
    seasons: Vec<u32>,
    amounts: Vec<u64>,
) -> Instruction {
    let silo_token = find_silo_token_pda(config, mint).0;

    let mut accounts = vec![
        AccountMeta::new(*config, false),
        AccountMeta::new(silo_token, false),
        AccountMeta::new(find_farmer_pda(config, owner).0, false),
        AccountMeta::new_readonly(*owner, true),
        AccountMeta::new_readonly(*mint, false),
    ];
    accounts.extend(
        seasons
            .iter()
            .map(|season| AccountMeta::new(find_deposit_pda(&silo_token, owner, *season).0, false)),
    );

    Instruction {
        program_id: crate::ID,
        accounts,
        data: SiloInstruction::UpdateUnripeDeposits { seasons, amounts }.pack(),
    }
}
