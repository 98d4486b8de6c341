use silo_program_client::{
    accounts::{Deposit, Farmer, Withdrawal},
    instructions::{deposit, transfer_deposit, withdraw_deposit},
    pdas::{find_deposit_pda, find_farmer_pda, find_withdrawal_pda},
};
use solana_program_test::{BanksClientError, ProgramTestContext};
use solana_sdk::{
    instruction::Instruction, pubkey::Pubkey, signature::Keypair, signer::Signer,
    system_instruction, transaction::Transaction,
};

use super::{
    config::{SiloManager, TokenManager, DECIMALS},
    get_state, is_closed,
    token::{create_token, mint_to, TOKEN_ACCOUNT_EXTENSIONS},
};

/// Transfers the rent-exempt minimum for `space` bytes to each address.
pub async fn fund_rent(
    context: &mut ProgramTestContext,
    addresses: &[Pubkey],
    space: usize,
) -> Vec<Instruction> {
    let lamports = context
        .banks_client
        .get_rent()
        .await
        .unwrap()
        .minimum_balance(space);

    addresses
        .iter()
        .map(|address| system_instruction::transfer(&context.payer.pubkey(), address, lamports))
        .collect()
}

pub struct FarmerManager {
    // Account owner.
    pub owner: Keypair,
    // Token account of the owner.
    pub token_account: Pubkey,
}

impl FarmerManager {
    /// Creates an owner with a token account holding `amount` tokens.
    pub async fn new(context: &mut ProgramTestContext, token: &TokenManager, amount: u64) -> Self {
        let owner = Keypair::new();
        let token_account = Keypair::new();

        create_token(
            context,
            &owner.pubkey(),
            &token_account,
            &token.mint.pubkey(),
            TOKEN_ACCOUNT_EXTENSIONS,
        )
        .await
        .unwrap();

        // the owner receives the rent of closed crates and withdrawals

        let tx = Transaction::new_signed_with_payer(
            &[system_instruction::transfer(
                &context.payer.pubkey(),
                &owner.pubkey(),
                1_000_000_000,
            )],
            Some(&context.payer.pubkey()),
            &[&context.payer],
            context.last_blockhash,
        );
        context.banks_client.process_transaction(tx).await.unwrap();

        if amount > 0 {
            mint_to(
                context,
                &token.mint.pubkey(),
                &token.mint_authority,
                &token_account.pubkey(),
                amount,
                DECIMALS,
            )
            .await
            .unwrap();
        }

        Self {
            owner,
            token_account: token_account.pubkey(),
        }
    }

    pub fn farmer(&self, silo: &SiloManager) -> Pubkey {
        find_farmer_pda(&silo.config, &self.owner.pubkey()).0
    }

    pub fn deposit_address(&self, token: &TokenManager, season: u32) -> Pubkey {
        find_deposit_pda(&token.silo_token, &self.owner.pubkey(), season).0
    }

    pub fn withdrawal_address(&self, token: &TokenManager, release_season: u32) -> Pubkey {
        find_withdrawal_pda(&token.silo_token, &self.owner.pubkey(), release_season).0
    }

    pub async fn state(&self, context: &mut ProgramTestContext, silo: &SiloManager) -> Farmer {
        get_state::<Farmer>(context, &self.farmer(silo)).await
    }

    /// Reads a crate; `None` when it does not exist.
    pub async fn crate_at(
        &self,
        context: &mut ProgramTestContext,
        token: &TokenManager,
        season: u32,
    ) -> Option<Deposit> {
        let address = self.deposit_address(token, season);

        if is_closed(context, &address).await {
            None
        } else {
            Some(get_state::<Deposit>(context, &address).await)
        }
    }

    pub async fn withdrawal_at(
        &self,
        context: &mut ProgramTestContext,
        token: &TokenManager,
        release_season: u32,
    ) -> Option<Withdrawal> {
        let address = self.withdrawal_address(token, release_season);

        if is_closed(context, &address).await {
            None
        } else {
            Some(get_state::<Withdrawal>(context, &address).await)
        }
    }

    /// Sends `instructions` signed by the owner, after pre-funding
    /// `new_accounts` with the rent of `space` bytes.
    pub async fn send(
        &self,
        context: &mut ProgramTestContext,
        new_accounts: &[(Pubkey, usize)],
        instructions: &[Instruction],
    ) -> Result<(), BanksClientError> {
        let mut all = Vec::new();
        for (address, space) in new_accounts {
            all.extend(fund_rent(context, &[*address], *space).await);
        }
        all.extend_from_slice(instructions);

        context.get_new_latest_blockhash().await.unwrap();

        let tx = Transaction::new_signed_with_payer(
            &all,
            Some(&context.payer.pubkey()),
            &[&context.payer, &self.owner],
            context.last_blockhash,
        );
        context.banks_client.process_transaction(tx).await
    }

    /// Deposits `amount` into the crate of the current season.
    pub async fn deposit(
        &self,
        context: &mut ProgramTestContext,
        silo: &SiloManager,
        token: &TokenManager,
        amount: u64,
    ) -> Result<(), BanksClientError> {
        let season = silo.current_season(context).await;

        let deposit_ix = deposit(
            &silo.config,
            &token.mint.pubkey(),
            &self.owner.pubkey(),
            &self.token_account,
            &token.vault,
            &token.bdv_source,
            &spl_token_2022::ID,
            season,
            amount,
        );

        self.send(
            context,
            &[
                (self.farmer(silo), Farmer::LEN),
                (self.deposit_address(token, season), Deposit::LEN),
            ],
            &[deposit_ix],
        )
        .await
    }

    /// Withdraws `amount` from the crate of `season`.
    pub async fn withdraw(
        &self,
        context: &mut ProgramTestContext,
        silo: &SiloManager,
        token: &TokenManager,
        season: u32,
        amount: u64,
    ) -> Result<u32, BanksClientError> {
        let release_season = silo.config(context).await.release_season().unwrap();

        self.send(
            context,
            &[(
                self.withdrawal_address(token, release_season),
                Withdrawal::LEN,
            )],
            &[withdraw_deposit(
                &silo.config,
                &token.mint.pubkey(),
                &self.owner.pubkey(),
                season,
                release_season,
                amount,
            )],
        )
        .await?;

        Ok(release_season)
    }

    /// Transfers `amount` from the crate of `season` to `recipient`.
    pub async fn transfer(
        &self,
        context: &mut ProgramTestContext,
        silo: &SiloManager,
        token: &TokenManager,
        recipient: &FarmerManager,
        season: u32,
        amount: u64,
    ) -> Result<(), BanksClientError> {
        self.send(
            context,
            &[
                (recipient.farmer(silo), Farmer::LEN),
                (recipient.deposit_address(token, season), Deposit::LEN),
            ],
            &[transfer_deposit(
                &silo.config,
                &token.mint.pubkey(),
                &self.owner.pubkey(),
                &recipient.owner.pubkey(),
                season,
                amount,
            )],
        )
        .await
    }
}
