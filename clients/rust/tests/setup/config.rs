use silo_program::bdv::BdvPolicy;
use silo_program_client::{
    accounts::{Config, CurvePool, SiloToken, DEFAULT_WITHDRAW_SEASONS, RATE_PRECISION},
    instructions::{add_underlying, initialize_config, sunrise, whitelist_token, WhitelistArgs},
    pdas::{find_silo_token_pda, find_vault_pda},
};
use solana_program_test::{BanksClientError, ProgramTestContext};
use solana_sdk::{
    account::{Account, AccountSharedData},
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    system_instruction,
    transaction::Transaction,
};

use super::{
    get_state,
    token::{create_mint, create_token, TOKEN_ACCOUNT_EXTENSIONS},
};

/// Decimals of the test mints.
pub const DECIMALS: u8 = 6;

pub struct SiloManager {
    // Config account.
    pub config: Pubkey,
    // Config authority.
    pub authority: Keypair,
}

impl SiloManager {
    pub async fn new(context: &mut ProgramTestContext) -> Self {
        Self::with_withdraw_seasons(context, DEFAULT_WITHDRAW_SEASONS).await
    }

    pub async fn with_withdraw_seasons(
        context: &mut ProgramTestContext,
        withdraw_seasons: u32,
    ) -> Self {
        let config = Keypair::new();
        let authority = Keypair::new();

        let create_ix = system_instruction::create_account(
            &context.payer.pubkey(),
            &config.pubkey(),
            context
                .banks_client
                .get_rent()
                .await
                .unwrap()
                .minimum_balance(Config::LEN),
            Config::LEN as u64,
            &silo_program_client::ID,
        );

        let initialize_ix =
            initialize_config(&config.pubkey(), &authority.pubkey(), withdraw_seasons);

        let tx = Transaction::new_signed_with_payer(
            &[create_ix, initialize_ix],
            Some(&context.payer.pubkey()),
            &[&context.payer, &config],
            context.last_blockhash,
        );
        context.banks_client.process_transaction(tx).await.unwrap();

        Self {
            config: config.pubkey(),
            authority,
        }
    }

    pub async fn config(&self, context: &mut ProgramTestContext) -> Config {
        get_state::<Config>(context, &self.config).await
    }

    pub async fn current_season(&self, context: &mut ProgramTestContext) -> u32 {
        self.config(context).await.current_season()
    }

    /// Advances the season `count` times.
    pub async fn sunrise(&self, context: &mut ProgramTestContext, count: u32) {
        for _ in 0..count {
            context.get_new_latest_blockhash().await.unwrap();

            let tx = Transaction::new_signed_with_payer(
                &[sunrise(&self.config, &self.authority.pubkey())],
                Some(&context.payer.pubkey()),
                &[&context.payer, &self.authority],
                context.last_blockhash,
            );
            context.banks_client.process_transaction(tx).await.unwrap();
        }
    }

    /// Whitelists a new fixed-rate token.
    pub async fn whitelist_fixed(
        &self,
        context: &mut ProgramTestContext,
        fixed_rate: u64,
    ) -> TokenManager {
        TokenManager::new(
            context,
            self,
            WhitelistArgs {
                policy: BdvPolicy::Fixed,
                stalk_per_bdv: 10_000,
                seeds_per_bdv: 1,
                fixed_rate,
                legacy_bdv_rate: fixed_rate,
            },
            None,
        )
        .await
        .unwrap()
    }

    /// Whitelists a new unripe token backed by a freshly created ripe mint.
    pub async fn whitelist_unripe(&self, context: &mut ProgramTestContext) -> TokenManager {
        TokenManager::new(
            context,
            self,
            WhitelistArgs {
                policy: BdvPolicy::UnripeProrata,
                stalk_per_bdv: 10_000,
                seeds_per_bdv: 1,
                fixed_rate: 0,
                legacy_bdv_rate: RATE_PRECISION,
            },
            None,
        )
        .await
        .unwrap()
    }

    /// Whitelists a new LP token priced by `pool`.
    pub async fn whitelist_curve(
        &self,
        context: &mut ProgramTestContext,
        pool: &Pubkey,
    ) -> TokenManager {
        TokenManager::new(
            context,
            self,
            WhitelistArgs {
                policy: BdvPolicy::CurveDerived,
                stalk_per_bdv: 10_000,
                seeds_per_bdv: 4,
                fixed_rate: 0,
                legacy_bdv_rate: RATE_PRECISION,
            },
            Some(*pool),
        )
        .await
        .unwrap()
    }

    pub async fn add_underlying(
        &self,
        context: &mut ProgramTestContext,
        token: &TokenManager,
        amount: u64,
    ) {
        context.get_new_latest_blockhash().await.unwrap();

        let tx = Transaction::new_signed_with_payer(
            &[add_underlying(
                &self.config,
                &self.authority.pubkey(),
                &token.mint.pubkey(),
                amount,
            )],
            Some(&context.payer.pubkey()),
            &[&context.payer, &self.authority],
            context.last_blockhash,
        );
        context.banks_client.process_transaction(tx).await.unwrap();
    }
}

pub struct TokenManager {
    // Token mint.
    pub mint: Keypair,
    // Mint authority.
    pub mint_authority: Keypair,
    // Vault token account.
    pub vault: Pubkey,
    // Silo token account.
    pub silo_token: Pubkey,
    // Curve pool or the mint itself.
    pub bdv_source: Pubkey,
}

impl TokenManager {
    /// Creates a mint and its vault, then whitelists it.
    ///
    /// `bdv_source` defaults to the mint.
    pub async fn new(
        context: &mut ProgramTestContext,
        silo: &SiloManager,
        args: WhitelistArgs,
        bdv_source: Option<Pubkey>,
    ) -> Result<Self, BanksClientError> {
        let mint = Keypair::new();
        let mint_authority = Keypair::new();
        create_mint(context, &mint, &mint_authority.pubkey(), None, DECIMALS)
            .await
            .unwrap();

        let vault = Keypair::new();
        create_token(
            context,
            &find_vault_pda(&silo.config).0,
            &vault,
            &mint.pubkey(),
            TOKEN_ACCOUNT_EXTENSIONS,
        )
        .await
        .unwrap();

        let ripe_mint = if args.policy == BdvPolicy::UnripeProrata {
            let ripe_mint = Keypair::new();
            create_mint(context, &ripe_mint, &mint_authority.pubkey(), None, DECIMALS)
                .await
                .unwrap();
            ripe_mint.pubkey()
        } else {
            mint.pubkey()
        };

        let bdv_source = bdv_source.unwrap_or(mint.pubkey());
        let silo_token = find_silo_token_pda(&silo.config, &mint.pubkey()).0;

        // pre-funds the silo token account

        let transfer_ix = system_instruction::transfer(
            &context.payer.pubkey(),
            &silo_token,
            context
                .banks_client
                .get_rent()
                .await
                .unwrap()
                .minimum_balance(SiloToken::LEN),
        );

        let whitelist_ix = whitelist_token(
            &silo.config,
            &silo.authority.pubkey(),
            &mint.pubkey(),
            &vault.pubkey(),
            &bdv_source,
            &ripe_mint,
            args,
        );

        let tx = Transaction::new_signed_with_payer(
            &[transfer_ix, whitelist_ix],
            Some(&context.payer.pubkey()),
            &[&context.payer, &silo.authority],
            context.last_blockhash,
        );
        context.banks_client.process_transaction(tx).await?;

        Ok(Self {
            mint,
            mint_authority,
            vault: vault.pubkey(),
            silo_token,
            bdv_source,
        })
    }

    pub async fn state(&self, context: &mut ProgramTestContext) -> SiloToken {
        get_state::<SiloToken>(context, &self.silo_token).await
    }
}

/// Writes a curve pool account with the given virtual price and LP supply.
pub fn set_curve_pool(
    context: &mut ProgramTestContext,
    pool: &Pubkey,
    virtual_price: u128,
    supply: u128,
) {
    let state = CurvePool {
        virtual_price: virtual_price.into(),
        balances: [supply.into(), supply.into()],
        supply: supply.into(),
    };

    context.set_account(
        pool,
        &AccountSharedData::from(Account {
            lamports: 1_000_000_000,
            data: bytemuck::bytes_of(&state).to_vec(),
            owner: Pubkey::new_unique(),
            executable: false,
            rent_epoch: 0,
        }),
    );
}
