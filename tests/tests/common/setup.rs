use anchor_lang::prelude::Pubkey;
use stablecoin_engine::{EngineConfig, Ledger};
use stablecoin_tests::{usd, MockFeeds, MockStablecoin, MockTokens, TestEngine, WAD};

pub const ETH_USD: i64 = 2_000;
pub const BTC_USD: i64 = 30_000;

/// Collateral every actor starts with, in each asset.
pub const STARTING_BALANCE: u128 = 50 * WAD;

pub struct Fixture {
    pub engine: TestEngine,
    pub engine_id: Pubkey,
    pub stablecoin_id: Pubkey,
    pub weth: Pubkey,
    pub wbtc: Pubkey,
    pub eth_feed: Pubkey,
    pub btc_feed: Pubkey,
    pub user: Pubkey,
    pub liquidator: Pubkey,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_ledger(Ledger::new())
    }

    pub fn with_ledger(ledger: Ledger) -> Self {
        let engine_id = Pubkey::new_unique();
        let stablecoin_id = Pubkey::new_unique();
        let weth = Pubkey::new_unique();
        let wbtc = Pubkey::new_unique();
        let eth_feed = Pubkey::new_unique();
        let btc_feed = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let liquidator = Pubkey::new_unique();

        let mut feeds = MockFeeds::default();
        feeds.set_answer(&eth_feed, usd(ETH_USD));
        feeds.set_answer(&btc_feed, usd(BTC_USD));

        let mut tokens = MockTokens::new(engine_id);
        for owner in [user, liquidator] {
            for asset in [weth, wbtc] {
                tokens.fund(&asset, &owner, STARTING_BALANCE);
                tokens.approve(&asset, &owner, u128::MAX);
            }
        }

        let config = EngineConfig::new(
            engine_id,
            stablecoin_id,
            vec![weth, wbtc],
            vec![eth_feed, btc_feed],
        );
        let engine = TestEngine::with_ledger(
            config,
            ledger,
            feeds,
            tokens,
            MockStablecoin::new(engine_id),
        )
        .expect("fixture config is valid");

        Self {
            engine,
            engine_id,
            stablecoin_id,
            weth,
            wbtc,
            eth_feed,
            btc_feed,
            user,
            liquidator,
        }
    }

    pub fn set_eth_price(&mut self, dollars: i64) {
        let feed = self.eth_feed;
        self.engine.feeds_mut().set_answer(&feed, usd(dollars));
    }

    pub fn tokens(&self) -> &MockTokens {
        self.engine.collateral_token()
    }

    pub fn tokens_mut(&mut self) -> &mut MockTokens {
        self.engine.collateral_token_mut()
    }

    pub fn coin(&self) -> &MockStablecoin {
        self.engine.stablecoin_ledger()
    }

    pub fn coin_mut(&mut self) -> &mut MockStablecoin {
        self.engine.stablecoin_ledger_mut()
    }

    /// Let the engine pull up to `amount` of `owner`'s stablecoin.
    pub fn approve_stablecoin(&mut self, owner: &Pubkey, amount: u128) {
        self.coin_mut().approve(owner, amount);
    }

    /// `user` deposits 10 WETH ($20,000) and mints $100.
    pub fn open_user_position(&mut self) {
        let (user, weth) = (self.user, self.weth);
        self.engine
            .deposit_collateral_and_mint(&user, &weth, 10 * WAD, 100 * WAD)
            .expect("open user position");
    }

    /// `liquidator` deposits `collateral` WETH and mints $100 to liquidate with.
    pub fn arm_liquidator(&mut self, collateral: u128) {
        let (liquidator, weth) = (self.liquidator, self.weth);
        self.engine
            .deposit_collateral_and_mint(&liquidator, &weth, collateral, 100 * WAD)
            .expect("arm liquidator");
        self.approve_stablecoin(&liquidator, 100 * WAD);
    }
}
