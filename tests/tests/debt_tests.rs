
use common::setup::{Fixture, STARTING_BALANCE};
use stablecoin_engine::{
    EngineError, EngineEvent, PositionStatus, StablecoinBurned, StablecoinMinted,
    ValidationError,
};
use stablecoin_tests::WAD;

#[test]
fn test_deposit_and_mint_opens_a_position() {
    let mut fx = Fixture::new();
    fx.open_user_position();
    let (user, engine_id) = (fx.user, fx.engine_id);

    let info = fx.engine.account_info(&user).unwrap();
    assert_eq!(info.total_debt, 100 * WAD);
    assert_eq!(info.collateral_value_usd, 20_000 * WAD);
    assert_eq!(fx.engine.health_factor(&user).unwrap().value(), 100 * WAD);
    assert_eq!(fx.coin().balance_of(&user), 100 * WAD);
    assert_eq!(fx.tokens().balance_of(&fx.weth, &engine_id), 10 * WAD);

    let events = fx.engine.take_events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1],
        EngineEvent::StablecoinMinted(StablecoinMinted {
            user,
            amount: 100 * WAD,
            total_debt: 100 * WAD,
        })
    );
}

#[test]
fn test_mint_that_breaks_health_factor_never_reaches_the_ledger() {
    let mut fx = Fixture::new();
    let (user, weth) = (fx.user, fx.weth);
    fx.engine.deposit_collateral(&user, &weth, 10 * WAD).unwrap();

    let err = fx.engine.mint(&user, 10_001 * WAD).unwrap_err();
    match err {
        EngineError::BreakHealthFactor { user: u, health_factor } => {
            assert_eq!(u, user);
            assert!(health_factor.value() < WAD);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fx.engine.debt(&user), 0);
    assert_eq!(fx.coin().mint_calls, 0);

    fx.engine.mint(&user, 10_000 * WAD).unwrap();
    assert_eq!(fx.engine.health_factor(&user).unwrap().value(), WAD);
}

#[test]
fn test_one_wei_mint_is_unboundedly_healthy() {
    let mut fx = Fixture::new();
    let (user, weth) = (fx.user, fx.weth);
    fx.engine.deposit_collateral(&user, &weth, 10 * WAD).unwrap();

    fx.engine.mint(&user, 1).unwrap();

    assert_eq!(fx.engine.debt(&user), 1);
    assert!(fx.engine.health_factor(&user).unwrap().is_unbounded());
    assert_eq!(fx.engine.position_status(&user).unwrap(), PositionStatus::Healthy);
    assert_eq!(fx.coin().balance_of(&user), 1);
}

#[test]
fn test_burn_leaving_one_wei_of_debt_succeeds() {
    let mut fx = Fixture::new();
    fx.open_user_position();
    let user = fx.user;
    fx.approve_stablecoin(&user, 100 * WAD);

    fx.engine.burn(&user, 100 * WAD - 1).unwrap();

    assert_eq!(fx.engine.debt(&user), 1);
    assert_eq!(fx.coin().balance_of(&user), 1);
    assert!(fx.engine.health_factor(&user).unwrap().is_unbounded());
}

#[test]
fn test_mint_without_collateral_fails() {
    let mut fx = Fixture::new();
    let user = fx.user;
    assert!(matches!(
        fx.engine.mint(&user, WAD),
        Err(EngineError::BreakHealthFactor { .. })
    ));
}

#[test]
fn test_refused_mint_returns_the_deposit() {
    let mut fx = Fixture::new();
    let (user, weth) = (fx.user, fx.weth);
    fx.coin_mut().refuse_mint = true;

    let err = fx
        .engine
        .deposit_collateral_and_mint(&user, &weth, 10 * WAD, 100 * WAD)
        .unwrap_err();
    assert!(matches!(err, EngineError::MintFailed { amount, .. } if amount == 100 * WAD));
    assert_eq!(fx.coin().mint_calls, 1);
    assert_eq!(fx.engine.collateral_balance(&user, &weth), 0);
    assert_eq!(fx.engine.debt(&user), 0);
    assert_eq!(fx.tokens().balance_of(&weth, &user), STARTING_BALANCE);
    assert_eq!(fx.tokens().calls, ["transfer_from", "transfer"]);
    assert!(fx.engine.take_events().is_empty());
}

#[test]
fn test_zero_mint_in_deposit_and_mint_touches_nothing() {
    let mut fx = Fixture::new();
    let (user, weth) = (fx.user, fx.weth);
    let err = fx
        .engine
        .deposit_collateral_and_mint(&user, &weth, 10 * WAD, 0)
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(ValidationError::ZeroAmount)));
    assert!(fx.tokens().calls.is_empty());
}

#[test]
fn test_burn_repays_debt() {
    let mut fx = Fixture::new();
    fx.open_user_position();
    fx.engine.take_events();
    let user = fx.user;
    fx.approve_stablecoin(&user, 100 * WAD);

    fx.engine.burn(&user, 40 * WAD).unwrap();

    assert_eq!(fx.engine.debt(&user), 60 * WAD);
    assert_eq!(fx.coin().balance_of(&user), 60 * WAD);
    assert_eq!(fx.coin().total_supply(), 60 * WAD);
    assert_eq!(
        fx.engine.take_events(),
        vec![EngineEvent::StablecoinBurned(StablecoinBurned {
            on_behalf_of: user,
            payer: user,
            amount: 40 * WAD,
            total_debt: 60 * WAD,
        })]
    );
}

#[test]
fn test_burn_beyond_debt_is_rejected() {
    let mut fx = Fixture::new();
    fx.open_user_position();
    let user = fx.user;
    fx.approve_stablecoin(&user, u128::MAX);

    let err = fx.engine.burn(&user, 101 * WAD).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::InsufficientDebt { owed, requested })
            if owed == 100 * WAD && requested == 101 * WAD
    ));
    assert_eq!(fx.coin().burn_calls, 0);
}

#[test]
fn test_burn_without_allowance_restores_debt() {
    let mut fx = Fixture::new();
    fx.open_user_position();
    let user = fx.user;

    let err = fx.engine.burn(&user, 10 * WAD).unwrap_err();
    assert!(matches!(err, EngineError::TransferFailed { .. }));
    assert_eq!(fx.engine.debt(&user), 100 * WAD);
    assert_eq!(fx.coin().balance_of(&user), 100 * WAD);
}

#[test]
fn test_refused_burn_refunds_the_payer() {
    let mut fx = Fixture::new();
    fx.open_user_position();
    let (user, engine_id) = (fx.user, fx.engine_id);
    fx.approve_stablecoin(&user, 100 * WAD);
    fx.coin_mut().refuse_burn = true;

    let err = fx.engine.burn(&user, 100 * WAD).unwrap_err();
    assert!(matches!(err, EngineError::BurnFailed { .. }));
    assert_eq!(fx.engine.debt(&user), 100 * WAD);
    assert_eq!(fx.coin().balance_of(&user), 100 * WAD);
    assert_eq!(fx.coin().balance_of(&engine_id), 0);
}

#[test]
fn test_redeem_for_debt_closes_the_position() {
    let mut fx = Fixture::new();
    fx.open_user_position();
    let (user, weth) = (fx.user, fx.weth);
    fx.approve_stablecoin(&user, 100 * WAD);

    fx.engine
        .redeem_collateral_for_debt(&user, &weth, 10 * WAD, 100 * WAD)
        .unwrap();

    assert_eq!(fx.engine.debt(&user), 0);
    assert_eq!(fx.engine.collateral_balance(&user, &weth), 0);
    assert_eq!(fx.tokens().balance_of(&weth, &user), STARTING_BALANCE);
    assert_eq!(fx.coin().total_supply(), 0);
}

#[test]
fn test_redeem_for_debt_with_zero_burn_only_redeems() {
    let mut fx = Fixture::new();
    fx.open_user_position();
    let (user, weth) = (fx.user, fx.weth);

    fx.engine
        .redeem_collateral_for_debt(&user, &weth, WAD, 0)
        .unwrap();

    assert_eq!(fx.engine.debt(&user), 100 * WAD);
    assert_eq!(fx.engine.collateral_balance(&user, &weth), 9 * WAD);
    assert_eq!(fx.coin().burn_calls, 0);
}

#[test]
fn test_refused_payout_after_burn_unwinds_the_burn() {
    let mut fx = Fixture::new();
    fx.open_user_position();
    let (user, weth, engine_id) = (fx.user, fx.weth, fx.engine_id);
    fx.approve_stablecoin(&user, 100 * WAD);
    fx.tokens_mut().refuse_transfer = true;

    let err = fx
        .engine
        .redeem_collateral_for_debt(&user, &weth, 10 * WAD, 100 * WAD)
        .unwrap_err();
    assert!(matches!(err, EngineError::TransferFailed { .. }));

    assert_eq!(fx.engine.debt(&user), 100 * WAD);
    assert_eq!(fx.engine.collateral_balance(&user, &weth), 10 * WAD);
    assert_eq!(fx.coin().balance_of(&user), 100 * WAD);
    assert_eq!(fx.coin().balance_of(&engine_id), 0);
    assert_eq!(fx.coin().total_supply(), 100 * WAD);
}
