// Service-level tests for the trading engine, run against a real SQLite
// database and the single-writer actor.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::errors::Error;
use crate::ledger::{LedgerEventType, LedgerSearchFilter};
use crate::properties::{PropertyCategory, PropertyError, ShareInventory};
use crate::test_fixtures::TestApp;
use crate::trading::TradingError;

fn trades_filter() -> LedgerSearchFilter {
    LedgerSearchFilter {
        event_types: Some(LedgerEventType::trades()),
        ..Default::default()
    }
}

#[tokio::test]
async fn buy_executes_at_current_price() {
    let app = TestApp::spawn().await;
    app.register_user("user-1", "token-1", dec!(1000)).await;
    let property = app.list_property(dec!(100), dec!(10));

    let receipt = app
        .trading
        .buy("token-1", &property.id, dec!(3))
        .await
        .unwrap();

    assert_eq!(receipt.user_wallet.balance, dec!(700));
    let position = receipt.user_wallet.positions.get(&property.id).unwrap();
    assert_eq!(position.quantity, dec!(3));
    assert_eq!(position.avg_price, dec!(100));
    assert_eq!(position.investment_value, dec!(300));

    let property = app.properties.get_by_id(&property.id).unwrap();
    assert_eq!(
        property.available_shares,
        ShareInventory::Initialized(dec!(7))
    );
}

#[tokio::test]
async fn repeat_buy_recomputes_weighted_average_cost() {
    let app = TestApp::spawn().await;
    app.register_user("user-1", "token-1", dec!(1000)).await;
    let property = app.list_property(dec!(100), dec!(10));

    app.trading
        .buy("token-1", &property.id, dec!(3))
        .await
        .unwrap();
    app.properties.update_price(&property.id, dec!(200)).unwrap();

    let receipt = app
        .trading
        .buy("token-1", &property.id, dec!(3))
        .await
        .unwrap();

    // (300 + 600) / 6, not the mean of the two trade prices
    let position = receipt.user_wallet.positions.get(&property.id).unwrap();
    assert_eq!(position.quantity, dec!(6));
    assert_eq!(position.avg_price, dec!(150));
    assert_eq!(position.investment_value, dec!(900));
    assert_eq!(receipt.user_wallet.balance, dec!(100));
}

#[tokio::test]
async fn buy_beyond_balance_is_rejected_without_side_effects() {
    let app = TestApp::spawn().await;
    app.register_user("user-1", "token-1", dec!(50)).await;
    let property = app.list_property(dec!(100), dec!(10));

    let result = app.trading.buy("token-1", &property.id, dec!(1)).await;
    assert!(matches!(
        result,
        Err(Error::Trading(TradingError::InsufficientFunds(_)))
    ));

    let wallet = app.wallets.get_wallet("user-1").unwrap();
    assert_eq!(wallet.balance, dec!(50));

    let property = app.properties.get_by_id(&property.id).unwrap();
    assert_eq!(
        property.available_shares,
        ShareInventory::Initialized(dec!(10))
    );

    let history = app
        .ledger
        .search_entries("token-1", trades_filter(), 1, 10)
        .unwrap();
    assert_eq!(history.meta.total_row_count, 0);
}

#[tokio::test]
async fn buy_beyond_inventory_is_rejected() {
    let app = TestApp::spawn().await;
    app.register_user("user-1", "token-1", dec!(10000)).await;
    let property = app.list_property(dec!(100), dec!(10));

    let result = app.trading.buy("token-1", &property.id, dec!(11)).await;
    assert!(matches!(
        result,
        Err(Error::Trading(TradingError::InsufficientInventory(_)))
    ));

    let wallet = app.wallets.get_wallet("user-1").unwrap();
    assert_eq!(wallet.balance, dec!(10000));
}

#[tokio::test]
async fn selling_the_full_position_resets_it() {
    let app = TestApp::spawn().await;
    app.register_user("user-1", "token-1", dec!(1000)).await;
    let property = app.list_property(dec!(100), dec!(10));

    app.trading
        .buy("token-1", &property.id, dec!(3))
        .await
        .unwrap();
    app.properties.update_price(&property.id, dec!(200)).unwrap();
    app.trading
        .buy("token-1", &property.id, dec!(3))
        .await
        .unwrap();

    // Position {6, 150, 900}, balance 100, inventory 4
    let receipt = app
        .trading
        .sell("token-1", &property.id, dec!(6))
        .await
        .unwrap();

    let position = receipt.user_wallet.positions.get(&property.id).unwrap();
    assert_eq!(position.quantity, Decimal::ZERO);
    assert_eq!(position.avg_price, Decimal::ZERO);
    assert_eq!(position.investment_value, Decimal::ZERO);
    assert_eq!(receipt.user_wallet.balance, dec!(1300));

    let property = app.properties.get_by_id(&property.id).unwrap();
    assert_eq!(
        property.available_shares,
        ShareInventory::Initialized(dec!(10))
    );
}

#[tokio::test]
async fn partial_sell_preserves_average_cost() {
    let app = TestApp::spawn().await;
    app.register_user("user-1", "token-1", dec!(1000)).await;
    let property = app.list_property(dec!(100), dec!(10));

    app.trading
        .buy("token-1", &property.id, dec!(4))
        .await
        .unwrap();
    app.properties.update_price(&property.id, dec!(150)).unwrap();

    let receipt = app
        .trading
        .sell("token-1", &property.id, dec!(1))
        .await
        .unwrap();

    let position = receipt.user_wallet.positions.get(&property.id).unwrap();
    assert_eq!(position.quantity, dec!(3));
    assert_eq!(position.avg_price, dec!(100));
    assert_eq!(position.investment_value, dec!(300));
    // 400 spent at 100, 150 back at the new price
    assert_eq!(receipt.user_wallet.balance, dec!(750));
}

#[tokio::test]
async fn selling_more_than_held_is_rejected() {
    let app = TestApp::spawn().await;
    app.register_user("user-1", "token-1", dec!(1000)).await;
    let property = app.list_property(dec!(100), dec!(10));

    let result = app.trading.sell("token-1", &property.id, dec!(1)).await;
    assert!(matches!(
        result,
        Err(Error::Trading(TradingError::InsufficientHoldings(_)))
    ));

    app.trading
        .buy("token-1", &property.id, dec!(2))
        .await
        .unwrap();
    let result = app.trading.sell("token-1", &property.id, dec!(3)).await;
    assert!(matches!(
        result,
        Err(Error::Trading(TradingError::InsufficientHoldings(_)))
    ));
}

#[tokio::test]
async fn negative_withdrawal_is_rejected() {
    let app = TestApp::spawn().await;
    app.register_user("user-1", "token-1", dec!(100)).await;

    let result = app.trading.withdraw_balance("token-1", dec!(-5)).await;
    assert!(matches!(
        result,
        Err(Error::Trading(TradingError::InvalidAmount(_)))
    ));

    let wallet = app.wallets.get_wallet("user-1").unwrap();
    assert_eq!(wallet.balance, dec!(100));
}

#[tokio::test]
async fn withdrawal_beyond_balance_is_rejected() {
    let app = TestApp::spawn().await;
    app.register_user("user-1", "token-1", dec!(100)).await;

    let result = app.trading.withdraw_balance("token-1", dec!(101)).await;
    assert!(matches!(
        result,
        Err(Error::Trading(TradingError::InsufficientFunds(_)))
    ));

    let receipt = app
        .trading
        .withdraw_balance("token-1", dec!(40))
        .await
        .unwrap();
    assert_eq!(receipt.balance, dec!(60));
}

#[tokio::test]
async fn every_success_appends_exactly_one_ledger_event() {
    let app = TestApp::spawn().await;
    app.register_user("user-1", "token-1", dec!(1000)).await;
    let property = app.list_property(dec!(100), dec!(10));

    app.trading
        .buy("token-1", &property.id, dec!(2))
        .await
        .unwrap();
    app.trading
        .sell("token-1", &property.id, dec!(1))
        .await
        .unwrap();
    app.trading
        .withdraw_balance("token-1", dec!(100))
        .await
        .unwrap();

    // Opening deposit + buy + sell + withdrawal
    let all = app
        .ledger
        .search_entries("token-1", LedgerSearchFilter::default(), 1, 10)
        .unwrap();
    assert_eq!(all.meta.total_row_count, 4);

    let trades = app
        .ledger
        .search_entries("token-1", trades_filter(), 1, 10)
        .unwrap();
    assert_eq!(trades.meta.total_row_count, 2);
}

#[tokio::test]
async fn ledger_snapshots_balance_before_each_mutation() {
    let app = TestApp::spawn().await;
    app.register_user("user-1", "token-1", dec!(1000)).await;

    app.trading
        .withdraw_balance("token-1", dec!(300))
        .await
        .unwrap();

    let cash = app
        .ledger
        .get_cash_movements("token-1", LedgerSearchFilter::default(), 1, 10)
        .unwrap();
    // Newest first: the withdrawal saw the post-deposit balance
    let withdrawal = &cash.data[0].event;
    assert_eq!(withdrawal.event_type, LedgerEventType::Withdraw);
    assert_eq!(withdrawal.balance_before, dec!(1000));
    assert_eq!(withdrawal.amount, dec!(300));

    let deposit = &cash.data[1].event;
    assert_eq!(deposit.event_type, LedgerEventType::Deposit);
    assert_eq!(deposit.balance_before, Decimal::ZERO);
}

#[tokio::test]
async fn first_trade_initializes_inventory_from_category_area() {
    let app = TestApp::spawn().await;
    app.register_user("user-1", "token-1", dec!(5000)).await;
    let property = app.list_uninitialized_property(
        PropertyCategory::Farm,
        dec!(10),
        None,
        Some(dec!(40)),
    );

    let listed = app.properties.get_by_id(&property.id).unwrap();
    assert_eq!(listed.available_shares, ShareInventory::Uninitialized);

    app.trading
        .buy("token-1", &property.id, dec!(15))
        .await
        .unwrap();

    let traded = app.properties.get_by_id(&property.id).unwrap();
    assert_eq!(
        traded.available_shares,
        ShareInventory::Initialized(dec!(25))
    );
}

#[tokio::test]
async fn property_without_category_area_cannot_trade() {
    let app = TestApp::spawn().await;
    app.register_user("user-1", "token-1", dec!(5000)).await;
    let property = app.list_uninitialized_property(
        PropertyCategory::Farm,
        dec!(10),
        Some(dec!(40)), // carpet area is not the farm attribute
        None,
    );

    let result = app.trading.buy("token-1", &property.id, dec!(1)).await;
    assert!(matches!(
        result,
        Err(Error::Property(PropertyError::MissingArea(_)))
    ));
}

#[tokio::test]
async fn unknown_credential_is_unauthenticated() {
    let app = TestApp::spawn().await;
    let property = app.list_property(dec!(100), dec!(10));

    let result = app.trading.buy("never-issued", &property.id, dec!(1)).await;
    assert!(matches!(result, Err(Error::Identity(_))));
}

#[tokio::test]
async fn unknown_property_is_not_found() {
    let app = TestApp::spawn().await;
    app.register_user("user-1", "token-1", dec!(1000)).await;

    let result = app.trading.buy("token-1", "no-such-property", dec!(1)).await;
    assert!(matches!(
        result,
        Err(Error::Property(PropertyError::NotFound(_)))
    ));
}

#[tokio::test]
async fn concurrent_buys_on_one_wallet_serialize() {
    let app = TestApp::spawn().await;
    app.register_user("user-1", "token-1", dec!(1000)).await;
    let property = app.list_property(dec!(100), dec!(10));

    let (first, second) = tokio::join!(
        app.trading.buy("token-1", &property.id, dec!(3)),
        app.trading.buy("token-1", &property.id, dec!(4)),
    );
    first.unwrap();
    second.unwrap();

    // Neither buy may clobber the other's balance or position update
    let wallet = app.wallets.get_wallet_snapshot("user-1").unwrap();
    assert_eq!(wallet.balance, dec!(300));
    let position = wallet.positions.get(&property.id).unwrap();
    assert_eq!(position.quantity, dec!(7));
    assert_eq!(position.investment_value, dec!(700));

    let property = app.properties.get_by_id(&property.id).unwrap();
    assert_eq!(
        property.available_shares,
        ShareInventory::Initialized(dec!(3))
    );
}
