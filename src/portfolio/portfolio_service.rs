use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::portfolio_model::{
    InvestmentProgress, PortfolioPositionView, PropertyWalletValue, WalletView,
};
use super::returns_calculator;
use super::portfolio_errors::PortfolioError;
use crate::errors::Result;
use crate::identity::IdentityProvider;
use crate::properties::PropertyReferenceTrait;
use crate::wallets::WalletRepository;

/// Computes aggregate and per-holding views by combining wallet positions
/// with property reference data and price history
pub struct PortfolioService {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    identity: Arc<dyn IdentityProvider>,
    property_reference: Arc<dyn PropertyReferenceTrait>,
}

impl PortfolioService {
    pub fn new(
        pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
        identity: Arc<dyn IdentityProvider>,
        property_reference: Arc<dyn PropertyReferenceTrait>,
    ) -> Self {
        Self {
            pool,
            identity,
            property_reference,
        }
    }

    /// Cash balance plus a detail row per open position, with portfolio and
    /// investment totals across them
    pub fn get_wallet_view(&self, credential: &str) -> Result<WalletView> {
        let user_id = self.identity.resolve_user(credential)?;
        debug!("Building wallet view for user {}", user_id);

        let wallet_repo = WalletRepository::new(self.pool.clone());
        let wallet = wallet_repo.get_by_user_id(&user_id)?;
        let positions = wallet_repo.list_positions(&user_id)?;

        let mut portfolio_detail = Vec::new();
        let mut portfolio_balance = Decimal::ZERO;
        let mut investment_balance = Decimal::ZERO;

        for position in positions {
            if position.quantity <= Decimal::ZERO {
                continue;
            }

            let property = self.property_reference.get_property(&position.property_id)?;
            let candles = self
                .property_reference
                .get_price_history(&position.property_id)?;

            let current_value = position.quantity * property.price;
            portfolio_balance += current_value;
            investment_balance += position.investment_value;

            portfolio_detail.push(PortfolioPositionView {
                property_id: position.property_id,
                title: property.title,
                address: property.address,
                logo_url: property.logo_url,
                current_price: property.price,
                quantity: position.quantity,
                avg_price: position.avg_price,
                investment_value: position.investment_value,
                current_value,
                change_percent_24h: returns_calculator::change_percent_24h(&candles),
                candles,
            });
        }

        Ok(WalletView {
            balance: wallet.balance,
            portfolio_detail,
            portfolio_balance,
            investment_balance,
        })
    }

    /// Period returns for the caller's holding in one property
    pub fn get_investment_progress(
        &self,
        credential: &str,
        property_id: &str,
    ) -> Result<InvestmentProgress> {
        let user_id = self.identity.resolve_user(credential)?;
        debug!(
            "Computing investment progress for user {} on property {}",
            user_id, property_id
        );

        let property = self.property_reference.get_property(property_id)?;
        let candles = self.property_reference.get_price_history(property_id)?;

        let mut conn = crate::db::get_connection(&self.pool)?;
        let position = WalletRepository::get_position(&mut conn, &user_id, property_id)?
            .filter(|p| p.quantity > Decimal::ZERO)
            .ok_or_else(|| {
                PortfolioError::NotFound(format!(
                    "You do not have any shares of property {}",
                    property_id
                ))
            })?;

        let (one_day_return, one_day_return_percent) =
            returns_calculator::one_day_return(&candles, position.quantity);
        let (total_return, total_return_percent) =
            returns_calculator::total_return(&candles, position.quantity);

        Ok(InvestmentProgress {
            property_id: property_id.to_string(),
            quantity: position.quantity,
            current_value: property.price * position.quantity,
            investment_value: position.investment_value,
            one_day_return,
            one_day_return_percent,
            total_return,
            total_return_percent,
        })
    }

    /// Market view of a property: current price, share inventory state and
    /// 24h movement. No holding required.
    pub fn get_property_wallet_value(&self, property_id: &str) -> Result<PropertyWalletValue> {
        let property = self.property_reference.get_property(property_id)?;
        let candles = self.property_reference.get_price_history(property_id)?;

        Ok(PropertyWalletValue {
            property_id: property_id.to_string(),
            current_price: property.price,
            available_shares: property.available_shares.as_option(),
            change_24h: returns_calculator::change_24h(&candles),
            change_percent_24h: returns_calculator::change_percent_24h(&candles),
            as_of: chrono::Utc::now().naive_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::errors::Error;
    use crate::test_fixtures::TestApp;

    #[tokio::test]
    async fn wallet_view_totals_open_positions_at_current_prices() {
        let app = TestApp::spawn().await;
        app.register_user("user-1", "token-1", dec!(1000)).await;
        let first = app.list_property(dec!(100), dec!(10));
        let second = app.list_property(dec!(50), dec!(10));

        app.trading
            .buy("token-1", &first.id, dec!(3))
            .await
            .unwrap();
        app.trading
            .buy("token-1", &second.id, dec!(2))
            .await
            .unwrap();
        app.properties.update_price(&first.id, dec!(150)).unwrap();

        let view = app.portfolio.get_wallet_view("token-1").unwrap();
        assert_eq!(view.balance, dec!(600));
        assert_eq!(view.portfolio_detail.len(), 2);
        // 3 * 150 + 2 * 50 marked to the latest prices
        assert_eq!(view.portfolio_balance, dec!(550));
        assert_eq!(view.investment_balance, dec!(400));

        let repriced = view
            .portfolio_detail
            .iter()
            .find(|row| row.property_id == first.id)
            .unwrap();
        assert_eq!(repriced.current_price, dec!(150));
        assert_eq!(repriced.current_value, dec!(450));
        assert_eq!(repriced.avg_price, dec!(100));
        assert_eq!(repriced.change_percent_24h, dec!(50));
        assert_eq!(repriced.candles.len(), 2);
    }

    #[tokio::test]
    async fn wallet_view_skips_closed_positions() {
        let app = TestApp::spawn().await;
        app.register_user("user-1", "token-1", dec!(1000)).await;
        let property = app.list_property(dec!(100), dec!(10));

        app.trading
            .buy("token-1", &property.id, dec!(2))
            .await
            .unwrap();
        app.trading
            .sell("token-1", &property.id, dec!(2))
            .await
            .unwrap();

        let view = app.portfolio.get_wallet_view("token-1").unwrap();
        assert!(view.portfolio_detail.is_empty());
        assert_eq!(view.portfolio_balance, Decimal::ZERO);
        assert_eq!(view.investment_balance, Decimal::ZERO);
        assert_eq!(view.balance, dec!(1000));
    }

    #[tokio::test]
    async fn investment_progress_scales_returns_by_the_holding() {
        let app = TestApp::spawn().await;
        app.register_user("user-1", "token-1", dec!(1000)).await;
        let property = app.list_property(dec!(100), dec!(10));

        app.trading
            .buy("token-1", &property.id, dec!(2))
            .await
            .unwrap();
        app.properties.update_price(&property.id, dec!(150)).unwrap();

        let progress = app
            .portfolio
            .get_investment_progress("token-1", &property.id)
            .unwrap();
        assert_eq!(progress.quantity, dec!(2));
        assert_eq!(progress.current_value, dec!(300));
        assert_eq!(progress.investment_value, dec!(200));
        assert_eq!(progress.one_day_return, dec!(100));
        assert_eq!(progress.one_day_return_percent, dec!(50));
        assert_eq!(progress.total_return, dec!(100));
        assert_eq!(progress.total_return_percent, dec!(50));
    }

    #[tokio::test]
    async fn investment_progress_requires_an_open_holding() {
        let app = TestApp::spawn().await;
        app.register_user("user-1", "token-1", dec!(1000)).await;
        let property = app.list_property(dec!(100), dec!(10));

        let result = app
            .portfolio
            .get_investment_progress("token-1", &property.id);
        assert!(matches!(
            result,
            Err(Error::Portfolio(PortfolioError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn property_wallet_value_reports_the_market_state() {
        let app = TestApp::spawn().await;
        let property = app.list_property(dec!(100), dec!(10));
        app.properties.update_price(&property.id, dec!(120)).unwrap();

        let value = app
            .portfolio
            .get_property_wallet_value(&property.id)
            .unwrap();
        assert_eq!(value.current_price, dec!(120));
        assert_eq!(value.available_shares, Some(dec!(10)));
        assert_eq!(value.change_24h, dec!(20));
        assert_eq!(value.change_percent_24h, dec!(20));
    }
}
