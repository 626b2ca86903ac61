//! Shared fixtures for service-level tests: a real SQLite database in a
//! temporary directory, the single-writer actor, and the wired services.

use std::sync::Arc;

use rust_decimal::Decimal;
use tempfile::TempDir;

use crate::db::{self, DbPool};
use crate::identity::StaticIdentityProvider;
use crate::ledger::LedgerService;
use crate::notifications::LogNotificationSink;
use crate::portfolio::PortfolioService;
use crate::properties::{NewProperty, Property, PropertyCategory, PropertyRepository};
use crate::trading::TradingService;
use crate::wallets::WalletService;

pub(crate) struct TestApp {
    // Dropping the TempDir deletes the database file, so it rides along
    _data_dir: TempDir,
    pub pool: Arc<DbPool>,
    pub identity: Arc<StaticIdentityProvider>,
    pub properties: Arc<PropertyRepository>,
    pub trading: TradingService,
    pub ledger: LedgerService,
    pub portfolio: PortfolioService,
    pub wallets: WalletService,
}

impl TestApp {
    /// Must be called from within a tokio runtime; the writer actor is a
    /// spawned task.
    pub async fn spawn() -> Self {
        let data_dir = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = data_dir.path().join("propshare.db");
        let db_path = db_path.to_str().expect("temp path is not utf-8");

        let pool = db::create_pool(db_path).expect("failed to create pool");
        db::run_migrations(&pool).expect("failed to run migrations");

        let writer = db::spawn_writer(pool.clone());
        let identity = Arc::new(StaticIdentityProvider::new());
        let properties = Arc::new(PropertyRepository::new(pool.clone()));
        let notifier = Arc::new(LogNotificationSink);

        let trading = TradingService::new(writer, identity.clone(), notifier);
        let ledger = LedgerService::new(pool.clone(), identity.clone(), properties.clone());
        let portfolio = PortfolioService::new(pool.clone(), identity.clone(), properties.clone());
        let wallets = WalletService::new(pool.clone());

        Self {
            _data_dir: data_dir,
            pool,
            identity,
            properties,
            trading,
            ledger,
            portfolio,
            wallets,
        }
    }

    /// Creates a wallet, registers a credential, and optionally deposits an
    /// opening balance.
    pub async fn register_user(&self, user_id: &str, credential: &str, opening_balance: Decimal) {
        self.wallets
            .create_wallet(user_id)
            .expect("failed to create wallet");
        self.identity.insert_session(credential, user_id);
        if opening_balance > Decimal::ZERO {
            self.trading
                .add_balance(credential, opening_balance)
                .await
                .expect("failed to deposit opening balance");
        }
    }

    /// Lists a residential property with an explicit share inventory
    pub fn list_property(&self, price: Decimal, available_shares: Decimal) -> Property {
        self.properties
            .create(NewProperty {
                id: None,
                title: "Sunset Apartments".to_string(),
                address: "12 Marine Drive".to_string(),
                logo_url: None,
                category: PropertyCategory::Residential,
                price,
                available_shares: Some(available_shares),
                carpet_area: Some(available_shares),
                plot_area: None,
            })
            .expect("failed to list property")
    }

    /// Lists a property whose share inventory has never been initialized;
    /// the first trade derives it from the category area.
    pub fn list_uninitialized_property(
        &self,
        category: PropertyCategory,
        price: Decimal,
        carpet_area: Option<Decimal>,
        plot_area: Option<Decimal>,
    ) -> Property {
        self.properties
            .create(NewProperty {
                id: None,
                title: "Green Acres".to_string(),
                address: "Survey 42, Ring Road".to_string(),
                logo_url: None,
                category,
                price,
                available_shares: None,
                carpet_area,
                plot_area,
            })
            .expect("failed to list property")
    }
}
