use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::wallets_model::{Wallet, WalletSnapshot};
use super::wallets_repository::WalletRepository;
use crate::db::get_connection;
use crate::wallets::{Result, WalletError};

/// Service for wallet lifecycle and lookups
pub struct WalletService {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl WalletService {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Creates an empty wallet at user registration
    pub fn create_wallet(&self, user_id: &str) -> Result<Wallet> {
        debug!("Creating wallet for user {}", user_id);
        let repo = WalletRepository::new(self.pool.clone());
        repo.create(user_id)
    }

    /// Retrieves a wallet by owner
    pub fn get_wallet(&self, user_id: &str) -> Result<Wallet> {
        let repo = WalletRepository::new(self.pool.clone());
        repo.get_by_user_id(user_id)
    }

    /// Wallet plus typed position map, internal row ids suppressed
    pub fn get_wallet_snapshot(&self, user_id: &str) -> Result<WalletSnapshot> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| WalletError::DatabaseError(e.to_string()))?;
        WalletRepository::snapshot(&mut conn, user_id)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::test_fixtures::TestApp;

    #[tokio::test]
    async fn a_new_wallet_starts_empty() {
        let app = TestApp::spawn().await;
        let wallet = app.wallets.create_wallet("user-1").unwrap();
        assert_eq!(wallet.balance, Decimal::ZERO);

        let snapshot = app.wallets.get_wallet_snapshot("user-1").unwrap();
        assert_eq!(snapshot.balance, Decimal::ZERO);
        assert!(snapshot.positions.is_empty());
    }

    #[tokio::test]
    async fn a_user_gets_exactly_one_wallet() {
        let app = TestApp::spawn().await;
        app.wallets.create_wallet("user-1").unwrap();

        let result = app.wallets.create_wallet("user-1");
        assert!(matches!(result, Err(WalletError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn missing_wallets_are_not_found() {
        let app = TestApp::spawn().await;
        let result = app.wallets.get_wallet("nobody");
        assert!(matches!(result, Err(WalletError::NotFound(_))));
    }

    #[tokio::test]
    async fn snapshot_keys_positions_by_property() {
        let app = TestApp::spawn().await;
        app.register_user("user-1", "token-1", dec!(1000)).await;
        let property = app.list_property(dec!(100), dec!(10));

        app.trading
            .buy("token-1", &property.id, dec!(4))
            .await
            .unwrap();

        let snapshot = app.wallets.get_wallet_snapshot("user-1").unwrap();
        assert_eq!(snapshot.positions.len(), 1);
        let position = snapshot.positions.get(&property.id).unwrap();
        assert_eq!(position.quantity, dec!(4));
        assert_eq!(position.avg_price, dec!(100));
    }
}
