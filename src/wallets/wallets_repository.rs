use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use super::wallets_errors::{Result, WalletError};
use super::wallets_model::{
    Position, PositionDB, PositionSnapshot, Wallet, WalletDB, WalletSnapshot,
};
use crate::constants::DECIMAL_PRECISION;
use crate::db::get_connection;
use crate::schema::{positions, wallets};

/// Repository for wallet and position rows.
///
/// Pool-backed methods serve reads; the associated functions taking an
/// explicit connection run inside the single-writer transaction.
pub struct WalletRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl WalletRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Creates an empty wallet for a newly registered user. The primary key
    /// enforces one wallet per user; concurrent creates lose with
    /// `AlreadyExists` rather than a raw constraint error.
    pub fn create(&self, user_id: &str) -> Result<Wallet> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| WalletError::DatabaseError(e.to_string()))?;

        let wallet_db = WalletDB {
            user_id: user_id.to_string(),
            balance: Decimal::ZERO.to_string(),
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
        };

        diesel::insert_into(wallets::table)
            .values(&wallet_db)
            .execute(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => WalletError::AlreadyExists(format!(
                    "Wallet for user {} already exists",
                    user_id
                )),
                _ => WalletError::from(e),
            })?;

        Self::get_for_update(&mut conn, user_id)
    }

    /// Retrieves a wallet by owner
    pub fn get_by_user_id(&self, user_id: &str) -> Result<Wallet> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| WalletError::DatabaseError(e.to_string()))?;
        Self::get_for_update(&mut conn, user_id)
    }

    /// Retrieves a wallet on an explicit connection (single-writer path)
    pub fn get_for_update(conn: &mut SqliteConnection, user_id: &str) -> Result<Wallet> {
        let wallet_db = wallets::table
            .find(user_id)
            .first::<WalletDB>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    WalletError::NotFound(format!("User wallet not found for user {}", user_id))
                }
                _ => WalletError::DatabaseError(e.to_string()),
            })?;

        wallet_db.try_into()
    }

    /// Overwrites the cash balance inside the single-writer transaction
    pub fn update_balance(
        conn: &mut SqliteConnection,
        user_id: &str,
        balance: Decimal,
    ) -> Result<()> {
        diesel::update(wallets::table.find(user_id))
            .set((
                wallets::balance.eq(balance.round_dp(DECIMAL_PRECISION).to_string()),
                wallets::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)?;
        Ok(())
    }

    /// Looks up one position, if the user holds any shares of the property
    pub fn get_position(
        conn: &mut SqliteConnection,
        user_id: &str,
        property_id: &str,
    ) -> Result<Option<Position>> {
        positions::table
            .filter(positions::user_id.eq(user_id))
            .filter(positions::property_id.eq(property_id))
            .first::<PositionDB>(conn)
            .optional()?
            .map(Position::try_from)
            .transpose()
    }

    /// Inserts or replaces a position row inside the single-writer transaction
    pub fn upsert_position(conn: &mut SqliteConnection, position: &Position) -> Result<()> {
        let position_db: PositionDB = position.into();

        diesel::insert_into(positions::table)
            .values(&position_db)
            .on_conflict((positions::user_id, positions::property_id))
            .do_update()
            .set((
                positions::quantity.eq(&position_db.quantity),
                positions::avg_price.eq(&position_db.avg_price),
                positions::investment_value.eq(&position_db.investment_value),
                positions::updated_at.eq(&position_db.updated_at),
            ))
            .execute(conn)?;
        Ok(())
    }

    /// All positions held by a user, keyed by property id
    pub fn list_positions(&self, user_id: &str) -> Result<Vec<Position>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| WalletError::DatabaseError(e.to_string()))?;
        Self::list_positions_on(&mut conn, user_id)
    }

    fn list_positions_on(conn: &mut SqliteConnection, user_id: &str) -> Result<Vec<Position>> {
        positions::table
            .filter(positions::user_id.eq(user_id))
            .order(positions::created_at.asc())
            .load::<PositionDB>(conn)?
            .into_iter()
            .map(Position::try_from)
            .collect()
    }

    /// Wallet plus typed position map with internal row ids suppressed
    pub fn snapshot(conn: &mut SqliteConnection, user_id: &str) -> Result<WalletSnapshot> {
        let wallet = Self::get_for_update(conn, user_id)?;
        let positions = Self::list_positions_on(conn, user_id)?;

        let positions: HashMap<String, PositionSnapshot> = positions
            .into_iter()
            .map(|p| (p.property_id.clone(), PositionSnapshot::from(p)))
            .collect();

        Ok(WalletSnapshot {
            user_id: wallet.user_id,
            balance: wallet.balance,
            positions,
        })
    }
}
