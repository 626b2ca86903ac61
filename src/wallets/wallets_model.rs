use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use super::wallets_errors::{Result, WalletError};
use crate::constants::DECIMAL_PRECISION;

/// Per-user cash wallet. Created once at registration, mutated only by the
/// trading engine; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub user_id: String,
    pub balance: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A user's holding in one property.
///
/// Invariants maintained by the trading engine: `quantity >= 0`; when the
/// quantity reaches zero, `avg_price` and `investment_value` reset to zero;
/// otherwise `avg_price == investment_value / quantity` (weighted-average
/// cost basis).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub user_id: String,
    pub property_id: String,
    pub quantity: Decimal,
    pub avg_price: Decimal,
    pub investment_value: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Position {
    /// Opens a fresh position from the first buy
    pub fn open(user_id: &str, property_id: &str, quantity: Decimal, price: Decimal) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            property_id: property_id.to_string(),
            quantity,
            avg_price: price,
            investment_value: quantity * price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Folds a buy into the position, recomputing the weighted-average cost
    /// basis (not a mean of the old and new trade prices).
    pub fn apply_buy(&mut self, quantity: Decimal, price: Decimal) {
        self.investment_value += quantity * price;
        self.quantity += quantity;
        self.avg_price = self.investment_value / self.quantity;
        self.updated_at = chrono::Utc::now().naive_utc();
    }

    /// Removes sold shares. A sell never changes the average cost per
    /// remaining unit; at zero quantity the position resets entirely.
    pub fn apply_sell(&mut self, quantity: Decimal) {
        self.quantity -= quantity;
        if self.quantity.is_zero() {
            self.avg_price = Decimal::ZERO;
            self.investment_value = Decimal::ZERO;
        } else {
            self.investment_value = self.quantity * self.avg_price;
        }
        self.updated_at = chrono::Utc::now().naive_utc();
    }
}

/// Position as surfaced to callers: internal row id suppressed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSnapshot {
    pub quantity: Decimal,
    pub avg_price: Decimal,
    pub investment_value: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Position> for PositionSnapshot {
    fn from(position: Position) -> Self {
        Self {
            quantity: position.quantity,
            avg_price: position.avg_price,
            investment_value: position.investment_value,
            created_at: position.created_at,
            updated_at: position.updated_at,
        }
    }
}

/// Wallet plus its typed position map, as returned by trading operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSnapshot {
    pub user_id: String,
    pub balance: Decimal,
    pub positions: HashMap<String, PositionSnapshot>,
}

/// Database model for wallets
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::wallets)]
#[diesel(primary_key(user_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WalletDB {
    pub user_id: String,
    pub balance: String,
    #[diesel(skip_insertion)]
    pub created_at: NaiveDateTime,
    #[diesel(skip_insertion)]
    pub updated_at: NaiveDateTime,
}

/// Database model for positions
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::positions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PositionDB {
    pub id: String,
    pub user_id: String,
    pub property_id: String,
    pub quantity: String,
    pub avg_price: String,
    pub investment_value: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<WalletDB> for Wallet {
    type Error = WalletError;

    fn try_from(db: WalletDB) -> Result<Self> {
        Ok(Self {
            user_id: db.user_id,
            balance: parse_decimal(&db.balance, "balance")?,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl TryFrom<PositionDB> for Position {
    type Error = WalletError;

    fn try_from(db: PositionDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            user_id: db.user_id,
            property_id: db.property_id,
            quantity: parse_decimal(&db.quantity, "quantity")?,
            avg_price: parse_decimal(&db.avg_price, "avg_price")?,
            investment_value: parse_decimal(&db.investment_value, "investment_value")?,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<&Position> for PositionDB {
    fn from(position: &Position) -> Self {
        Self {
            id: position.id.clone(),
            user_id: position.user_id.clone(),
            property_id: position.property_id.clone(),
            quantity: position.quantity.round_dp(DECIMAL_PRECISION).to_string(),
            avg_price: position.avg_price.round_dp(DECIMAL_PRECISION).to_string(),
            investment_value: position
                .investment_value
                .round_dp(DECIMAL_PRECISION)
                .to_string(),
            created_at: position.created_at,
            updated_at: position.updated_at,
        }
    }
}

fn parse_decimal(raw: &str, field: &str) -> Result<Decimal> {
    Decimal::from_str(raw)
        .map_err(|e| WalletError::InvalidData(format!("Bad {} value '{}': {}", field, raw, e)))
}
