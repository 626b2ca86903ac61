use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::ledger_errors::{LedgerError, Result};
use crate::constants::{
    DECIMAL_PRECISION, EVENT_TYPE_BUY, EVENT_TYPE_DEPOSIT, EVENT_TYPE_SELL, EVENT_TYPE_WITHDRAW,
    TRANSACTION_STATUS_SUCCESS,
};

/// Typed variant of a ledger event. Share trades and cash movements share one
/// append-only log instead of the two overlapping ledgers the envelope fields
/// would otherwise be duplicated across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEventType {
    Buy,
    Sell,
    Deposit,
    Withdraw,
}

impl LedgerEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEventType::Buy => EVENT_TYPE_BUY,
            LedgerEventType::Sell => EVENT_TYPE_SELL,
            LedgerEventType::Deposit => EVENT_TYPE_DEPOSIT,
            LedgerEventType::Withdraw => EVENT_TYPE_WITHDRAW,
        }
    }

    /// The share-trade variants (the original share-transaction ledger)
    pub fn trades() -> Vec<LedgerEventType> {
        vec![LedgerEventType::Buy, LedgerEventType::Sell]
    }

    /// The cash-movement variants (the original fiat ledger)
    pub fn cash_movements() -> Vec<LedgerEventType> {
        vec![LedgerEventType::Deposit, LedgerEventType::Withdraw]
    }
}

impl FromStr for LedgerEventType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            EVENT_TYPE_BUY => Ok(LedgerEventType::Buy),
            EVENT_TYPE_SELL => Ok(LedgerEventType::Sell),
            EVENT_TYPE_DEPOSIT => Ok(LedgerEventType::Deposit),
            EVENT_TYPE_WITHDRAW => Ok(LedgerEventType::Withdraw),
            other => Err(LedgerError::InvalidData(format!(
                "Unknown ledger event type: {}",
                other
            ))),
        }
    }
}

/// One immutable entry in the unified ledger.
///
/// `balance_before` snapshots the wallet balance prior to the mutation, for
/// audit. `quantity` and `price` are populated for share trades only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    pub id: String,
    pub user_id: String,
    pub property_id: Option<String>,
    pub event_type: LedgerEventType,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub status: String,
    pub event_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

/// Input model for appending a ledger event
#[derive(Debug, Clone)]
pub struct NewLedgerEvent {
    pub user_id: String,
    pub property_id: Option<String>,
    pub event_type: LedgerEventType,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub amount: Decimal,
    pub balance_before: Decimal,
}

impl NewLedgerEvent {
    pub fn buy(
        user_id: &str,
        property_id: &str,
        quantity: Decimal,
        price: Decimal,
        amount: Decimal,
        balance_before: Decimal,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            property_id: Some(property_id.to_string()),
            event_type: LedgerEventType::Buy,
            quantity: Some(quantity),
            price: Some(price),
            amount,
            balance_before,
        }
    }

    pub fn sell(
        user_id: &str,
        property_id: &str,
        quantity: Decimal,
        price: Decimal,
        amount: Decimal,
        balance_before: Decimal,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            property_id: Some(property_id.to_string()),
            event_type: LedgerEventType::Sell,
            quantity: Some(quantity),
            price: Some(price),
            amount,
            balance_before,
        }
    }

    pub fn deposit(user_id: &str, amount: Decimal, balance_before: Decimal) -> Self {
        Self {
            user_id: user_id.to_string(),
            property_id: None,
            event_type: LedgerEventType::Deposit,
            quantity: None,
            price: None,
            amount,
            balance_before,
        }
    }

    pub fn withdraw(user_id: &str, amount: Decimal, balance_before: Decimal) -> Self {
        Self {
            user_id: user_id.to_string(),
            property_id: None,
            event_type: LedgerEventType::Withdraw,
            quantity: None,
            price: None,
            amount,
            balance_before,
        }
    }
}

/// Optional restrictions applied by history queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSearchFilter {
    pub property_id: Option<String>,
    pub event_types: Option<Vec<LedgerEventType>>,
    pub min_quantity: Option<Decimal>,
    pub min_amount: Option<Decimal>,
    pub min_price: Option<Decimal>,
}

/// Ledger event joined with the property title for display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEventView {
    #[serde(flatten)]
    pub event: LedgerEvent,
    pub property_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSearchResponseMeta {
    pub total_row_count: i64,
}

/// One page of ledger history plus the total match count for client-side
/// pagination controls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSearchResponse {
    pub data: Vec<LedgerEventView>,
    pub meta: LedgerSearchResponseMeta,
}

/// Database model for ledger entries
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::ledger_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LedgerEntryDB {
    pub id: String,
    pub user_id: String,
    pub property_id: Option<String>,
    pub event_type: String,
    pub quantity: Option<String>,
    pub price: Option<String>,
    pub amount: String,
    pub balance_before: String,
    pub status: String,
    pub event_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl TryFrom<LedgerEntryDB> for LedgerEvent {
    type Error = LedgerError;

    fn try_from(db: LedgerEntryDB) -> Result<Self> {
        Ok(Self {
            event_type: db.event_type.parse()?,
            id: db.id,
            user_id: db.user_id,
            property_id: db.property_id,
            quantity: db
                .quantity
                .as_deref()
                .map(|raw| parse_decimal(raw, "quantity"))
                .transpose()?,
            price: db
                .price
                .as_deref()
                .map(|raw| parse_decimal(raw, "price"))
                .transpose()?,
            amount: parse_decimal(&db.amount, "amount")?,
            balance_before: parse_decimal(&db.balance_before, "balance_before")?,
            status: db.status,
            event_date: db.event_date,
            created_at: db.created_at,
        })
    }
}

impl From<NewLedgerEvent> for LedgerEntryDB {
    fn from(domain: NewLedgerEvent) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: domain.user_id,
            property_id: domain.property_id,
            event_type: domain.event_type.as_str().to_string(),
            quantity: domain
                .quantity
                .map(|n| n.round_dp(DECIMAL_PRECISION).to_string()),
            price: domain
                .price
                .map(|n| n.round_dp(DECIMAL_PRECISION).to_string()),
            amount: domain.amount.round_dp(DECIMAL_PRECISION).to_string(),
            balance_before: domain
                .balance_before
                .round_dp(DECIMAL_PRECISION)
                .to_string(),
            status: TRANSACTION_STATUS_SUCCESS.to_string(),
            event_date: now,
            created_at: now,
        }
    }
}

fn parse_decimal(raw: &str, field: &str) -> Result<Decimal> {
    Decimal::from_str(raw)
        .map_err(|e| LedgerError::InvalidData(format!("Bad {} value '{}': {}", field, raw, e)))
}
