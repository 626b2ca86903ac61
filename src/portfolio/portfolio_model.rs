use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::properties::Candle;

/// One held property joined with reference data and its price history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPositionView {
    pub property_id: String,
    pub title: String,
    pub address: String,
    pub logo_url: Option<String>,
    pub current_price: Decimal,
    pub quantity: Decimal,
    pub avg_price: Decimal,
    pub investment_value: Decimal,
    pub current_value: Decimal,
    pub change_percent_24h: Decimal,
    pub candles: Vec<Candle>,
}

/// Aggregate wallet view: cash balance, per-position details and portfolio
/// totals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletView {
    pub balance: Decimal,
    pub portfolio_detail: Vec<PortfolioPositionView>,
    pub portfolio_balance: Decimal,
    pub investment_balance: Decimal,
}

/// Period returns for a single holding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentProgress {
    pub property_id: String,
    pub quantity: Decimal,
    pub current_value: Decimal,
    pub investment_value: Decimal,
    pub one_day_return: Decimal,
    pub one_day_return_percent: Decimal,
    pub total_return: Decimal,
    pub total_return_percent: Decimal,
}

/// Market view of a property, independent of any holding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyWalletValue {
    pub property_id: String,
    pub current_price: Decimal,
    pub available_shares: Option<Decimal>,
    pub change_24h: Decimal,
    pub change_percent_24h: Decimal,
    pub as_of: NaiveDateTime,
}
