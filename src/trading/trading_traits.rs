use async_trait::async_trait;
use rust_decimal::Decimal;

use super::trading_model::{BalanceReceipt, TradeReceipt};
use crate::errors::Result;

/// Contract for the trading engine as consumed by embedding applications
#[async_trait]
pub trait TradingServiceTrait: Send + Sync {
    async fn buy(
        &self,
        credential: &str,
        property_id: &str,
        quantity: Decimal,
    ) -> Result<TradeReceipt>;

    async fn sell(
        &self,
        credential: &str,
        property_id: &str,
        quantity: Decimal,
    ) -> Result<TradeReceipt>;

    async fn add_balance(&self, credential: &str, amount: Decimal) -> Result<BalanceReceipt>;

    async fn withdraw_balance(&self, credential: &str, amount: Decimal) -> Result<BalanceReceipt>;
}
