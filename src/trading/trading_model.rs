use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::wallets::WalletSnapshot;

/// Result of an executed buy or sell: the new transaction id plus the updated
/// wallet snapshot (internal row ids suppressed)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeReceipt {
    pub transaction_id: String,
    pub user_wallet: WalletSnapshot,
}

/// Result of a cash deposit or withdrawal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReceipt {
    pub transaction_id: String,
    pub balance: Decimal,
}
