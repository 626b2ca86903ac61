/// Ledger event status for completed operations (no partial/pending states)
pub const TRANSACTION_STATUS_SUCCESS: &str = "SUCCESS";

/// Event types recorded against the unified ledger
pub const EVENT_TYPE_BUY: &str = "BUY";
pub const EVENT_TYPE_SELL: &str = "SELL";
pub const EVENT_TYPE_DEPOSIT: &str = "DEPOSIT";
pub const EVENT_TYPE_WITHDRAW: &str = "WITHDRAW";

/// Property categories carried by the catalog
pub const CATEGORY_RESIDENTIAL: &str = "RESIDENTIAL";
pub const CATEGORY_COMMERCIAL: &str = "COMMERCIAL";
pub const CATEGORY_FARM: &str = "FARM";

/// Decimal precision for persisted monetary values
pub const DECIMAL_PRECISION: u32 = 6;

/// Default page size for ledger history queries
pub const DEFAULT_PAGE_SIZE: i64 = 20;
