use thiserror::Error;

/// Custom error type for trading operations.
///
/// Every variant maps to a validation rejection detected before any write;
/// lower-layer faults surface through the module errors they originate from.
#[derive(Debug, Error)]
pub enum TradingError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Insufficient balance: {0}")]
    InsufficientFunds(String),
    #[error("Insufficient shares: {0}")]
    InsufficientInventory(String),
    #[error("Insufficient holdings: {0}")]
    InsufficientHoldings(String),
}

pub type Result<T> = std::result::Result<T, TradingError>;

impl TradingError {
    /// HTTP-style status code surfaced in the response envelope
    pub fn status_code(&self) -> u16 {
        match self {
            TradingError::InvalidAmount(_) => 400,
            TradingError::InsufficientFunds(_)
            | TradingError::InsufficientInventory(_)
            | TradingError::InsufficientHoldings(_) => 422,
        }
    }
}
