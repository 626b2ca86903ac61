use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::identity::IdentityError;
use crate::ledger::LedgerError;
use crate::portfolio::PortfolioError;
use crate::properties::PropertyError;
use crate::trading::TradingError;
use crate::wallets::WalletError;

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the wallet and trading core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Property error: {0}")]
    Property(#[from] PropertyError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Trading error: {0}")]
    Trading(#[from] TradingError),

    #[error("Portfolio error: {0}")]
    Portfolio(#[from] PortfolioError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(#[from] diesel::result::ConnectionError),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(#[from] r2d2::Error),

    #[error("Database query failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    #[error("Database writer unavailable: {0}")]
    WriterUnavailable(String),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

impl Error {
    /// HTTP-style status code surfaced in the response envelope
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Identity(IdentityError::Unauthenticated(_)) => 401,
            Error::Validation(_) => 400,
            Error::Trading(e) => e.status_code(),
            Error::Wallet(WalletError::NotFound(_)) => 404,
            Error::Wallet(WalletError::AlreadyExists(_)) => 409,
            Error::Property(PropertyError::NotFound(_)) => 404,
            Error::Property(PropertyError::InsufficientShares(_)) => 422,
            Error::Ledger(LedgerError::NotFound(_)) => 404,
            Error::Portfolio(PortfolioError::NotFound(_)) => 404,
            _ => 500,
        }
    }
}

// Implement From for DieselError to Error directly
impl From<DieselError> for Error {
    fn from(err: DieselError) -> Self {
        Error::Database(DatabaseError::QueryFailed(err))
    }
}

// Add From implementation for rust_decimal::Error
impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<r2d2::Error> for Error {
    fn from(e: r2d2::Error) -> Self {
        Error::Database(DatabaseError::PoolCreationFailed(e))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}
