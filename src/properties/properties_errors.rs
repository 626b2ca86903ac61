use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for property-reference operations
#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Missing area: {0}")]
    MissingArea(String),
    #[error("Insufficient shares: {0}")]
    InsufficientShares(String),
}

pub type Result<T> = std::result::Result<T, PropertyError>;

impl From<DieselError> for PropertyError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => PropertyError::NotFound("Record not found".to_string()),
            _ => PropertyError::DatabaseError(err.to_string()),
        }
    }
}
