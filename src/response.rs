use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::{Error, Result};

pub const RESPONSE_SUCCESS: &str = "success";
pub const RESPONSE_ERROR: &str = "error";

/// Uniform envelope emitted by every public operation. Callers branch on
/// `type`; failures carry a human-readable `message` inside `data` and an
/// HTTP-style status code. No fault crosses this boundary unhandled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub data: serde_json::Value,
    pub status_code: u16,
}

impl ResponseMessage {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self::success_with_status(data, 200)
    }

    pub fn success_with_status<T: Serialize>(data: T, status_code: u16) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self {
                message_type: RESPONSE_SUCCESS.to_string(),
                data: value,
                status_code,
            },
            Err(e) => Self::error(&Error::from(e)),
        }
    }

    pub fn error(error: &Error) -> Self {
        Self {
            message_type: RESPONSE_ERROR.to_string(),
            data: json!({ "message": error.to_string() }),
            status_code: error.status_code(),
        }
    }

    /// Converts a service result into the envelope
    pub fn from_result<T: Serialize>(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::error(&e),
        }
    }

    pub fn is_success(&self) -> bool {
        self.message_type == RESPONSE_SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityError;
    use crate::trading::TradingError;
    use crate::wallets::WalletError;

    #[test]
    fn success_envelope_carries_payload_and_status() {
        let response = ResponseMessage::success(json!({ "balance": 700 }));
        assert!(response.is_success());
        assert_eq!(response.status_code, 200);
        assert_eq!(response.data["balance"], 700);
    }

    #[test]
    fn error_envelope_maps_taxonomy_to_status_codes() {
        let cases: Vec<(Error, u16)> = vec![
            (
                WalletError::NotFound("User wallet not found".into()).into(),
                404,
            ),
            (
                TradingError::InvalidAmount("negative".into()).into(),
                400,
            ),
            (
                TradingError::InsufficientFunds("too poor".into()).into(),
                422,
            ),
            (
                IdentityError::Unauthenticated("bad token".into()).into(),
                401,
            ),
        ];

        for (error, expected_status) in cases {
            let response = ResponseMessage::error(&error);
            assert_eq!(response.message_type, RESPONSE_ERROR);
            assert_eq!(response.status_code, expected_status);
            assert!(response.data["message"].is_string());
        }
    }

    #[test]
    fn from_result_branches_on_outcome() {
        let ok: crate::Result<i32> = Ok(7);
        assert!(ResponseMessage::from_result(ok).is_success());

        let err: crate::Result<i32> =
            Err(TradingError::InsufficientHoldings("none held".into()).into());
        let response = ResponseMessage::from_result(err);
        assert!(!response.is_success());
        assert_eq!(response.status_code, 422);
    }
}
