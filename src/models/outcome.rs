use serde::ser::{Serialize, Serializer};
use serde::Deserialize;
use thiserror::Error;

/// Reasons a chain operation can fail. Every variant ends up in the `error`
/// field of a failed [`Outcome`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    #[error("No accounts available on the connected node")]
    NoAccounts,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid trade id: {0}")]
    InvalidTradeId(String),
    #[error("Invalid transaction hash: {0}")]
    InvalidHash(String),
    #[error("Transaction receipt did not contain a TradeCreated event")]
    MissingEvent,
    #[error("Transaction was dropped before it was mined")]
    Dropped,
    #[error("Value does not fit in 256 bits")]
    Overflow,
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: String, available: String },
    #[error("{0}")]
    Contract(String),
    #[error("{0}")]
    Provider(String),
}

pub type ChainResult<T> = Result<T, ChainError>;

/// Success or failure of a facade operation. Failures never propagate as
/// errors; callers get the reason as data and must handle both branches.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(ChainError),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(data) => Some(data),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ChainError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(e) => Some(e),
        }
    }
}

impl<T> From<ChainResult<T>> for Outcome<T> {
    fn from(result: ChainResult<T>) -> Self {
        match result {
            Ok(data) => Outcome::Success(data),
            Err(e) => Outcome::Failure(e),
        }
    }
}

#[derive(serde::Serialize)]
struct SuccessBody<'a, T> {
    success: bool,
    #[serde(flatten)]
    data: &'a T,
}

#[derive(serde::Serialize)]
struct FailureBody {
    success: bool,
    error: String,
}

// Wire shape: {"success":true, ...data} or {"success":false, "error":"..."}
impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Success(data) => SuccessBody { success: true, data }.serialize(serializer),
            Outcome::Failure(e) => FailureBody { success: false, error: e.to_string() }.serialize(serializer),
        }
    }
}

/// Body returned by the gateway for validation and transport failures.
#[derive(serde::Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorBody { error: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trade::TransactionSubmitted;
    use serde_json::json;

    #[test]
    fn success_flattens_payload_next_to_flag() {
        let outcome = Outcome::Success(TransactionSubmitted {
            transaction_hash: "0xabc".to_string(),
        });
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value, json!({ "success": true, "transactionHash": "0xabc" }));
    }

    #[test]
    fn failure_carries_error_message() {
        let outcome: Outcome<TransactionSubmitted> = Outcome::Failure(ChainError::InvalidTradeId("abc".into()));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value, json!({ "success": false, "error": "Invalid trade id: abc" }));
    }

    #[test]
    fn converts_from_result() {
        let outcome: Outcome<u8> = Err(ChainError::NoAccounts).into();
        assert!(!outcome.is_success());
        assert_eq!(outcome.error(), Some(&ChainError::NoAccounts));
    }
}
