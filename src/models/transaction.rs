use serde::{Serialize, Deserialize};

/// Number of confirmations after which a transaction is treated as final.
pub const CONFIRMATION_THRESHOLD: u64 = 6;

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TxState {
    Pending,
    Confirmed,
}

impl TxState {
    pub fn for_confirmations(confirmations: u64) -> Self {
        if confirmations >= CONFIRMATION_THRESHOLD {
            TxState::Confirmed
        } else {
            TxState::Pending
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatus {
    pub hash: String,
    pub status: TxState,
    pub confirmations: u64,
    pub block_number: Option<u64>, // Only present once confirmed
    pub timestamp: i64,            // Milliseconds since the Unix epoch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(TxState::for_confirmations(5), TxState::Pending);
        assert_eq!(TxState::for_confirmations(6), TxState::Confirmed);
        assert_eq!(TxState::for_confirmations(10), TxState::Confirmed);
    }

    #[test]
    fn pending_status_serializes_null_block() {
        let status = TransactionStatus {
            hash: "0x00".into(),
            status: TxState::Pending,
            confirmations: 2,
            block_number: None,
            timestamp: 0,
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["status"], "pending");
        assert!(value["blockNumber"].is_null());
    }
}
