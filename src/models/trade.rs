use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sell,
    Buy,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Sell => write!(f, "sell"),
            Direction::Buy => write!(f, "buy"),
        }
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sell" => Ok(Direction::Sell),
            "buy" => Ok(Direction::Buy),
            _ => Err(()),
        }
    }
}

/// A sell offer for a quantity of energy, as listed by the contract.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: u64,
    pub seller: String,        // 0x-prefixed address
    pub energy_amount: u64,    // Watt-hours
    pub price: String,         // Display units per kWh, fixed-point decimal
    pub timestamp: String,     // ISO-8601, UTC
}

/// Payload of a successful trade creation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeCreated {
    pub trade_id: u64,
    pub transaction_hash: String,
}

/// Payload of any other successful value-moving call (fulfill, deposit, withdraw).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSubmitted {
    pub transaction_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("SELL".parse::<Direction>(), Ok(Direction::Sell));
        assert_eq!("buy".parse::<Direction>(), Ok(Direction::Buy));
        assert!("hold".parse::<Direction>().is_err());
    }

    #[test]
    fn trade_uses_camel_case_fields() {
        let trade = Trade {
            id: 3,
            seller: "0x01".into(),
            energy_amount: 1500,
            price: "0.0825".into(),
            timestamp: "2024-05-01T10:00:00.000Z".into(),
        };
        let value = serde_json::to_value(&trade).unwrap();
        assert_eq!(value["energyAmount"], json!(1500));
        assert_eq!(value["price"], json!("0.0825"));
    }
}
