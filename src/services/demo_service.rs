use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use crate::models::outcome::{ChainError, ChainResult};
use crate::models::trade::Trade;
use crate::models::types::{hash_to_hex, Address, Hash, Wei};
use crate::units::format_base_units;

pub const MIN_DEMO_TRADES: usize = 2;
pub const MAX_DEMO_TRADES: usize = 6;
pub const MIN_DEMO_ENERGY_WH: u64 = 500;
pub const MAX_DEMO_ENERGY_WH: u64 = 10_500;
const DEMO_SELLER_PREFIX: &str = "0x1234567890abcdef1234567890abcdef123456";
const DAY_MS: i64 = 86_400_000;

/// Random 32-byte transaction hash, `0x` + 64 hex digits.
pub fn generate_transaction_hash<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bytes: [u8; 32] = rng.gen();
    hash_to_hex(&Hash::from(bytes))
}

/// Random trade identifier in [0, 1000).
pub fn generate_trade_id<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    rng.gen_range(0..1000)
}

/// Fresh list of 2 to 6 sell offers listed within the last 24 hours of `now`.
pub fn generate_active_trades<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Vec<Trade> {
    let count = rng.gen_range(MIN_DEMO_TRADES..=MAX_DEMO_TRADES);

    (0..count)
        .map(|i| {
            let age = ChronoDuration::milliseconds(rng.gen_range(0..DAY_MS));
            Trade {
                id: i as u64,
                seller: format!("{}{:02x}", DEMO_SELLER_PREFIX, i),
                energy_amount: rng.gen_range(MIN_DEMO_ENERGY_WH..MAX_DEMO_ENERGY_WH),
                price: format!("{:.4}", rng.gen_range(0.05..0.15)), // Per kWh
                timestamp: (now - age).to_rfc3339_opts(SecondsFormat::Millis, true),
            }
        })
        .collect()
}

/// In-memory balances backing deposit, withdraw and balance queries in demo mode.
#[derive(Debug, Default)]
pub struct DemoLedger {
    balances: Mutex<HashMap<Address, Wei>>,
}

impl DemoLedger {
    pub fn new() -> Self {
        DemoLedger::default()
    }

    pub fn balance(&self, address: &Address) -> Wei {
        let balances = self.balances.lock().unwrap_or_else(PoisonError::into_inner);
        balances.get(address).copied().unwrap_or_default()
    }

    pub fn deposit(&self, address: Address, amount: Wei) -> ChainResult<Wei> {
        let mut balances = self.balances.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = balances.entry(address).or_default();
        *entry = entry.checked_add(amount).ok_or(ChainError::Overflow)?;
        Ok(*entry)
    }

    pub fn withdraw(&self, address: Address, amount: Wei) -> ChainResult<Wei> {
        let mut balances = self.balances.lock().unwrap_or_else(PoisonError::into_inner);
        let available = balances.get(&address).copied().unwrap_or_default();
        if amount > available {
            return Err(ChainError::InsufficientBalance {
                requested: format_base_units(amount),
                available: format_base_units(available),
            });
        }
        let remaining = available - amount;
        balances.insert(address, remaining);
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn hash_is_prefixed_hex() {
        let mut rng = StdRng::seed_from_u64(7);
        let hash = generate_transaction_hash(&mut rng);
        assert_eq!(hash.len(), 66);
        assert!(hash.starts_with("0x"));
        assert!(hash[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn demo_sellers_are_distinct_valid_addresses() {
        let mut rng = StdRng::seed_from_u64(1);
        let trades = generate_active_trades(&mut rng, Utc::now());
        for (i, trade) in trades.iter().enumerate() {
            assert_eq!(trade.id, i as u64);
            assert_eq!(trade.seller.len(), 42);
            assert!(trade.seller.parse::<Address>().is_ok());
        }
    }

    #[test]
    fn timestamps_fall_within_last_day() {
        let mut rng = StdRng::seed_from_u64(99);
        let now = Utc::now();
        for trade in generate_active_trades(&mut rng, now) {
            let ts = DateTime::parse_from_rfc3339(&trade.timestamp).unwrap().with_timezone(&Utc);
            assert!(ts <= now);
            assert!(now - ts <= ChronoDuration::milliseconds(DAY_MS));
        }
    }

    #[test]
    fn ledger_tracks_deposits_and_withdrawals() {
        let ledger = DemoLedger::new();
        let who = Address::repeat_byte(1);
        ledger.deposit(who, Wei::from(10u64)).unwrap();
        assert_eq!(ledger.withdraw(who, Wei::from(4u64)).unwrap(), Wei::from(6u64));
        assert_eq!(ledger.balance(&who), Wei::from(6u64));
    }

    #[test]
    fn ledger_rejects_overdraw() {
        let ledger = DemoLedger::new();
        let who = Address::repeat_byte(2);
        let err = ledger.withdraw(who, Wei::from(1u64)).unwrap_err();
        assert!(matches!(err, ChainError::InsufficientBalance { .. }));
        assert_eq!(ledger.balance(&who), Wei::zero());
    }
}
