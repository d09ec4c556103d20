use chrono::Utc;
use rand::Rng;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use crate::config::ConfirmationPolicy;
use crate::models::transaction::{TransactionStatus, TxState};

pub const MAX_DEMO_CONFIRMATIONS: u64 = 10;
const DEMO_BLOCK_BASE: u64 = 15_000_000;
const DEMO_BLOCK_SPAN: u64 = 1_000_000;
/// Hashes remembered by the monotonic policy before the oldest is forgotten.
pub const DEFAULT_TRACKED_HASHES: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Tracked {
    confirmations: u64,
    block_number: Option<u64>,
}

// Insertion-ordered so the oldest hash is evicted first.
#[derive(Debug, Default)]
struct Seen {
    counts: HashMap<String, Tracked>,
    order: VecDeque<String>,
}

/// Simulated confirmation counter behind the demo transaction-status check.
#[derive(Debug)]
pub struct ConfirmationTracker {
    policy: ConfirmationPolicy,
    capacity: usize,
    seen: Mutex<Seen>,
}

impl ConfirmationTracker {
    pub fn new(policy: ConfirmationPolicy) -> Self {
        ConfirmationTracker::with_capacity(policy, DEFAULT_TRACKED_HASHES)
    }

    pub fn with_capacity(policy: ConfirmationPolicy, capacity: usize) -> Self {
        ConfirmationTracker { policy, capacity: capacity.max(1), seen: Mutex::new(Seen::default()) }
    }

    /// Number of hashes currently remembered.
    pub fn tracked(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).counts.len()
    }

    /// Reports the status of `hash` for one poll.
    pub fn poll(&self, hash: &str) -> TransactionStatus {
        let mut rng = rand::thread_rng();
        let (confirmations, block_number) = match self.policy {
            ConfirmationPolicy::Random => {
                let confirmations = rng.gen_range(1..=MAX_DEMO_CONFIRMATIONS);
                let block = (TxState::for_confirmations(confirmations) == TxState::Confirmed)
                    .then(|| random_block(&mut rng));
                (confirmations, block)
            }
            ConfirmationPolicy::Monotonic => {
                let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
                let key = hash.to_lowercase();
                if !seen.counts.contains_key(&key) {
                    if seen.counts.len() >= self.capacity {
                        if let Some(oldest) = seen.order.pop_front() {
                            seen.counts.remove(&oldest);
                        }
                    }
                    seen.order.push_back(key.clone());
                }
                let tracked = seen
                    .counts
                    .entry(key)
                    .and_modify(|t| t.confirmations = (t.confirmations + 1).min(MAX_DEMO_CONFIRMATIONS))
                    .or_insert(Tracked { confirmations: 1, block_number: None });
                if tracked.block_number.is_none()
                    && TxState::for_confirmations(tracked.confirmations) == TxState::Confirmed
                {
                    tracked.block_number = Some(random_block(&mut rng)); // Fixed once reached
                }
                (tracked.confirmations, tracked.block_number)
            }
        };

        TransactionStatus {
            hash: hash.to_string(),
            status: TxState::for_confirmations(confirmations),
            confirmations,
            block_number,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

fn random_block<R: Rng>(rng: &mut R) -> u64 {
    DEMO_BLOCK_BASE + rng.gen_range(0..DEMO_BLOCK_SPAN)
}
