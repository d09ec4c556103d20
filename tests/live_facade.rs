//! Facade behaviour on the live path, against a mock JSON-RPC provider.

mod common;

use bigdecimal::BigDecimal;
use ethers::abi::{encode, Token};
use ethers::providers::MockProvider;
use ethers::types::{Bytes, TransactionReceipt, U256, U64};
use std::str::FromStr;
use common::{live_state, tx_hash};
use energy_trading_gateway::models::outcome::ChainError;
use energy_trading_gateway::models::transaction::TxState;
use energy_trading_gateway::models::types::{Address, Hash};

fn node_account() -> Vec<Address> {
    vec![Address::repeat_byte(0x42)]
}

// MockProvider answers from the back of its queue, so responses are pushed
// in reverse call order.
fn push_in_call_order<T: serde::Serialize + Send + Sync>(mock: &MockProvider, responses: Vec<T>) {
    for response in responses.into_iter().rev() {
        mock.push::<T, _>(response).unwrap();
    }
}

fn mined_in(hash: &str, block: u64) -> TransactionReceipt {
    TransactionReceipt {
        transaction_hash: Hash::from_str(hash).unwrap(),
        block_number: Some(U64::from(block)),
        ..Default::default()
    }
}

fn trade_details(seller: Address, energy: u64, price_wei: u64, timestamp: u64) -> Bytes {
    encode(&[
        Token::Address(seller),
        Token::Uint(U256::from(energy)),
        Token::Uint(U256::from(price_wei)),
        Token::Uint(U256::from(timestamp)),
        Token::Bool(true),
    ])
    .into()
}

#[tokio::test]
async fn account_comes_from_the_node() {
    let (state, mock) = live_state();
    mock.push::<Vec<Address>, _>(node_account()).unwrap();

    let account = state.blockchain.get_account().await.unwrap();
    assert_eq!(account, Address::repeat_byte(0x42));
}

#[tokio::test]
async fn node_without_accounts_is_an_error() {
    let (state, mock) = live_state();
    mock.push::<Vec<Address>, _>(Vec::new()).unwrap();

    assert_eq!(state.blockchain.get_account().await, Err(ChainError::NoAccounts));
}

#[tokio::test]
async fn fulfilling_unknown_trade_is_a_failure_not_a_panic() {
    let (state, mock) = live_state();
    mock.push::<Vec<Address>, _>(node_account()).unwrap();

    // The details lookup has no response queued, as for a trade the contract rejects
    let outcome = state.blockchain.fulfill_energy_trade("999").await;
    assert!(!outcome.is_success());
    assert!(matches!(outcome.error(), Some(ChainError::Contract(_))));
}

#[tokio::test]
async fn fulfilling_non_numeric_trade_id_is_rejected() {
    let (state, mock) = live_state();
    mock.push::<Vec<Address>, _>(node_account()).unwrap();

    let outcome = state.blockchain.demo_fulfill_energy_trade("abc").await;
    assert_eq!(outcome.error(), Some(&ChainError::InvalidTradeId("abc".into())));
}

#[tokio::test]
async fn create_with_unreachable_node_fails_cleanly() {
    let (state, _mock) = live_state();

    let price = BigDecimal::from_str("0.1").unwrap();
    let outcome = state.blockchain.create_energy_trade(1000, &price).await;
    assert!(matches!(outcome.error(), Some(ChainError::Provider(_))));
}

#[tokio::test]
async fn reads_fall_back_to_defaults() {
    let (state, _mock) = live_state();

    assert!(state.blockchain.get_active_trades().await.is_empty());
    assert_eq!(state.blockchain.get_balance(None).await, "0");
    assert_eq!(state.blockchain.get_balance(Some(Address::repeat_byte(1))).await, "0");
}

#[tokio::test]
async fn demo_variants_delegate_when_demo_mode_is_off() {
    let (state, _mock) = live_state();

    assert!(!state.blockchain.demo_mode());
    assert!(state.blockchain.demo_get_account().await.is_err());
    assert!(state.blockchain.demo_get_active_trades().await.is_empty());

    let amount = BigDecimal::from(1);
    assert!(!state.blockchain.demo_deposit(&amount).await.is_success());
    assert!(!state.blockchain.demo_withdraw(&amount).await.is_success());
    assert_eq!(state.blockchain.transactions_submitted(), 0);
}

#[tokio::test]
async fn live_status_rejects_malformed_hash() {
    let (state, _mock) = live_state();

    let err = state.blockchain.demo_get_transaction_status("0x1234").await.unwrap_err();
    assert_eq!(err, ChainError::InvalidHash("0x1234".into()));
}

#[tokio::test]
async fn live_status_counts_confirmations_from_head() {
    let (state, mock) = live_state();
    let hash = tx_hash(0x5a);
    mock.push::<U64, _>(U64::from(105)).unwrap();
    mock.push::<TransactionReceipt, _>(mined_in(&hash, 100)).unwrap();

    let status = state.blockchain.get_transaction_status(&hash).await.unwrap();
    assert_eq!(status.hash, hash);
    assert_eq!(status.confirmations, 6);
    assert_eq!(status.status, TxState::Confirmed);
    assert_eq!(status.block_number, Some(100));
}

#[tokio::test]
async fn live_status_withholds_block_until_threshold() {
    let (state, mock) = live_state();
    let hash = tx_hash(0x5b);
    mock.push::<U64, _>(U64::from(102)).unwrap();
    mock.push::<TransactionReceipt, _>(mined_in(&hash, 100)).unwrap();

    let status = state.blockchain.get_transaction_status(&hash).await.unwrap();
    assert_eq!(status.confirmations, 3);
    assert_eq!(status.status, TxState::Pending);
    assert_eq!(status.block_number, None);
}

#[tokio::test]
async fn live_status_without_receipt_is_pending() {
    let (state, mock) = live_state();
    let hash = tx_hash(0x5c);
    mock.push::<Option<TransactionReceipt>, _>(None).unwrap();

    let status = state.blockchain.demo_get_transaction_status(&hash).await.unwrap();
    assert_eq!(status.confirmations, 0);
    assert_eq!(status.status, TxState::Pending);
    assert_eq!(status.block_number, None);
}

#[tokio::test]
async fn active_trades_are_read_from_the_contract() {
    let (state, mock) = live_state();
    let listing: Bytes = encode(&[Token::Array(vec![Token::Uint(U256::from(3u64)), Token::Uint(U256::from(7u64))])]).into();
    push_in_call_order(
        &mock,
        vec![
            listing,
            trade_details(Address::repeat_byte(0x11), 1500, 80_000_000_000_000_000, 1_700_000_000),
            trade_details(Address::repeat_byte(0x22), 250, 125_000_000_000_000_000, 0),
        ],
    );

    let trades = state.blockchain.get_active_trades().await;
    assert_eq!(trades.len(), 2);

    assert_eq!(trades[0].id, 3);
    assert_eq!(trades[0].seller, format!("0x{}", "11".repeat(20)));
    assert_eq!(trades[0].energy_amount, 1500);
    assert_eq!(trades[0].price, "0.08");
    assert_eq!(trades[0].timestamp, "2023-11-14T22:13:20.000Z");

    assert_eq!(trades[1].id, 7);
    assert_eq!(trades[1].seller, format!("0x{}", "22".repeat(20)));
    assert_eq!(trades[1].energy_amount, 250);
    assert_eq!(trades[1].price, "0.125");
    assert_eq!(trades[1].timestamp, "1970-01-01T00:00:00.000Z");
}
