#![allow(dead_code)]

use actix_web::web;
use ethers::providers::{MockProvider, Provider};
use std::sync::Arc;
use energy_trading_gateway::config::{ConfirmationPolicy, GatewayConfig};
use energy_trading_gateway::routes::AppState;
use energy_trading_gateway::services::blockchain_service::BlockchainClient;

pub type MockState = AppState<Provider<MockProvider>>;

/// Demo-mode state; the mock provider is never consulted.
pub fn demo_state(policy: ConfirmationPolicy) -> (web::Data<MockState>, MockProvider) {
    let config = GatewayConfig { confirmation_policy: policy, ..GatewayConfig::demo() };
    state_for(&config)
}

/// Live-mode state backed by a mock provider. With nothing queued every
/// chain call fails.
pub fn live_state() -> (web::Data<MockState>, MockProvider) {
    let config = GatewayConfig { demo_mode: false, ..GatewayConfig::demo() };
    state_for(&config)
}

pub fn state_for(config: &GatewayConfig) -> (web::Data<MockState>, MockProvider) {
    let (provider, mock) = Provider::mocked();
    let client = BlockchainClient::new(Arc::new(provider), config);
    (web::Data::new(AppState::new(client)), mock)
}

pub fn is_tx_hash(value: &str) -> bool {
    energy_trading_gateway::models::types::is_hash_hex(value)
}

/// A well-formed transaction hash made of one repeated byte.
pub fn tx_hash(byte: u8) -> String {
    format!("0x{}", format!("{:02x}", byte).repeat(32))
}
