use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use crate::models::types::Address;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:4321";
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
pub const DEFAULT_DEMO_ACCOUNT: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";
pub const DEFAULT_DEMO_LATENCY_MS: u64 = 2000;
pub const DEFAULT_GAS_LIMIT: u64 = 3_000_000;
pub const DEFAULT_JSON_LIMIT: usize = 4096;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid { name: &'static str, value: String, reason: String },
}

/// How the demo transaction-status check reports confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationPolicy {
    /// Every poll draws a fresh count in [1, 10], independent of earlier polls.
    Random,
    /// Each poll of a hash advances its count by one.
    Monotonic,
}

impl FromStr for ConfirmationPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" => Ok(ConfirmationPolicy::Random),
            "monotonic" => Ok(ConfirmationPolicy::Monotonic),
            _ => Err(()),
        }
    }
}

/// Everything the gateway needs at startup. Built once in `main` and handed
/// to the facade and the route layer.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_address: String,
    pub demo_mode: bool,
    pub rpc_url: String,
    pub contract_address: Address,
    pub demo_account: Address,
    pub demo_latency: Duration,
    pub confirmation_policy: ConfirmationPolicy,
    pub gas_limit: u64,
    pub json_limit: usize,
}

impl GatewayConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults
    /// for unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(GatewayConfig {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            demo_mode: parse_var(&lookup, "DEMO_MODE", true, parse_bool)?,
            rpc_url: lookup("RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            contract_address: parse_var(&lookup, "CONTRACT_ADDRESS", default_address(DEFAULT_CONTRACT_ADDRESS), parse_address)?,
            demo_account: parse_var(&lookup, "DEMO_ACCOUNT", default_address(DEFAULT_DEMO_ACCOUNT), parse_address)?,
            demo_latency: Duration::from_millis(parse_var(&lookup, "DEMO_LATENCY_MS", DEFAULT_DEMO_LATENCY_MS, parse_number)?),
            confirmation_policy: parse_var(&lookup, "CONFIRMATION_POLICY", ConfirmationPolicy::Monotonic, |s| {
                s.parse::<ConfirmationPolicy>().map_err(|_| "expected `random` or `monotonic`".to_string())
            })?,
            gas_limit: parse_var(&lookup, "GAS_LIMIT", DEFAULT_GAS_LIMIT, parse_number)?,
            json_limit: parse_var(&lookup, "JSON_LIMIT", DEFAULT_JSON_LIMIT, parse_number)?,
        })
    }

    /// In-process demo configuration with no simulated latency.
    pub fn demo() -> Self {
        GatewayConfig {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            demo_mode: true,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract_address: default_address(DEFAULT_CONTRACT_ADDRESS),
            demo_account: default_address(DEFAULT_DEMO_ACCOUNT),
            demo_latency: Duration::ZERO,
            confirmation_policy: ConfirmationPolicy::Monotonic,
            gas_limit: DEFAULT_GAS_LIMIT,
            json_limit: DEFAULT_JSON_LIMIT,
        }
    }
}

fn parse_var<T, F, P>(lookup: &F, name: &'static str, default: T, parse: P) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Result<T, String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => parse(raw.trim()).map_err(|reason| ConfigError::Invalid { name, value: raw, reason }),
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected a boolean".to_string()),
    }
}

fn parse_number<T: FromStr>(value: &str) -> Result<T, String> {
    value.parse().map_err(|_| "expected a non-negative integer".to_string())
}

fn parse_address(value: &str) -> Result<Address, String> {
    Address::from_str(value).map_err(|e| e.to_string())
}

// Only called with the compile-time constants above.
fn default_address(value: &str) -> Address {
    Address::from_str(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = GatewayConfig::from_lookup(|_| None).unwrap();
        assert!(config.demo_mode);
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.demo_latency, Duration::from_millis(2000));
        assert_eq!(config.confirmation_policy, ConfirmationPolicy::Monotonic);
        assert_eq!(config.demo_account, Address::from_str(DEFAULT_DEMO_ACCOUNT).unwrap());
    }

    #[test]
    fn reads_overrides() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("DEMO_MODE", "false"),
            ("RPC_URL", "http://node:8545"),
            ("DEMO_LATENCY_MS", "0"),
            ("CONFIRMATION_POLICY", "Random"),
        ]))
        .unwrap();
        assert!(!config.demo_mode);
        assert_eq!(config.rpc_url, "http://node:8545");
        assert_eq!(config.demo_latency, Duration::ZERO);
        assert_eq!(config.confirmation_policy, ConfirmationPolicy::Random);
    }

    #[test]
    fn rejects_malformed_values() {
        let err = GatewayConfig::from_lookup(lookup_from(&[("CONTRACT_ADDRESS", "0x12")])).unwrap_err();
        assert!(err.to_string().contains("CONTRACT_ADDRESS"));

        assert!(GatewayConfig::from_lookup(lookup_from(&[("DEMO_MODE", "maybe")])).is_err());
        assert!(GatewayConfig::from_lookup(lookup_from(&[("GAS_LIMIT", "-5")])).is_err());
    }
}
