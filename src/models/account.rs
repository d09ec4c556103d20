use serde::{Serialize, Deserialize};

/// Connectivity report for the status route.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChainStatus {
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChainStatus {
    pub fn connected(account: String, demo_mode: bool) -> Self {
        ChainStatus { connected: true, account: Some(account), demo_mode: Some(demo_mode), error: None }
    }

    pub fn disconnected(error: String) -> Self {
        ChainStatus { connected: false, account: None, demo_mode: None, error: Some(error) }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Balance {
    pub balance: String, // Display units, normalized decimal
}
