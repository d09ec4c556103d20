use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::models::account::{Balance, ChainStatus};
use crate::models::outcome::ErrorBody;
use crate::models::trade::Trade;
use crate::models::transaction::TransactionStatus;
use crate::routes::API_SCOPE;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Failed to parse response: {0}")]
    Deserialization(String),
    #[error("{0}")]
    Server(String),
}

/// Result body of create/fulfill calls: `{success, tradeId?, transactionHash?}`
/// on success, `{success:false, error}` or a bare `{error}` otherwise.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    #[serde(default)]
    pub success: bool,
    pub trade_id: Option<u64>,
    pub transaction_hash: Option<String>,
    pub error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTradeBody {
    energy_amount: u64,
    price: f64,
}

/// HTTP client for the gateway's `/api/blockchain` routes.
pub struct ApiClient {
    http_client: HttpClient,
    base_url: String,
}

impl ApiClient {
    pub const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:4321";

    /// `base_url` is the gateway origin, e.g. `http://127.0.0.1:4321`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client: HttpClient::new(),
            base_url: format!("{}{}", base_url, API_SCOPE),
        }
    }

    /// GET /status. A `{connected:false}` body is returned as data, not as an error.
    pub async fn status(&self) -> Result<ChainStatus, DeskError> {
        self.get("/status").await
    }

    /// GET /trades
    pub async fn trades(&self) -> Result<Vec<Trade>, DeskError> {
        self.get("/trades").await
    }

    /// GET /balance?address=
    pub async fn balance(&self, address: Option<&str>) -> Result<Balance, DeskError> {
        let mut request = self.http_client.get(self.url("/balance"));
        if let Some(address) = address {
            request = request.query(&[("address", address)]);
        }
        Self::decode(Self::send(request).await?).await
    }

    /// POST /trades
    pub async fn create_trade(&self, energy_amount: u64, price: f64) -> Result<SubmitResponse, DeskError> {
        let body = CreateTradeBody { energy_amount, price };
        let request = self.http_client.post(self.url("/trades")).json(&body);
        Self::decode(Self::send(request).await?).await
    }

    /// POST /trades/{id}/fulfill
    pub async fn fulfill_trade(&self, trade_id: &str) -> Result<SubmitResponse, DeskError> {
        let request = self.http_client.post(self.url(&format!("/trades/{}/fulfill", trade_id)));
        Self::decode(Self::send(request).await?).await
    }

    /// GET /transaction/{hash}/status
    pub async fn transaction_status(&self, hash: &str) -> Result<TransactionStatus, DeskError> {
        self.get(&format!("/transaction/{}/status", hash)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, DeskError> {
        let request = self.http_client.get(self.url(path));
        Self::decode(Self::send(request).await?).await
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, DeskError> {
        request
            .send()
            .await
            .map_err(|e| DeskError::Request(e.to_string()))
    }

    // Bodies are decoded whatever the status code; a non-matching error body
    // becomes `DeskError::Server` with the gateway's message.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, DeskError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DeskError::Request(e.to_string()))?;

        match serde_json::from_str::<T>(&body) {
            Ok(value) => Ok(value),
            Err(e) if status.is_success() => Err(DeskError::Deserialization(e.to_string())),
            Err(_) => match serde_json::from_str::<ErrorBody>(&body) {
                Ok(err) => Err(DeskError::Server(err.error)),
                Err(_) => Err(DeskError::Server(format!("HTTP {}: {}", status.as_u16(), body))),
            },
        }
    }
}
