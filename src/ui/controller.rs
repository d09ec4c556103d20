use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use crate::models::trade::Direction;
use crate::ui::client::{ApiClient, DeskError, SubmitResponse};
use crate::ui::format::{explorer_url, kwh_to_wh};
use crate::ui::monitor::{MonitorHandle, POLL_INTERVAL};
use crate::ui::view::View;

pub const BUY_NOT_SUPPORTED: &str =
    "Buy orders are not supported directly. Please purchase an existing sell order.";
pub const CONFIRM_PURCHASE: &str = "Are you sure you want to purchase this energy?";

/// Values entered in the trade form.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeForm {
    pub direction: Direction,
    pub amount_kwh: f64,
    pub price: f64, // Per kWh
}

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("buy orders are not supported")]
    BuyNotSupported,
    #[error("purchase was not confirmed")]
    Declined,
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Transport(#[from] DeskError),
}

/// Drives the trade desk: loads status and listings, submits sell orders,
/// buys listed trades and follows their confirmations.
pub struct TradeDeskController<V> {
    api: Arc<ApiClient>,
    view: Arc<V>,
    poll_interval: Duration,
}

impl<V: View + 'static> TradeDeskController<V> {
    pub fn new(api: ApiClient, view: Arc<V>) -> Self {
        TradeDeskController { api: Arc::new(api), view, poll_interval: POLL_INTERVAL }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Tab activation: status and listings are fetched side by side.
    pub async fn activate(&self) {
        tokio::join!(self.check_status(), self.load_trades());
    }

    pub async fn check_status(&self) {
        self.view.status_checking();

        match self.api.status().await {
            Ok(status) if status.connected => {
                let account = status.account.unwrap_or_default();
                self.view.status_connected(&account, status.demo_mode.unwrap_or(false));
            }
            Ok(status) => {
                let error = status.error.unwrap_or_else(|| "Could not connect to blockchain".to_string());
                self.view.status_failed(&error);
            }
            Err(e) => self.view.status_failed(&e.to_string()),
        }
    }

    pub async fn load_trades(&self) {
        self.view.trades_loading();

        match self.api.trades().await {
            Ok(trades) => self.view.trades_loaded(&trades),
            Err(e) => self.view.trades_failed(&e.to_string()),
        }
    }

    /// Submits a sell order. Buy orders are refused before any request is made.
    pub async fn submit_trade(&self, form: &TradeForm) -> Result<MonitorHandle, ActionError> {
        if form.direction == Direction::Buy {
            self.view.alert(BUY_NOT_SUPPORTED);
            return Err(ActionError::BuyNotSupported);
        }

        let energy_wh = kwh_to_wh(form.amount_kwh);

        self.view.set_submit_enabled(false);
        let result = self.api.create_trade(energy_wh, form.price).await;
        self.view.set_submit_enabled(true); // Re-enabled on every path

        let hash = self.accept(result, "Error creating trade")?;
        let monitor = self.show_transaction_details(&hash, "Trade Created");
        self.view.reset_form();
        self.load_trades().await;
        Ok(monitor)
    }

    /// Buys a listed trade after the user confirms.
    pub async fn buy(&self, trade_id: &str) -> Result<MonitorHandle, ActionError> {
        if !self.view.confirm(CONFIRM_PURCHASE) {
            return Err(ActionError::Declined);
        }

        let result = self.api.fulfill_trade(trade_id).await;
        let hash = self.accept(result, "Error purchasing energy")?;
        let monitor = self.show_transaction_details(&hash, "Energy Purchased");
        self.load_trades().await;
        Ok(monitor)
    }

    /// Opens the transaction details and starts following confirmations.
    /// Dropping or cancelling the returned handle stops the polling.
    pub fn show_transaction_details(&self, hash: &str, title: &str) -> MonitorHandle {
        self.view.transaction_opened(title, hash, &explorer_url(hash));
        self.monitor_transaction(hash)
    }

    pub fn monitor_transaction(&self, hash: &str) -> MonitorHandle {
        MonitorHandle::start(self.api.clone(), self.view.clone(), hash.to_string(), self.poll_interval)
    }

    // Alerts on every failure path and yields the transaction hash on success.
    fn accept(&self, result: Result<SubmitResponse, DeskError>, context: &str) -> Result<String, ActionError> {
        match result {
            Ok(SubmitResponse { success: true, transaction_hash: Some(hash), .. }) => Ok(hash),
            Ok(response) => {
                let error = response.error.unwrap_or_else(|| "missing transaction hash".to_string());
                self.view.alert(&format!("{}: {}", context, error));
                Err(ActionError::Rejected(error))
            }
            Err(e) => {
                self.view.alert(&format!("Error: {}", e));
                Err(ActionError::Transport(e))
            }
        }
    }
}
