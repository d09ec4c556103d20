use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use crate::models::transaction::CONFIRMATION_THRESHOLD;
use crate::ui::client::ApiClient;
use crate::ui::view::View;

/// Default period between status polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Owns a running confirmation monitor. The task stops when the threshold is
/// reached, when [`MonitorHandle::cancel`] is called, or when the handle is
/// dropped; no status request is issued after cancellation.
pub struct MonitorHandle {
    hash: String,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Starts polling `hash` every `period`, the first poll one period from now.
    pub fn start<V: View + 'static>(api: Arc<ApiClient>, view: Arc<V>, hash: String, period: Duration) -> Self {
        let task = tokio::spawn(poll_until_confirmed(api, view, hash.clone(), period));
        MonitorHandle { hash, task: Some(task) }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn cancel(mut self) {
        self.abort();
    }

    /// Waits for the monitor to stop on its own. Returns `false` if it was
    /// already cancelled or the task failed. Dropping this future leaves the
    /// monitor running and owned by the handle.
    pub async fn finished(&mut self) -> bool {
        let done = match self.task.as_mut() {
            Some(task) => task.await.is_ok(),
            None => return false,
        };
        self.task = None;
        done
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            log::debug!("Stopping confirmation monitor for {}", self.hash);
            task.abort();
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

async fn poll_until_confirmed<V: View>(api: Arc<ApiClient>, view: Arc<V>, hash: String, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match api.transaction_status(&hash).await {
            Ok(status) => {
                view.confirmation_progress(status.confirmations, CONFIRMATION_THRESHOLD);
                if status.confirmations >= CONFIRMATION_THRESHOLD {
                    view.transaction_confirmed(&status);
                    return;
                }
            }
            // Keep polling; the next tick retries
            Err(e) => log::warn!("Error checking transaction status for {}: {}", hash, e),
        }
    }
}
