use std::io::{self, BufRead, Write};
use tokio::runtime::{Handle, RuntimeFlavor};
use crate::models::trade::Trade;
use crate::models::transaction::TransactionStatus;
use crate::ui::format::{abbreviate_address, format_date, format_kwh};

/// Rendering seam for the trade desk. Implementations must be callable from
/// the confirmation monitor's background task.
pub trait View: Send + Sync {
    fn status_checking(&self);
    fn status_connected(&self, account: &str, demo_mode: bool);
    /// Connection failed; the user may retry with a fresh status check.
    fn status_failed(&self, error: &str);

    fn trades_loading(&self);
    fn trades_loaded(&self, trades: &[Trade]);
    /// Listing failed; the user may retry with a fresh load.
    fn trades_failed(&self, error: &str);

    /// Blocking notice.
    fn alert(&self, message: &str);
    /// Yes/no prompt.
    fn confirm(&self, message: &str) -> bool;

    fn set_submit_enabled(&self, enabled: bool);
    fn reset_form(&self);

    fn transaction_opened(&self, title: &str, hash: &str, explorer_url: &str);
    fn confirmation_progress(&self, confirmations: u64, required: u64);
    fn transaction_confirmed(&self, status: &TransactionStatus);
}

/// Plain-text view for terminals.
pub struct ConsoleView {
    assume_yes: bool,
}

impl ConsoleView {
    pub fn new(assume_yes: bool) -> Self {
        ConsoleView { assume_yes }
    }
}

impl View for ConsoleView {
    fn status_checking(&self) {
        println!("[status] Checking...");
    }

    fn status_connected(&self, account: &str, demo_mode: bool) {
        if demo_mode {
            println!("[status] Connected to Blockchain (Demo Mode)");
            println!("         Running in demonstration mode. No actual blockchain transactions will be made.");
        } else {
            println!("[status] Connected to Blockchain");
            println!("         Transactions will be recorded on the test network.");
        }
        println!("         Account: {}", account);
    }

    fn status_failed(&self, error: &str) {
        println!("[status] Blockchain Connection Failed");
        println!("         Error: {}", error);
        println!("         Run `status` again to retry.");
    }

    fn trades_loading(&self) {
        println!("[trades] Loading transactions...");
    }

    fn trades_loaded(&self, trades: &[Trade]) {
        if trades.is_empty() {
            println!("[trades] No transactions yet");
            return;
        }
        for trade in trades {
            println!(
                "  Trade #{:<4} {} kWh at {} ETH/kWh  seller {}  created {}",
                trade.id,
                format_kwh(trade.energy_amount),
                trade.price,
                abbreviate_address(&trade.seller),
                format_date(&trade.timestamp)
            );
        }
    }

    fn trades_failed(&self, error: &str) {
        println!("[trades] Error Loading Transactions: {}", error);
        println!("         Run `trades` again to retry.");
    }

    fn alert(&self, message: &str) {
        eprintln!("! {}", message);
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} [y/N] ", message);
        if io::stdout().flush().is_err() {
            return false;
        }
        match read_answer() {
            Some(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            None => false,
        }
    }

    fn set_submit_enabled(&self, enabled: bool) {
        if !enabled {
            println!("Processing...");
        }
    }

    fn reset_form(&self) {}

    fn transaction_opened(&self, title: &str, hash: &str, explorer_url: &str) {
        println!("== {} ==", title);
        println!("Transaction Hash: {}", hash);
        println!("Explorer: {}", explorer_url);
        println!("Waiting for confirmation...");
    }

    fn confirmation_progress(&self, confirmations: u64, required: u64) {
        println!("{} of {} confirmations", confirmations, required);
    }

    fn transaction_confirmed(&self, status: &TransactionStatus) {
        println!("Transaction confirmed!");
        println!("  Block Number:  {}", status.block_number.map_or_else(|| "-".to_string(), |b| b.to_string()));
        println!("  Confirmations: {}", status.confirmations);
    }
}

// Reading stdin blocks; on a multi-threaded runtime the worker is handed off
// first so a running confirmation monitor keeps polling.
fn read_answer() -> Option<String> {
    let read = || {
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer).ok().map(|_| answer)
    };
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => tokio::task::block_in_place(read),
        _ => read(),
    }
}
