use chrono::{DateTime, Local};
use crate::contract::WH_PER_KWH;

pub const EXPLORER_TX_URL: &str = "https://sepolia.etherscan.io/tx/";

/// `0x1234...abcd` style shortening for display.
pub fn abbreviate_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

/// Watt-hours as kWh with two decimals.
pub fn format_kwh(watt_hours: u64) -> String {
    format!("{:.2}", watt_hours as f64 / WH_PER_KWH as f64)
}

/// Whole watt-hours in `kwh` kilowatt-hours; negative or non-finite input gives 0.
pub fn kwh_to_wh(kwh: f64) -> u64 {
    if !kwh.is_finite() || kwh <= 0.0 {
        return 0;
    }
    (kwh * WH_PER_KWH as f64).floor() as u64
}

/// ISO-8601 timestamp rendered in local time; unparseable input is shown as-is.
pub fn format_date(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

pub fn explorer_url(hash: &str) -> String {
    format!("{}{}", EXPLORER_TX_URL, hash)
}
