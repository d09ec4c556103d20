use actix_web::{error, web, HttpResponse};
use bigdecimal::{BigDecimal, Signed};
use ethers::providers::{Http, Middleware, Provider};
use serde_json::Value;
use std::str::FromStr;
use crate::config::{ConfigError, GatewayConfig};
use crate::models::outcome::ErrorBody;
use crate::services::blockchain_service::BlockchainClient;
use crate::units::{fits_base_units, parse_decimal};

pub mod account_routes;
pub mod trade_routes;

pub const API_SCOPE: &str = "/api/blockchain";

/// Shared by every request for the life of the process.
pub struct AppState<M> {
    pub blockchain: BlockchainClient<M>,
}

impl<M: Middleware + 'static> AppState<M> {
    pub fn new(blockchain: BlockchainClient<M>) -> Self {
        AppState { blockchain }
    }
}

pub fn initialize_app_state(config: &GatewayConfig) -> Result<AppState<Provider<Http>>, ConfigError> {
    Ok(AppState::new(BlockchainClient::connect(config)?))
}

/// Registers every gateway route under [`API_SCOPE`].
pub fn configure<M: Middleware + 'static>(json_limit: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(json_config(json_limit)).service(
            web::scope(API_SCOPE)
                .route("/status", web::get().to(account_routes::get_status::<M>))
                .route("/balance", web::get().to(account_routes::get_balance::<M>))
                .route("/deposit", web::post().to(account_routes::deposit::<M>))
                .route("/withdraw", web::post().to(account_routes::withdraw::<M>))
                .route("/trades", web::get().to(trade_routes::get_trades::<M>))
                .route("/trades", web::post().to(trade_routes::create_trade::<M>))
                .route("/trades/{id}/fulfill", web::post().to(trade_routes::fulfill_trade::<M>))
                .route("/transaction/{hash}/status", web::get().to(trade_routes::get_transaction_status::<M>)),
        );
    }
}

// Malformed bodies get the same {error} shape as validation failures.
fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default().limit(limit).error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ErrorBody::new(err.to_string()));
        error::InternalError::from_response(err, response).into()
    })
}

/// True for the values a loosely-typed client treats as "not provided".
pub(crate) fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f == 0.0),
        Some(_) => false,
    }
}

/// Strictly positive decimal from a JSON number or numeric string, limited
/// to what a wei amount can hold.
pub(crate) fn parse_positive_decimal(value: &Value) -> Option<BigDecimal> {
    let decimal = match value {
        Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok()?,
        Value::String(s) => parse_decimal(s).ok()?,
        _ => return None,
    };
    (decimal.is_positive() && fits_base_units(&decimal)).then_some(decimal)
}

/// Whole watt-hours from a JSON number or numeric string; fractions are truncated.
pub(crate) fn parse_watt_hours(value: &Value) -> Option<u64> {
    let amount = match value {
        Value::Number(n) => match n.as_u64() {
            Some(whole) => whole,
            None => truncate(n.as_f64()?)?,
        },
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<u64>() {
                Ok(whole) => whole,
                Err(_) => truncate(s.parse::<f64>().ok()?)?,
            }
        }
        _ => return None,
    };
    (amount > 0).then_some(amount)
}

fn truncate(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0 && value < u64::MAX as f64).then(|| value.trunc() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_values() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&json!(null))));
        assert!(is_blank(Some(&json!(0))));
        assert!(is_blank(Some(&json!(""))));
        assert!(!is_blank(Some(&json!(0.1))));
        assert!(!is_blank(Some(&json!("abc"))));
    }

    #[test]
    fn watt_hours_accept_numbers_and_strings() {
        assert_eq!(parse_watt_hours(&json!(1500)), Some(1500));
        assert_eq!(parse_watt_hours(&json!(1500.9)), Some(1500));
        assert_eq!(parse_watt_hours(&json!("2500")), Some(2500));
        assert_eq!(parse_watt_hours(&json!("12.7")), Some(12));
        assert_eq!(parse_watt_hours(&json!(-4)), None);
        assert_eq!(parse_watt_hours(&json!(0.4)), None);
        assert_eq!(parse_watt_hours(&json!("lots")), None);
    }

    #[test]
    fn decimals_keep_their_digits() {
        assert_eq!(parse_positive_decimal(&json!(0.1)).unwrap().to_string(), "0.1");
        assert_eq!(parse_positive_decimal(&json!("0.0825")).unwrap().to_string(), "0.0825");
        assert!(parse_positive_decimal(&json!(-1)).is_none());
        assert!(parse_positive_decimal(&json!([1])).is_none());
    }

    #[test]
    fn decimals_outside_wei_range_are_refused() {
        assert!(parse_positive_decimal(&json!("1e20000000")).is_none());
        assert!(parse_positive_decimal(&json!("1e-2000000")).is_none());
        assert!(parse_positive_decimal(&json!("1e-9223372036854775808")).is_none());
        assert!(parse_positive_decimal(&json!("1e-18")).is_some());
    }
}
