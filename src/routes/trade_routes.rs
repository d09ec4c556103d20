use actix_web::{web, HttpResponse};
use ethers::providers::Middleware;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::models::outcome::{ChainError, ErrorBody};
use crate::routes::{is_blank, parse_positive_decimal, parse_watt_hours, AppState};

pub const TRADE_FIELDS_REQUIRED: &str = "Energy amount and price are required";
pub const ENERGY_AMOUNT_INVALID: &str = "Energy amount must be a positive number of watt-hours";
pub const PRICE_INVALID: &str = "Price must be a positive decimal";

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateTradeRequest {
    pub energy_amount: Option<Value>, // Watt-hours, number or numeric string
    pub price: Option<Value>,         // Per kWh, number or numeric string
}

// Regenerated on every call in demo mode; never cached.
pub async fn get_trades<M: Middleware + 'static>(app_state: web::Data<AppState<M>>) -> HttpResponse {
    let trades = app_state.blockchain.demo_get_active_trades().await;
    HttpResponse::Ok().json(trades)
}

pub async fn create_trade<M: Middleware + 'static>(
    trade_data: web::Json<CreateTradeRequest>,
    app_state: web::Data<AppState<M>>,
) -> HttpResponse {
    if is_blank(trade_data.energy_amount.as_ref()) || is_blank(trade_data.price.as_ref()) {
        return HttpResponse::BadRequest().json(ErrorBody::new(TRADE_FIELDS_REQUIRED));
    }

    let energy_amount = match trade_data.energy_amount.as_ref().and_then(parse_watt_hours) {
        Some(amount) => amount,
        None => return HttpResponse::BadRequest().json(ErrorBody::new(ENERGY_AMOUNT_INVALID)),
    };
    let price = match trade_data.price.as_ref().and_then(parse_positive_decimal) {
        Some(price) => price,
        None => return HttpResponse::BadRequest().json(ErrorBody::new(PRICE_INVALID)),
    };

    let outcome = app_state.blockchain.demo_create_energy_trade(energy_amount, &price).await;
    HttpResponse::Ok().json(outcome)
}

pub async fn fulfill_trade<M: Middleware + 'static>(
    trade_id: web::Path<String>,
    app_state: web::Data<AppState<M>>,
) -> HttpResponse {
    let trade_id = trade_id.into_inner(); // Passed through unvalidated
    let outcome = app_state.blockchain.demo_fulfill_energy_trade(&trade_id).await;
    HttpResponse::Ok().json(outcome)
}

pub async fn get_transaction_status<M: Middleware + 'static>(
    hash: web::Path<String>,
    app_state: web::Data<AppState<M>>,
) -> HttpResponse {
    let hash = hash.into_inner();

    match app_state.blockchain.demo_get_transaction_status(&hash).await {
        Ok(status) => HttpResponse::Ok().json(status),
        Err(e @ ChainError::InvalidHash(_)) => HttpResponse::BadRequest().json(ErrorBody::new(e.to_string())),
        Err(e) => {
            log::error!("Error checking transaction status for {}: {}", hash, e);
            HttpResponse::InternalServerError().json(ErrorBody::new(e.to_string()))
        }
    }
}
