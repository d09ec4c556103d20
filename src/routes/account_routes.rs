use actix_web::{web, HttpResponse};
use ethers::providers::Middleware;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use crate::models::account::{Balance, ChainStatus};
use crate::models::outcome::ErrorBody;
use crate::models::types::{address_to_hex, Address};
use crate::routes::{is_blank, parse_positive_decimal, AppState};

pub const AMOUNT_REQUIRED: &str = "Amount is required";
pub const AMOUNT_INVALID: &str = "Amount must be a positive decimal";
pub const INVALID_ADDRESS: &str = "Invalid Ethereum address";

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct BalanceQuery {
    pub address: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AmountRequest {
    pub amount: Option<Value>,
}

pub async fn get_status<M: Middleware + 'static>(app_state: web::Data<AppState<M>>) -> HttpResponse {
    let blockchain = &app_state.blockchain;

    match blockchain.demo_get_account().await {
        Ok(account) => HttpResponse::Ok().json(ChainStatus::connected(address_to_hex(&account), blockchain.demo_mode())),
        Err(e) => HttpResponse::InternalServerError().json(ChainStatus::disconnected(e.to_string())),
    }
}

pub async fn get_balance<M: Middleware + 'static>(
    query: web::Query<BalanceQuery>,
    app_state: web::Data<AppState<M>>,
) -> HttpResponse {
    // Falls back to the active account when no address is given
    let address = match query.address.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        Some(raw) => match Address::from_str(raw) {
            Ok(address) => Some(address),
            Err(_) => return HttpResponse::BadRequest().json(ErrorBody::new(INVALID_ADDRESS)),
        },
        None => None,
    };

    let balance = app_state.blockchain.demo_get_balance(address).await;
    HttpResponse::Ok().json(Balance { balance })
}

pub async fn deposit<M: Middleware + 'static>(
    request: web::Json<AmountRequest>,
    app_state: web::Data<AppState<M>>,
) -> HttpResponse {
    let amount = match validate_amount(&request) {
        Ok(amount) => amount,
        Err(response) => return response,
    };
    HttpResponse::Ok().json(app_state.blockchain.demo_deposit(&amount).await)
}

pub async fn withdraw<M: Middleware + 'static>(
    request: web::Json<AmountRequest>,
    app_state: web::Data<AppState<M>>,
) -> HttpResponse {
    let amount = match validate_amount(&request) {
        Ok(amount) => amount,
        Err(response) => return response,
    };
    HttpResponse::Ok().json(app_state.blockchain.demo_withdraw(&amount).await)
}

fn validate_amount(request: &AmountRequest) -> Result<bigdecimal::BigDecimal, HttpResponse> {
    if is_blank(request.amount.as_ref()) {
        return Err(HttpResponse::BadRequest().json(ErrorBody::new(AMOUNT_REQUIRED)));
    }
    request
        .amount
        .as_ref()
        .and_then(parse_positive_decimal)
        .ok_or_else(|| HttpResponse::BadRequest().json(ErrorBody::new(AMOUNT_INVALID)))
}
