pub mod account;
pub mod outcome;
pub mod trade;
pub mod transaction;
pub mod types;
