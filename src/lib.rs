//! Energy trading gateway: a JSON API over the energy-trading contract with a
//! demo mode that simulates the chain, plus the trade desk client that drives it.
pub mod config;
pub mod contract;
pub mod models;
pub mod routes;
pub mod services;
pub mod ui;
pub mod units;
