//! Client side of the gateway: the trade desk that lists offers, submits sell
//! orders and follows transaction confirmations.
pub mod client;
pub mod controller;
pub mod format;
pub mod monitor;
pub mod view;
