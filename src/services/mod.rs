pub mod blockchain_service;
pub mod confirmation_service;
pub mod demo_service;
