pub mod config;
pub mod handlers;
pub mod models;
pub mod payments;
pub mod pricing;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;
pub mod waitlist;
