//! Gateway connection management

mod client;

pub use client::GatewayClient;
