// Translation Hub client - library root

pub mod config;
pub mod error;
pub mod http_client;
pub mod models;
pub mod services;
pub mod session;
