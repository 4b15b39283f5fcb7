pub mod config;
pub mod http;
pub mod models;
pub mod notify;
pub mod processor;
pub mod store;
pub mod timestamp;
