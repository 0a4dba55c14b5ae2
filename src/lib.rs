pub mod types;
pub mod config;
pub mod sanitize;
pub mod data;
pub mod vocabulary;
pub mod filter;
pub mod render;
pub mod query;
pub mod controller;
pub mod server;
