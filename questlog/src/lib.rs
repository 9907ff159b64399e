pub mod api;
pub mod config;
pub mod error;
pub mod intelligence;
pub mod llm;
pub mod models;
pub mod notion;
pub mod services;
pub mod store;
