// HTTP Server modules
pub mod config;
pub mod fragment;
pub mod handlers;
pub mod models;
pub mod relay;
pub mod routes;

// Upstream model layer
pub mod llm;
