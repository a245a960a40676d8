//! Core abstractions for the upstream model layer

pub mod config;
pub mod error;
pub mod provider;
pub mod types;
