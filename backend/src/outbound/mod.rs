//! Outbound adapters implementing the driven ports.

pub mod auth;
pub mod notify;
pub mod persistence;
pub mod processor;
