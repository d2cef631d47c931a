//! Inbound adapters translating external protocols to domain ports.

pub mod http;
