//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod parcels;
pub mod payments;
pub mod state;
pub mod tracking;
pub mod users;

pub use error::ApiResult;
