//! Backend library modules.
//!
//! The crate follows a hexagonal layout: `domain` holds the aggregates,
//! services, and ports; `inbound` exposes the HTTP surface; `outbound` holds
//! the PostgreSQL, processor, and auth adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
