//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    FixtureParcelCommand, FixtureParcelQuery, FixturePaymentCommand, FixturePaymentQuery,
    FixtureUserCommand, ParcelCommand, ParcelQuery, PaymentCommand, PaymentQuery, UserCommand,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub parcels: Arc<dyn ParcelCommand>,
    pub parcels_query: Arc<dyn ParcelQuery>,
    pub payments: Arc<dyn PaymentCommand>,
    pub payments_query: Arc<dyn PaymentQuery>,
    pub users: Arc<dyn UserCommand>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            parcels: Arc::new(FixtureParcelCommand),
            parcels_query: Arc::new(FixtureParcelQuery),
            payments: Arc::new(FixturePaymentCommand),
            payments_query: Arc::new(FixturePaymentQuery),
            users: Arc::new(FixtureUserCommand),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub parcels: Arc<dyn ParcelCommand>,
    pub parcels_query: Arc<dyn ParcelQuery>,
    pub payments: Arc<dyn PaymentCommand>,
    pub payments_query: Arc<dyn PaymentQuery>,
    pub users: Arc<dyn UserCommand>,
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        Self {
            parcels: ports.parcels,
            parcels_query: ports.parcels_query,
            payments: ports.payments,
            payments_query: ports.payments_query,
            users: ports.users,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
