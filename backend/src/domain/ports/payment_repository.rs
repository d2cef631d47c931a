//! Port for payment persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::parcel::Parcel;
use crate::domain::payment::Payment;
use crate::domain::tracking::TrackingEvent;

/// Errors raised by payment repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentRepositoryError {
    /// Repository connection could not be established.
    #[error("payment repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("payment repository query failed: {message}")]
    Query { message: String },
}

impl PaymentRepositoryError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Everything that must land together when a border-fee payment settles:
/// the payment flips to completed, and the parcel clears the border with a
/// matching ledger entry. Adapters apply the whole set in one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderFeeClearance {
    pub payment_id: Uuid,
    pub completed_at: DateTime<Utc>,
    /// Full replacement for the payment's details blob.
    pub details: Value,
    /// The parcel, already mutated to its border-cleared state.
    pub parcel: Parcel,
    pub event: TrackingEvent,
}

/// Port for recording fee-collection attempts and their settlement.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Persist a freshly initiated payment.
    async fn create(&self, payment: &Payment) -> Result<(), PaymentRepositoryError>;

    /// Find a payment by internal id.
    async fn find_by_id(&self, payment_id: Uuid)
        -> Result<Option<Payment>, PaymentRepositoryError>;

    /// Find a payment by the processor's reference.
    async fn find_by_processor_ref(
        &self,
        processor_ref: &str,
    ) -> Result<Option<Payment>, PaymentRepositoryError>;

    /// Mark a payment failed.
    async fn mark_failed(&self, payment_id: Uuid) -> Result<(), PaymentRepositoryError>;

    /// Mark a non-border payment completed.
    async fn mark_completed(
        &self,
        payment_id: Uuid,
        completed_at: DateTime<Utc>,
        details: Value,
    ) -> Result<(), PaymentRepositoryError>;

    /// Settle a border-fee payment and clear the parcel, atomically.
    async fn complete_border_fee(
        &self,
        clearance: &BorderFeeClearance,
    ) -> Result<(), PaymentRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentRepository;

#[async_trait]
impl PaymentRepository for FixturePaymentRepository {
    async fn create(&self, _payment: &Payment) -> Result<(), PaymentRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _payment_id: Uuid,
    ) -> Result<Option<Payment>, PaymentRepositoryError> {
        Ok(None)
    }

    async fn find_by_processor_ref(
        &self,
        _processor_ref: &str,
    ) -> Result<Option<Payment>, PaymentRepositoryError> {
        Ok(None)
    }

    async fn mark_failed(&self, _payment_id: Uuid) -> Result<(), PaymentRepositoryError> {
        Ok(())
    }

    async fn mark_completed(
        &self,
        _payment_id: Uuid,
        _completed_at: DateTime<Utc>,
        _details: Value,
    ) -> Result<(), PaymentRepositoryError> {
        Ok(())
    }

    async fn complete_border_fee(
        &self,
        _clearance: &BorderFeeClearance,
    ) -> Result<(), PaymentRepositoryError> {
        Ok(())
    }
}
