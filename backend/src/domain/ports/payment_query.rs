//! Driving port for payment read operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::payment::{Payment, PaymentKind, PaymentStatus};
use crate::domain::Error;

/// Serializable payment projection for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub id: Uuid,
    pub parcel_id: Uuid,
    pub processor_ref: String,
    pub kind: PaymentKind,
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    pub details: Value,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentPayload {
    fn from(value: Payment) -> Self {
        Self {
            id: value.id,
            parcel_id: value.parcel_id,
            processor_ref: value.processor_ref,
            kind: value.kind,
            amount: value.amount,
            currency: value.currency,
            status: value.status,
            details: value.details,
            completed_at: value.completed_at,
            created_at: value.created_at,
        }
    }
}

/// Request to fetch one payment by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPaymentRequest {
    pub payment_id: Uuid,
}

/// Response for a single payment lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetPaymentResponse {
    pub payment: PaymentPayload,
}

/// Driving port for payment read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentQuery: Send + Sync {
    /// Fetches one payment by identifier.
    async fn get_payment(&self, request: GetPaymentRequest) -> Result<GetPaymentResponse, Error>;
}

/// Fixture query implementation for tests that do not need persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentQuery;

#[async_trait]
impl PaymentQuery for FixturePaymentQuery {
    async fn get_payment(&self, request: GetPaymentRequest) -> Result<GetPaymentResponse, Error> {
        Err(Error::not_found(format!(
            "payment {} not found",
            request.payment_id
        )))
    }
}
