//! Driving port for payment mutations: opening border-fee charges and
//! settling them from processor webhooks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Error;

/// Request to open a border-fee charge for a parcel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitiateBorderPaymentRequest {
    pub tracking_code: String,
    /// Payer contact recorded in the payment's details blob. Defaults to the
    /// parcel's recipient email when absent.
    pub payer_email: Option<String>,
}

/// Response from opening a charge: what the payer's browser needs to confirm
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitiateBorderPaymentResponse {
    pub payment_id: Uuid,
    pub tracking_code: String,
    pub processor_ref: String,
    pub client_token: String,
    pub amount: f64,
    pub currency: String,
}

/// A raw webhook delivery: body bytes exactly as received plus the signature
/// header. The body must not be re-serialized before verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorEventDelivery {
    pub payload: Vec<u8>,
    pub signature: String,
}

/// What a verified webhook delivery did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    /// Border fee settled; the parcel cleared customs.
    BorderCleared,
    /// A non-border payment settled.
    PaymentCompleted,
    /// The charge failed.
    PaymentFailed,
    /// Verified but not acted on (unknown type, unknown reference, or a
    /// replay of an already-settled payment).
    Ignored,
}

/// Driving port for payment write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentCommand: Send + Sync {
    /// Opens a border-fee charge with the processor and records the pending
    /// payment.
    async fn initiate_border_payment(
        &self,
        request: InitiateBorderPaymentRequest,
    ) -> Result<InitiateBorderPaymentResponse, Error>;

    /// Verifies a webhook delivery and applies its settlement effects.
    ///
    /// Unknown event types and unknown processor references are acknowledged
    /// without effect; replays of settled payments are no-ops.
    async fn handle_processor_event(
        &self,
        delivery: ProcessorEventDelivery,
    ) -> Result<WebhookOutcome, Error>;
}

/// Fixture command implementation for tests that do not need a processor.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentCommand;

#[async_trait]
impl PaymentCommand for FixturePaymentCommand {
    async fn initiate_border_payment(
        &self,
        request: InitiateBorderPaymentRequest,
    ) -> Result<InitiateBorderPaymentResponse, Error> {
        Err(Error::not_found(format!(
            "parcel {} not found",
            request.tracking_code
        )))
    }

    async fn handle_processor_event(
        &self,
        _delivery: ProcessorEventDelivery,
    ) -> Result<WebhookOutcome, Error> {
        Ok(WebhookOutcome::Ignored)
    }
}
