//! Payment domain services.
//!
//! The command service opens border-fee charges with the external processor
//! and settles them from verified webhook deliveries. Settlement of a border
//! fee is atomic across the payment, the parcel, and the tracking ledger:
//! the repository applies all three in one transaction.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};

use crate::domain::Error;
use crate::domain::parcel::{ParcelStatus, TrackingCode};
use crate::domain::payment::{Payment, PaymentKind, PaymentStatus, to_minor_units};
use crate::domain::ports::{
    BorderFeeClearance, GetPaymentRequest, GetPaymentResponse, InitiateBorderPaymentRequest,
    InitiateBorderPaymentResponse, ParcelRepository, ParcelRepositoryError, PaymentCommand,
    PaymentGateway, PaymentGatewayError, PaymentIntentRequest, PaymentPayload, PaymentQuery,
    PaymentRepository, PaymentRepositoryError, ProcessorEvent, ProcessorEventDelivery,
    TrackingNotifier, WebhookError, WebhookOutcome, WebhookVerifier,
};
use crate::domain::tracking::TrackingEvent;

/// Ledger description stamped when a border-fee payment settles.
const BORDER_CLEARED_DESCRIPTION: &str = "Border fee paid and cleared customs";

fn map_payment_repository_error(error: PaymentRepositoryError) -> Error {
    match error {
        PaymentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("payment repository unavailable: {message}"))
        }
        PaymentRepositoryError::Query { message } => {
            Error::internal(format!("payment repository error: {message}"))
        }
    }
}

fn map_parcel_repository_error(error: ParcelRepositoryError) -> Error {
    match error {
        ParcelRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("parcel repository unavailable: {message}"))
        }
        ParcelRepositoryError::Query { message }
        | ParcelRepositoryError::DuplicateTrackingCode { code: message } => {
            Error::internal(format!("parcel repository error: {message}"))
        }
    }
}

fn map_gateway_error(error: PaymentGatewayError) -> Error {
    Error::upstream(format!("payment processor failure: {error}"))
}

fn map_webhook_error(error: WebhookError) -> Error {
    match error {
        WebhookError::BadSignature { message } => {
            Error::unauthorized(format!("webhook rejected: {message}"))
        }
        WebhookError::MalformedPayload { message } => {
            Error::invalid_request(format!("webhook payload malformed: {message}"))
        }
    }
}

/// Merge the processor's card summary into a payment's details blob.
fn merge_card_details(existing: Value, card: Option<Value>) -> Value {
    let Some(card) = card else {
        return existing;
    };
    match existing {
        Value::Object(mut fields) => {
            fields.insert("card".to_owned(), card);
            Value::Object(fields)
        }
        _ => json!({ "card": card }),
    }
}

/// Payment service implementing command driving ports.
#[derive(Clone)]
pub struct PaymentCommandService<P, R, G, V, N> {
    payment_repo: Arc<P>,
    parcel_repo: Arc<R>,
    gateway: Arc<G>,
    verifier: Arc<V>,
    notifier: Arc<N>,
}

impl<P, R, G, V, N> PaymentCommandService<P, R, G, V, N> {
    /// Create a new command service from its driven ports.
    pub fn new(
        payment_repo: Arc<P>,
        parcel_repo: Arc<R>,
        gateway: Arc<G>,
        verifier: Arc<V>,
        notifier: Arc<N>,
    ) -> Self {
        Self {
            payment_repo,
            parcel_repo,
            gateway,
            verifier,
            notifier,
        }
    }
}

impl<P, R, G, V, N> PaymentCommandService<P, R, G, V, N>
where
    P: PaymentRepository,
    R: ParcelRepository,
    N: TrackingNotifier,
{
    async fn settle_succeeded(
        &self,
        processor_ref: &str,
        card: Option<Value>,
    ) -> Result<WebhookOutcome, Error> {
        let Some(payment) = self
            .payment_repo
            .find_by_processor_ref(processor_ref)
            .await
            .map_err(map_payment_repository_error)?
        else {
            tracing::warn!(processor_ref, "webhook for unknown payment reference");
            return Ok(WebhookOutcome::Ignored);
        };
        if payment.status == PaymentStatus::Completed {
            tracing::debug!(processor_ref, "replay of settled payment ignored");
            return Ok(WebhookOutcome::Ignored);
        }

        let now = Utc::now();
        let details = merge_card_details(payment.details.clone(), card);

        if payment.kind == PaymentKind::BorderFee {
            let mut parcel = self
                .parcel_repo
                .find_by_id(payment.parcel_id)
                .await
                .map_err(map_parcel_repository_error)?
                .ok_or_else(|| {
                    Error::internal(format!(
                        "payment {} references missing parcel {}",
                        payment.id, payment.parcel_id
                    ))
                })?;
            parcel.clear_border(now);
            let event = TrackingEvent::record(
                parcel.id,
                ParcelStatus::BorderCleared,
                parcel.current_location.clone(),
                parcel.coordinates,
                Some(BORDER_CLEARED_DESCRIPTION.to_owned()),
                now,
            );
            let clearance = BorderFeeClearance {
                payment_id: payment.id,
                completed_at: now,
                details,
                parcel: parcel.clone(),
                event: event.clone(),
            };
            self.payment_repo
                .complete_border_fee(&clearance)
                .await
                .map_err(map_payment_repository_error)?;

            tracing::info!(
                tracking_code = %parcel.tracking_code,
                processor_ref,
                "border fee settled, parcel cleared customs"
            );
            self.notifier.notify(&parcel, &event).await;
            return Ok(WebhookOutcome::BorderCleared);
        }

        self.payment_repo
            .mark_completed(payment.id, now, details)
            .await
            .map_err(map_payment_repository_error)?;
        tracing::info!(processor_ref, kind = %payment.kind, "payment settled");
        Ok(WebhookOutcome::PaymentCompleted)
    }

    async fn settle_failed(&self, processor_ref: &str) -> Result<WebhookOutcome, Error> {
        let Some(payment) = self
            .payment_repo
            .find_by_processor_ref(processor_ref)
            .await
            .map_err(map_payment_repository_error)?
        else {
            tracing::warn!(processor_ref, "webhook for unknown payment reference");
            return Ok(WebhookOutcome::Ignored);
        };
        if payment.status != PaymentStatus::Pending {
            tracing::debug!(processor_ref, status = %payment.status, "failure for settled payment ignored");
            return Ok(WebhookOutcome::Ignored);
        }

        self.payment_repo
            .mark_failed(payment.id)
            .await
            .map_err(map_payment_repository_error)?;
        tracing::info!(processor_ref, "payment failed");
        Ok(WebhookOutcome::PaymentFailed)
    }
}

#[async_trait]
impl<P, R, G, V, N> PaymentCommand for PaymentCommandService<P, R, G, V, N>
where
    P: PaymentRepository,
    R: ParcelRepository,
    G: PaymentGateway,
    V: WebhookVerifier,
    N: TrackingNotifier,
{
    async fn initiate_border_payment(
        &self,
        request: InitiateBorderPaymentRequest,
    ) -> Result<InitiateBorderPaymentResponse, Error> {
        let code = TrackingCode::parse(&request.tracking_code)
            .map_err(|err| Error::invalid_request(format!("invalid tracking code: {err}")))?;
        let parcel = self
            .parcel_repo
            .find_by_tracking_code(&code)
            .await
            .map_err(map_parcel_repository_error)?
            .ok_or_else(|| Error::not_found(format!("parcel {code} not found")))?;

        if parcel.border_fee_paid {
            return Err(Error::conflict(format!(
                "border fee for parcel {code} is already paid"
            )));
        }
        if parcel.status != ParcelStatus::AtBorder {
            return Err(Error::failed_precondition(format!(
                "parcel {code} is {}, border fee is only collectable at the border",
                parcel.status
            )));
        }

        let payer_email = request
            .payer_email
            .unwrap_or_else(|| parcel.recipient_email.clone());
        let mut metadata = BTreeMap::new();
        metadata.insert("parcel_id".to_owned(), parcel.id.to_string());
        metadata.insert("tracking_code".to_owned(), code.to_string());
        metadata.insert("type".to_owned(), PaymentKind::BorderFee.to_string());

        let intent = self
            .gateway
            .create_payment_intent(&PaymentIntentRequest {
                amount_minor: to_minor_units(parcel.border_fee),
                currency: crate::domain::payment::PAYMENT_CURRENCY.to_owned(),
                description: format!("Border fee for parcel {code}"),
                metadata,
            })
            .await
            .map_err(map_gateway_error)?;

        let payment = Payment::pending(
            parcel.id,
            intent.processor_ref.clone(),
            PaymentKind::BorderFee,
            parcel.border_fee,
            json!({ "email": payer_email }),
            Utc::now(),
        );
        self.payment_repo
            .create(&payment)
            .await
            .map_err(map_payment_repository_error)?;

        tracing::info!(
            tracking_code = %code,
            processor_ref = %intent.processor_ref,
            amount = payment.amount,
            "border fee charge opened"
        );

        Ok(InitiateBorderPaymentResponse {
            payment_id: payment.id,
            tracking_code: code.to_string(),
            processor_ref: intent.processor_ref,
            client_token: intent.client_token,
            amount: payment.amount,
            currency: payment.currency,
        })
    }

    async fn handle_processor_event(
        &self,
        delivery: ProcessorEventDelivery,
    ) -> Result<WebhookOutcome, Error> {
        let event = self
            .verifier
            .decode(&delivery.payload, &delivery.signature)
            .map_err(map_webhook_error)?;

        match event {
            ProcessorEvent::PaymentSucceeded {
                processor_ref,
                card,
            } => self.settle_succeeded(&processor_ref, card).await,
            ProcessorEvent::PaymentFailed { processor_ref } => {
                self.settle_failed(&processor_ref).await
            }
            ProcessorEvent::Unrecognised { event_type } => {
                tracing::debug!(event_type, "unhandled processor event acknowledged");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }
}

/// Payment service implementing query driving ports.
#[derive(Clone)]
pub struct PaymentQueryService<P> {
    payment_repo: Arc<P>,
}

impl<P> PaymentQueryService<P> {
    /// Create a new query service with the payment repository.
    pub fn new(payment_repo: Arc<P>) -> Self {
        Self { payment_repo }
    }
}

#[async_trait]
impl<P> PaymentQuery for PaymentQueryService<P>
where
    P: PaymentRepository,
{
    async fn get_payment(&self, request: GetPaymentRequest) -> Result<GetPaymentResponse, Error> {
        let payment = self
            .payment_repo
            .find_by_id(request.payment_id)
            .await
            .map_err(map_payment_repository_error)?
            .ok_or_else(|| Error::not_found(format!("payment {} not found", request.payment_id)))?;

        Ok(GetPaymentResponse {
            payment: PaymentPayload::from(payment),
        })
    }
}

#[cfg(test)]
#[path = "payment_service_tests.rs"]
mod tests;
