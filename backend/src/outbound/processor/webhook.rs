//! HMAC-SHA256 webhook verifier for processor event deliveries.
//!
//! The processor signs each delivery with a shared secret over
//! `"{timestamp}.{raw body}"` and sends the result in a
//! `t=<unix>,v1=<hex>` header. Verification recomputes the tag in constant
//! time and rejects stale timestamps to blunt replayed deliveries.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;

use crate::domain::ports::{ProcessorEvent, WebhookError, WebhookVerifier};

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_TOLERANCE_SECONDS: i64 = 300;

const EVENT_PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";
const EVENT_PAYMENT_FAILED: &str = "payment_intent.payment_failed";

/// Verifier holding the endpoint's shared signing secret.
pub struct HmacWebhookVerifier {
    secret: Vec<u8>,
    tolerance_seconds: i64,
}

impl HmacWebhookVerifier {
    /// Build a verifier with the default five minute replay tolerance.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_seconds: DEFAULT_TOLERANCE_SECONDS,
        }
    }

    /// Override the replay tolerance window.
    pub fn with_tolerance_seconds(mut self, tolerance_seconds: i64) -> Self {
        self.tolerance_seconds = tolerance_seconds;
        self
    }

    fn decode_at(
        &self,
        payload: &[u8],
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<ProcessorEvent, WebhookError> {
        let header = SignatureHeader::parse(signature)?;

        let age = (now.timestamp() - header.timestamp).abs();
        if age > self.tolerance_seconds {
            return Err(WebhookError::bad_signature("timestamp outside tolerance"));
        }

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| WebhookError::bad_signature("invalid signing secret"))?;
        mac.update(header.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.verify_slice(&header.tag)
            .map_err(|_| WebhookError::bad_signature("signature mismatch"))?;

        parse_event(payload)
    }
}

impl WebhookVerifier for HmacWebhookVerifier {
    fn decode(&self, payload: &[u8], signature: &str) -> Result<ProcessorEvent, WebhookError> {
        self.decode_at(payload, signature, Utc::now())
    }
}

/// Parsed `t=<unix>,v1=<hex>` signature header.
struct SignatureHeader {
    timestamp: i64,
    tag: Vec<u8>,
}

impl SignatureHeader {
    fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp = None;
        let mut tag = None;

        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => {
                    timestamp = Some(value.parse::<i64>().map_err(|_| {
                        WebhookError::bad_signature("non-numeric signature timestamp")
                    })?);
                }
                Some(("v1", value)) => {
                    tag = Some(hex::decode(value).map_err(|_| {
                        WebhookError::bad_signature("signature tag is not valid hex")
                    })?);
                }
                // Unknown scheme versions are ignored for forward compatibility.
                _ => {}
            }
        }

        match (timestamp, tag) {
            (Some(timestamp), Some(tag)) => Ok(Self { timestamp, tag }),
            _ => Err(WebhookError::bad_signature(
                "signature header missing t or v1 component",
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventDto {
    #[serde(rename = "type")]
    event_type: String,
    data: EventDataDto,
}

#[derive(Debug, Deserialize)]
struct EventDataDto {
    object: Value,
}

fn parse_event(payload: &[u8]) -> Result<ProcessorEvent, WebhookError> {
    let event: EventDto = serde_json::from_slice(payload)
        .map_err(|err| WebhookError::malformed_payload(format!("invalid event JSON: {err}")))?;

    match event.event_type.as_str() {
        EVENT_PAYMENT_SUCCEEDED => {
            let processor_ref = intent_ref(&event.data.object)?;
            let card = card_summary(&event.data.object);
            Ok(ProcessorEvent::PaymentSucceeded {
                processor_ref,
                card,
            })
        }
        EVENT_PAYMENT_FAILED => Ok(ProcessorEvent::PaymentFailed {
            processor_ref: intent_ref(&event.data.object)?,
        }),
        _ => Ok(ProcessorEvent::Unrecognised {
            event_type: event.event_type,
        }),
    }
}

fn intent_ref(object: &Value) -> Result<String, WebhookError> {
    object
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| WebhookError::malformed_payload("event object missing intent id"))
}

/// Pull the card summary (brand, last4) off the intent's first charge, when
/// the processor included one.
fn card_summary(object: &Value) -> Option<Value> {
    object
        .pointer("/charges/data/0/payment_method_details/card")
        .cloned()
}
