//! Port for authenticating and decoding processor webhook deliveries.

use serde_json::Value;

/// Errors raised while verifying a webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    /// Signature missing, malformed, stale, or not matching the payload.
    #[error("webhook signature rejected: {message}")]
    BadSignature { message: String },
    /// Payload verified but could not be parsed.
    #[error("webhook payload malformed: {message}")]
    MalformedPayload { message: String },
}

impl WebhookError {
    pub fn bad_signature(message: impl Into<String>) -> Self {
        Self::BadSignature {
            message: message.into(),
        }
    }

    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }
}

/// A verified processor event, reduced to what settlement needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorEvent {
    /// A charge settled. `card` carries the processor's card summary when
    /// present (brand, last4).
    PaymentSucceeded {
        processor_ref: String,
        card: Option<Value>,
    },
    /// A charge was declined or abandoned.
    PaymentFailed { processor_ref: String },
    /// A verified event of a type settlement does not act on.
    Unrecognised { event_type: String },
}

/// Port for checking a delivery's signature and decoding its event.
///
/// Verification is synchronous; it is pure computation over the raw body.
#[cfg_attr(test, mockall::automock)]
pub trait WebhookVerifier: Send + Sync {
    /// Verify `signature` over the raw `payload` and decode the event.
    fn decode(&self, payload: &[u8], signature: &str) -> Result<ProcessorEvent, WebhookError>;
}

/// Fixture verifier accepting everything as unrecognised.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureWebhookVerifier;

impl WebhookVerifier for FixtureWebhookVerifier {
    fn decode(&self, _payload: &[u8], _signature: &str) -> Result<ProcessorEvent, WebhookError> {
        Ok(ProcessorEvent::Unrecognised {
            event_type: "fixture".to_owned(),
        })
    }
}
