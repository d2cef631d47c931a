//! Port for the external card-payment processor.

use std::collections::BTreeMap;

use async_trait::async_trait;

/// Errors raised by payment gateway adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentGatewayError {
    /// The processor could not be reached.
    #[error("payment processor unreachable: {message}")]
    Connection { message: String },
    /// The processor answered with an error.
    #[error("payment processor rejected the request: {message}")]
    Rejected { message: String },
}

impl PaymentGatewayError {
    /// Helper for transport failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for processor-side rejections.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Request to open a payment intent with the processor.
///
/// `metadata` is echoed back verbatim on webhook events, which is how
/// settlement is correlated with the parcel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    /// Amount in the currency's minor units (cents).
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub metadata: BTreeMap<String, String>,
}

/// Processor handle for a freshly opened intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    /// Processor-assigned reference (`pi_...`).
    pub processor_ref: String,
    /// Client-side secret the payer's browser uses to confirm the charge.
    pub client_token: String,
}

/// Port for opening charges with the card processor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentGatewayError>;
}

/// Fixture gateway returning a canned intent.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentGateway;

#[async_trait]
impl PaymentGateway for FixturePaymentGateway {
    async fn create_payment_intent(
        &self,
        _request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        Ok(PaymentIntent {
            processor_ref: "pi_fixture".to_owned(),
            client_token: "pi_fixture_secret".to_owned(),
        })
    }
}
