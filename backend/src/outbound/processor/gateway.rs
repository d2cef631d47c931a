//! Reqwest-backed card-processor gateway adapter.
//!
//! This adapter owns transport details only: form serialisation of the intent
//! request, HTTP error mapping, and JSON decoding of the processor's reply.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::domain::ports::{
    PaymentGateway, PaymentGatewayError, PaymentIntent, PaymentIntentRequest,
};

const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
const PAYMENT_INTENTS_PATH: &str = "v1/payment_intents";

/// Gateway adapter that opens payment intents over the processor's HTTP API.
///
/// Requests are authenticated with the account's secret key as a bearer token
/// and encoded as form bodies, which is the processor's native wire format.
pub struct HttpPaymentGateway {
    client: Client,
    base_url: Url,
    secret_key: String,
}

impl HttpPaymentGateway {
    /// Build an adapter with the default thirty second request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, secret_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(
            base_url,
            secret_key,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        )
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(
        base_url: Url,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            secret_key: secret_key.into(),
        })
    }

    fn intents_url(&self) -> Result<Url, PaymentGatewayError> {
        self.base_url
            .join(PAYMENT_INTENTS_PATH)
            .map_err(|err| PaymentGatewayError::connection(format!("bad processor URL: {err}")))
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let form = intent_form(request);
        let response = self
            .client
            .post(self.intents_url()?)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_intent(body.as_ref())
    }
}

/// Flatten an intent request into the processor's form fields. Metadata
/// entries use the `metadata[key]` convention so they come back verbatim on
/// webhook events.
fn intent_form(request: &PaymentIntentRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_owned(), request.amount_minor.to_string()),
        ("currency".to_owned(), request.currency.clone()),
        ("description".to_owned(), request.description.clone()),
    ];
    for (key, value) in &request.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }
    form
}

#[derive(Debug, Deserialize)]
struct PaymentIntentDto {
    id: String,
    client_secret: String,
}

fn parse_intent(body: &[u8]) -> Result<PaymentIntent, PaymentGatewayError> {
    let decoded: PaymentIntentDto = serde_json::from_slice(body).map_err(|err| {
        PaymentGatewayError::rejected(format!("invalid processor JSON payload: {err}"))
    })?;
    Ok(PaymentIntent {
        processor_ref: decoded.id,
        client_token: decoded.client_secret,
    })
}

fn map_transport_error(error: reqwest::Error) -> PaymentGatewayError {
    PaymentGatewayError::connection(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentGatewayError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    if status.is_server_error() {
        PaymentGatewayError::connection(message)
    } else {
        PaymentGatewayError::rejected(message)
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
