//! Adapters for the external card-payment processor: the HTTP gateway that
//! opens payment intents and the verifier for signed webhook deliveries.

mod gateway;
mod webhook;

pub use gateway::HttpPaymentGateway;
pub use webhook::HmacWebhookVerifier;
