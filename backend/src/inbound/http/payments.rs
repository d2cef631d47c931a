//! Payment HTTP handlers.
//!
//! ```text
//! POST /api/v1/payments/border   Open a border-fee charge
//! POST /api/v1/payments/webhook  Processor settlement callback
//! GET  /api/v1/payments/{id}     Payment status lookup
//! ```
//!
//! The webhook handler reads the raw body: the signature covers the exact
//! bytes the processor sent, so the payload must not pass through JSON
//! extraction first.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::{
    GetPaymentRequest, GetPaymentResponse, InitiateBorderPaymentRequest, ProcessorEventDelivery,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Header carrying the processor's signature over the webhook body.
pub const PROCESSOR_SIGNATURE_HEADER: &str = "Processor-Signature";

fn extract_signature(request: &HttpRequest) -> Result<String, Error> {
    request
        .headers()
        .get(PROCESSOR_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .ok_or_else(|| {
            Error::unauthorized(format!("missing {PROCESSOR_SIGNATURE_HEADER} header"))
        })
}

/// Open a border-fee charge for a parcel held at the border.
#[utoipa::path(
    post,
    path = "/api/v1/payments/border",
    request_body = InitiateBorderPaymentRequest,
    responses(
        (status = 201, description = "Charge opened", body = crate::domain::ports::InitiateBorderPaymentResponse),
        (status = 404, description = "Unknown tracking code", body = crate::domain::Error),
        (status = 409, description = "Border fee already paid", body = crate::domain::Error),
        (status = 412, description = "Parcel is not at the border", body = crate::domain::Error),
        (status = 502, description = "Payment processor failure", body = crate::domain::Error)
    ),
    tags = ["payments"],
    operation_id = "initiateBorderPayment"
)]
#[post("/payments/border")]
pub async fn initiate_border_payment(
    state: web::Data<HttpState>,
    payload: web::Json<InitiateBorderPaymentRequest>,
) -> ApiResult<HttpResponse> {
    let response = state
        .payments
        .initiate_border_payment(payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(response))
}

/// Processor settlement callback.
///
/// Always answers `{"received": true}` once the delivery verifies, including
/// for events the service does not act on; the processor only needs the ack.
#[utoipa::path(
    post,
    path = "/api/v1/payments/webhook",
    request_body(content = Vec<u8>, description = "Raw event payload"),
    responses(
        (status = 200, description = "Delivery acknowledged"),
        (status = 400, description = "Malformed payload", body = crate::domain::Error),
        (status = 401, description = "Signature rejected", body = crate::domain::Error)
    ),
    params(
        ("Processor-Signature" = String, Header, description = "Signature over the raw body")
    ),
    tags = ["payments"],
    operation_id = "processorWebhook"
)]
#[post("/payments/webhook")]
pub async fn processor_webhook(
    state: web::Data<HttpState>,
    request: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let signature = extract_signature(&request)?;
    state
        .payments
        .handle_processor_event(ProcessorEventDelivery {
            payload: body.to_vec(),
            signature,
        })
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "received": true })))
}

/// Payment status lookup.
#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}",
    responses(
        (status = 200, description = "Payment found", body = GetPaymentResponse),
        (status = 404, description = "Unknown payment", body = crate::domain::Error)
    ),
    params(
        ("id" = Uuid, Path, description = "Payment identifier")
    ),
    tags = ["payments"],
    operation_id = "getPayment"
)]
#[get("/payments/{id}")]
pub async fn get_payment(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<GetPaymentResponse>> {
    let response = state
        .payments_query
        .get_payment(GetPaymentRequest {
            payment_id: path.into_inner(),
        })
        .await?;
    Ok(web::Json(response))
}

#[cfg(test)]
#[path = "payments_tests.rs"]
mod tests;
