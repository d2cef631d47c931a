//! Integration guardrails for the HTTP inbound adapter.
//!
//! These tests exercise real Actix handlers over real sockets with the real
//! domain services behind them, substituting fixture repositories for the
//! database. The webhook path runs the production HMAC verifier end to end,
//! so a signing drift between adapter and verifier fails here first.

use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpServer, web};
use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha256;

use backend::domain::ports::{
    FixtureParcelRepository, FixturePaymentGateway, FixturePaymentRepository, NoopTrackingNotifier,
};
use backend::domain::{ParcelCommandService, ParcelQueryService, PaymentCommandService};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::inbound::http::{parcels, payments, tracking};
use backend::outbound::processor::HmacWebhookVerifier;

const WEBHOOK_SECRET: &[u8] = b"whsec_guardrail_secret";

fn guardrail_state() -> HttpState {
    let parcel_repo = Arc::new(FixtureParcelRepository);
    let notifier = Arc::new(NoopTrackingNotifier);

    HttpState::new(HttpStatePorts {
        parcels: Arc::new(ParcelCommandService::new(
            Arc::clone(&parcel_repo),
            Arc::clone(&notifier),
        )),
        parcels_query: Arc::new(ParcelQueryService::new(Arc::clone(&parcel_repo))),
        payments: Arc::new(PaymentCommandService::new(
            Arc::new(FixturePaymentRepository),
            parcel_repo,
            Arc::new(FixturePaymentGateway),
            Arc::new(HmacWebhookVerifier::new(WEBHOOK_SECRET)),
            notifier,
        )),
        ..HttpStatePorts::default()
    })
}

fn spawn_server(state: HttpState) -> std::io::Result<(String, ServerHandle)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new().app_data(data.clone()).service(
            web::scope("/api/v1")
                .service(parcels::register_parcel)
                .service(tracking::track_parcel)
                .service(payments::initiate_border_payment)
                .service(payments::processor_webhook),
        )
    })
    .disable_signals()
    .workers(1)
    .listen(listener)?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}

fn sign(payload: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp();
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET).expect("secret accepted");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

fn registration_body() -> Value {
    json!({
        "senderName": "Ada Osei",
        "senderEmail": "ada@example.com",
        "recipientName": "Bo Lindqvist",
        "recipientEmail": "bo@example.net",
        "recipientAddress": "1 Main St, Springfield",
        "destinationCountry": "US",
        "weightKg": 5.0,
        "dimensions": { "length": 30.0, "width": 20.0, "height": 15.0, "unit": "cm" }
    })
}

#[actix_rt::test]
async fn registration_round_trips_through_real_services() {
    let (base_url, server) = spawn_server(guardrail_state()).expect("server starts");
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base_url}/api/v1/parcels"))
        .json(&registration_body())
        .send()
        .await
        .expect("registration request");

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.expect("registration body");
    let parcel = &body["parcel"];
    assert_eq!(parcel["status"], "pending");
    // 10 + 2 * 5kg, times the US multiplier.
    assert_eq!(parcel["shippingCost"], 24.0);
    assert_eq!(parcel["borderFee"], 25.0);
    let code = parcel["trackingCode"].as_str().expect("tracking code");
    assert!(code.starts_with("CWY"));
    assert_eq!(code.len(), 17);

    server.stop(true).await;
}

#[actix_rt::test]
async fn unknown_tracking_code_is_a_structured_404() {
    let (base_url, server) = spawn_server(guardrail_state()).expect("server starts");
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base_url}/api/v1/track/CWY260828K4QZ71MB"))
        .send()
        .await
        .expect("tracking request");

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.expect("error body");
    assert_eq!(body["code"], "not_found");

    server.stop(true).await;
}

#[actix_rt::test]
async fn signed_webhook_is_acknowledged() {
    let (base_url, server) = spawn_server(guardrail_state()).expect("server starts");
    let client = reqwest::Client::new();

    let payload = json!({
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": "pi_unknown_ref" } }
    })
    .to_string();

    let response = client
        .post(format!("{base_url}/api/v1/payments/webhook"))
        .header("Processor-Signature", sign(&payload))
        .body(payload)
        .send()
        .await
        .expect("webhook request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("ack body");
    assert_eq!(body["received"], true);

    server.stop(true).await;
}

#[actix_rt::test]
async fn forged_webhook_signature_is_rejected() {
    let (base_url, server) = spawn_server(guardrail_state()).expect("server starts");
    let client = reqwest::Client::new();

    let payload = json!({
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": "pi_unknown_ref" } }
    })
    .to_string();

    let response = client
        .post(format!("{base_url}/api/v1/payments/webhook"))
        .header("Processor-Signature", "t=0,v1=deadbeef")
        .body(payload)
        .send()
        .await
        .expect("webhook request");

    assert_eq!(response.status().as_u16(), 401);
    let body: Value = response.json().await.expect("error body");
    assert_eq!(body["code"], "unauthorized");

    server.stop(true).await;
}
