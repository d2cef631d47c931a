//! Tests for payment services.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::parcel::{Dimensions, DimensionUnit, Parcel, ParcelIntake};
use crate::domain::ports::{
    FixturePaymentGateway, FixtureWebhookVerifier, MockParcelRepository, MockPaymentGateway,
    MockPaymentRepository, MockTrackingNotifier, MockWebhookVerifier, NoopTrackingNotifier,
    PaymentIntent,
};

const SAMPLE_CODE: &str = "CWY260828K4QZ71MB";

fn parcel_at_border() -> Parcel {
    let code = TrackingCode::parse(SAMPLE_CODE).expect("valid code");
    let mut parcel = Parcel::register(
        ParcelIntake {
            sender_name: "Ada Osei".to_owned(),
            sender_email: "ada@example.com".to_owned(),
            sender_phone: String::new(),
            recipient_name: "Bo Lindqvist".to_owned(),
            recipient_email: "bo@example.net".to_owned(),
            recipient_phone: String::new(),
            recipient_address: "1 Main St, Springfield".to_owned(),
            destination_country: "US".to_owned(),
            weight_kg: 5.0,
            dimensions: Dimensions {
                length: 30.0,
                width: 20.0,
                height: 15.0,
                unit: DimensionUnit::Cm,
            },
            user_id: None,
        },
        code,
        Utc::now(),
    )
    .expect("valid parcel");
    parcel.advance(
        "Border Checkpoint".to_owned(),
        ParcelStatus::AtBorder,
        None,
        Utc::now(),
    );
    parcel
}

fn pending_border_payment(parcel_id: Uuid) -> Payment {
    Payment::pending(
        parcel_id,
        "pi_123",
        PaymentKind::BorderFee,
        25.0,
        json!({ "email": "bo@example.net" }),
        Utc::now(),
    )
}

fn initiate_request() -> InitiateBorderPaymentRequest {
    InitiateBorderPaymentRequest {
        tracking_code: SAMPLE_CODE.to_owned(),
        payer_email: None,
    }
}

fn delivery() -> ProcessorEventDelivery {
    ProcessorEventDelivery {
        payload: br#"{"type":"payment_intent.succeeded"}"#.to_vec(),
        signature: "t=0,v1=unchecked".to_owned(),
    }
}

#[tokio::test]
async fn initiate_opens_intent_and_persists_pending_payment() {
    let parcel = parcel_at_border();
    let parcel_id = parcel.id;

    let mut parcel_repo = MockParcelRepository::new();
    parcel_repo
        .expect_find_by_tracking_code()
        .times(1)
        .return_once(move |_| Ok(Some(parcel)));
    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_create_payment_intent()
        .times(1)
        .withf(|request| {
            request.amount_minor == 2500
                && request.currency == "usd"
                && request.metadata.get("type").map(String::as_str) == Some("border_fee")
                && request.metadata.get("tracking_code").map(String::as_str) == Some(SAMPLE_CODE)
        })
        .return_once(|_| {
            Ok(PaymentIntent {
                processor_ref: "pi_123".to_owned(),
                client_token: "pi_123_secret".to_owned(),
            })
        });
    let mut payment_repo = MockPaymentRepository::new();
    payment_repo
        .expect_create()
        .times(1)
        .withf(move |payment| {
            payment.parcel_id == parcel_id
                && payment.kind == PaymentKind::BorderFee
                && payment.status == PaymentStatus::Pending
                && (payment.amount - 25.0).abs() < f64::EPSILON
        })
        .return_once(|_| Ok(()));

    let service = PaymentCommandService::new(
        Arc::new(payment_repo),
        Arc::new(parcel_repo),
        Arc::new(gateway),
        Arc::new(FixtureWebhookVerifier),
        Arc::new(NoopTrackingNotifier),
    );
    let response = service
        .initiate_border_payment(initiate_request())
        .await
        .expect("initiate succeeds");

    assert_eq!(response.tracking_code, SAMPLE_CODE);
    assert_eq!(response.processor_ref, "pi_123");
    assert_eq!(response.client_token, "pi_123_secret");
    assert!((response.amount - 25.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn initiate_rejects_already_paid_fee_as_conflict() {
    let mut parcel = parcel_at_border();
    parcel.clear_border(Utc::now());

    let mut parcel_repo = MockParcelRepository::new();
    parcel_repo
        .expect_find_by_tracking_code()
        .times(1)
        .return_once(move |_| Ok(Some(parcel)));
    let mut payment_repo = MockPaymentRepository::new();
    payment_repo.expect_create().times(0);

    let service = PaymentCommandService::new(
        Arc::new(payment_repo),
        Arc::new(parcel_repo),
        Arc::new(FixturePaymentGateway),
        Arc::new(FixtureWebhookVerifier),
        Arc::new(NoopTrackingNotifier),
    );
    let error = service
        .initiate_border_payment(initiate_request())
        .await
        .expect_err("already paid");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn initiate_requires_the_parcel_to_be_at_the_border() {
    let mut parcel = parcel_at_border();
    parcel.advance(
        "Hub".to_owned(),
        ParcelStatus::InTransit,
        None,
        Utc::now(),
    );

    let mut parcel_repo = MockParcelRepository::new();
    parcel_repo
        .expect_find_by_tracking_code()
        .times(1)
        .return_once(move |_| Ok(Some(parcel)));

    let service = PaymentCommandService::new(
        Arc::new(MockPaymentRepository::new()),
        Arc::new(parcel_repo),
        Arc::new(FixturePaymentGateway),
        Arc::new(FixtureWebhookVerifier),
        Arc::new(NoopTrackingNotifier),
    );
    let error = service
        .initiate_border_payment(initiate_request())
        .await
        .expect_err("not at border");

    assert_eq!(error.code(), ErrorCode::FailedPrecondition);
}

#[tokio::test]
async fn initiate_maps_gateway_failure_without_recording_a_payment() {
    let parcel = parcel_at_border();

    let mut parcel_repo = MockParcelRepository::new();
    parcel_repo
        .expect_find_by_tracking_code()
        .times(1)
        .return_once(move |_| Ok(Some(parcel)));
    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_create_payment_intent()
        .times(1)
        .return_once(|_| Err(PaymentGatewayError::connection("dns failure")));
    let mut payment_repo = MockPaymentRepository::new();
    payment_repo.expect_create().times(0);

    let service = PaymentCommandService::new(
        Arc::new(payment_repo),
        Arc::new(parcel_repo),
        Arc::new(gateway),
        Arc::new(FixtureWebhookVerifier),
        Arc::new(NoopTrackingNotifier),
    );
    let error = service
        .initiate_border_payment(initiate_request())
        .await
        .expect_err("gateway down");

    assert_eq!(error.code(), ErrorCode::UpstreamError);
}

#[tokio::test]
async fn webhook_rejects_bad_signatures_as_unauthorized() {
    let mut verifier = MockWebhookVerifier::new();
    verifier
        .expect_decode()
        .times(1)
        .return_once(|_, _| Err(WebhookError::bad_signature("digest mismatch")));
    let mut payment_repo = MockPaymentRepository::new();
    payment_repo.expect_find_by_processor_ref().times(0);

    let service = PaymentCommandService::new(
        Arc::new(payment_repo),
        Arc::new(MockParcelRepository::new()),
        Arc::new(FixturePaymentGateway),
        Arc::new(verifier),
        Arc::new(NoopTrackingNotifier),
    );
    let error = service
        .handle_processor_event(delivery())
        .await
        .expect_err("bad signature");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn succeeded_border_fee_clears_parcel_atomically_and_notifies() {
    let parcel = parcel_at_border();
    let parcel_id = parcel.id;
    let payment = pending_border_payment(parcel_id);
    let payment_id = payment.id;

    let mut verifier = MockWebhookVerifier::new();
    verifier.expect_decode().times(1).return_once(|_, _| {
        Ok(ProcessorEvent::PaymentSucceeded {
            processor_ref: "pi_123".to_owned(),
            card: Some(json!({ "brand": "visa", "last4": "4242" })),
        })
    });
    let mut payment_repo = MockPaymentRepository::new();
    payment_repo
        .expect_find_by_processor_ref()
        .times(1)
        .return_once(move |_| Ok(Some(payment)));
    payment_repo
        .expect_complete_border_fee()
        .times(1)
        .withf(move |clearance| {
            clearance.payment_id == payment_id
                && clearance.parcel.border_fee_paid
                && clearance.parcel.status == ParcelStatus::BorderCleared
                && clearance.event.status == ParcelStatus::BorderCleared
                && clearance.details["card"]["last4"] == "4242"
                && clearance.details["email"] == "bo@example.net"
        })
        .return_once(|_| Ok(()));
    let mut parcel_repo = MockParcelRepository::new();
    parcel_repo
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(parcel)));
    let mut notifier = MockTrackingNotifier::new();
    notifier.expect_notify().times(1).return_once(|_, _| ());

    let service = PaymentCommandService::new(
        Arc::new(payment_repo),
        Arc::new(parcel_repo),
        Arc::new(FixturePaymentGateway),
        Arc::new(verifier),
        Arc::new(notifier),
    );
    let outcome = service
        .handle_processor_event(delivery())
        .await
        .expect("settlement succeeds");

    assert_eq!(outcome, WebhookOutcome::BorderCleared);
}

#[tokio::test]
async fn succeeded_replay_is_ignored_without_side_effects() {
    let mut payment = pending_border_payment(Uuid::new_v4());
    payment.status = PaymentStatus::Completed;

    let mut verifier = MockWebhookVerifier::new();
    verifier.expect_decode().times(1).return_once(|_, _| {
        Ok(ProcessorEvent::PaymentSucceeded {
            processor_ref: "pi_123".to_owned(),
            card: None,
        })
    });
    let mut payment_repo = MockPaymentRepository::new();
    payment_repo
        .expect_find_by_processor_ref()
        .times(1)
        .return_once(move |_| Ok(Some(payment)));
    payment_repo.expect_complete_border_fee().times(0);
    payment_repo.expect_mark_completed().times(0);
    let mut parcel_repo = MockParcelRepository::new();
    parcel_repo.expect_find_by_id().times(0);

    let service = PaymentCommandService::new(
        Arc::new(payment_repo),
        Arc::new(parcel_repo),
        Arc::new(FixturePaymentGateway),
        Arc::new(verifier),
        Arc::new(NoopTrackingNotifier),
    );
    let outcome = service
        .handle_processor_event(delivery())
        .await
        .expect("replay is acknowledged");

    assert_eq!(outcome, WebhookOutcome::Ignored);
}

#[tokio::test]
async fn succeeded_for_unknown_reference_is_acknowledged() {
    let mut verifier = MockWebhookVerifier::new();
    verifier.expect_decode().times(1).return_once(|_, _| {
        Ok(ProcessorEvent::PaymentSucceeded {
            processor_ref: "pi_unknown".to_owned(),
            card: None,
        })
    });
    let mut payment_repo = MockPaymentRepository::new();
    payment_repo
        .expect_find_by_processor_ref()
        .times(1)
        .return_once(|_| Ok(None));

    let service = PaymentCommandService::new(
        Arc::new(payment_repo),
        Arc::new(MockParcelRepository::new()),
        Arc::new(FixturePaymentGateway),
        Arc::new(verifier),
        Arc::new(NoopTrackingNotifier),
    );
    let outcome = service
        .handle_processor_event(delivery())
        .await
        .expect("unknown reference is acknowledged");

    assert_eq!(outcome, WebhookOutcome::Ignored);
}

#[tokio::test]
async fn failed_event_marks_pending_payment_failed() {
    let payment = pending_border_payment(Uuid::new_v4());
    let payment_id = payment.id;

    let mut verifier = MockWebhookVerifier::new();
    verifier.expect_decode().times(1).return_once(|_, _| {
        Ok(ProcessorEvent::PaymentFailed {
            processor_ref: "pi_123".to_owned(),
        })
    });
    let mut payment_repo = MockPaymentRepository::new();
    payment_repo
        .expect_find_by_processor_ref()
        .times(1)
        .return_once(move |_| Ok(Some(payment)));
    payment_repo
        .expect_mark_failed()
        .times(1)
        .withf(move |id| *id == payment_id)
        .return_once(|_| Ok(()));

    let service = PaymentCommandService::new(
        Arc::new(payment_repo),
        Arc::new(MockParcelRepository::new()),
        Arc::new(FixturePaymentGateway),
        Arc::new(verifier),
        Arc::new(NoopTrackingNotifier),
    );
    let outcome = service
        .handle_processor_event(delivery())
        .await
        .expect("failure recorded");

    assert_eq!(outcome, WebhookOutcome::PaymentFailed);
}

#[tokio::test]
async fn unrecognised_events_are_acknowledged() {
    let mut verifier = MockWebhookVerifier::new();
    verifier.expect_decode().times(1).return_once(|_, _| {
        Ok(ProcessorEvent::Unrecognised {
            event_type: "charge.refund.updated".to_owned(),
        })
    });
    let mut payment_repo = MockPaymentRepository::new();
    payment_repo.expect_find_by_processor_ref().times(0);

    let service = PaymentCommandService::new(
        Arc::new(payment_repo),
        Arc::new(MockParcelRepository::new()),
        Arc::new(FixturePaymentGateway),
        Arc::new(verifier),
        Arc::new(NoopTrackingNotifier),
    );
    let outcome = service
        .handle_processor_event(delivery())
        .await
        .expect("acknowledged");

    assert_eq!(outcome, WebhookOutcome::Ignored);
}

#[tokio::test]
async fn get_payment_returns_not_found_when_missing() {
    let mut payment_repo = MockPaymentRepository::new();
    payment_repo
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(None));

    let service = PaymentQueryService::new(Arc::new(payment_repo));
    let error = service
        .get_payment(GetPaymentRequest {
            payment_id: Uuid::new_v4(),
        })
        .await
        .expect_err("not found");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn get_payment_projects_the_stored_row() {
    let payment = pending_border_payment(Uuid::new_v4());
    let payment_id = payment.id;

    let mut payment_repo = MockPaymentRepository::new();
    payment_repo
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(payment)));

    let service = PaymentQueryService::new(Arc::new(payment_repo));
    let response = service
        .get_payment(GetPaymentRequest {
            payment_id,
        })
        .await
        .expect("lookup succeeds");

    assert_eq!(response.payment.id, payment_id);
    assert_eq!(response.payment.status, PaymentStatus::Pending);
}
