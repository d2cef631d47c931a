//! Tests for parcel services.

use std::sync::Arc;

use chrono::Utc;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::parcel::{Dimensions, DimensionUnit, ParcelIntake};
use crate::domain::ports::{MockParcelRepository, MockTrackingNotifier, NoopTrackingNotifier};

fn sample_register_request() -> RegisterParcelRequest {
    RegisterParcelRequest {
        sender_name: "Ada Osei".to_owned(),
        sender_email: "ada@example.com".to_owned(),
        sender_phone: "+44 20 7946 0000".to_owned(),
        recipient_name: "Bo Lindqvist".to_owned(),
        recipient_email: "bo@example.net".to_owned(),
        recipient_phone: "+1 212 555 0100".to_owned(),
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
    }
}

fn sample_parcel() -> Parcel {
    let code = TrackingCode::parse("CWY260828K4QZ71MB").expect("valid code");
    Parcel::register(
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
    .expect("valid parcel")
}

#[tokio::test]
async fn register_persists_parcel_with_initial_ledger_entry() {
    let mut repo = MockParcelRepository::new();
    repo.expect_create()
        .times(1)
        .withf(|parcel, event| {
            parcel.status == ParcelStatus::Pending
                && event.parcel_id == parcel.id
                && event.status == ParcelStatus::Pending
                && event.location == parcel.current_location
        })
        .return_once(|_, _| Ok(()));
    let mut notifier = MockTrackingNotifier::new();
    notifier.expect_notify().times(1).return_once(|_, _| ());

    let service = ParcelCommandService::new(Arc::new(repo), Arc::new(notifier));
    let response = service
        .register_parcel(sample_register_request())
        .await
        .expect("register succeeds");

    assert_eq!(response.parcel.status, ParcelStatus::Pending);
    assert!(response.parcel.tracking_code.starts_with("CWY"));
    assert!((response.parcel.border_fee - 25.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn register_maps_validation_error_to_invalid_request() {
    let mut request = sample_register_request();
    request.weight_kg = 0.0;

    let mut repo = MockParcelRepository::new();
    repo.expect_create().times(0);

    let service = ParcelCommandService::new(Arc::new(repo), Arc::new(NoopTrackingNotifier));
    let error = service
        .register_parcel(request)
        .await
        .expect_err("invalid request");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn register_surfaces_code_collision_as_conflict() {
    let mut repo = MockParcelRepository::new();
    repo.expect_create().times(1).return_once(|_, event| {
        let _ = event;
        Err(ParcelRepositoryError::duplicate_tracking_code(
            "CWY260828K4QZ71MB",
        ))
    });

    let service = ParcelCommandService::new(Arc::new(repo), Arc::new(NoopTrackingNotifier));
    let error = service
        .register_parcel(sample_register_request())
        .await
        .expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn register_maps_connection_error_to_service_unavailable() {
    let mut repo = MockParcelRepository::new();
    repo.expect_create()
        .times(1)
        .return_once(|_, _| Err(ParcelRepositoryError::connection("pool unavailable")));

    let service = ParcelCommandService::new(Arc::new(repo), Arc::new(NoopTrackingNotifier));
    let error = service
        .register_parcel(sample_register_request())
        .await
        .expect_err("service unavailable");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn advance_records_movement_and_notifies() {
    let parcel = sample_parcel();
    let parcel_id = parcel.id;

    let mut repo = MockParcelRepository::new();
    repo.expect_find_by_tracking_code()
        .times(1)
        .return_once(move |_| Ok(Some(parcel)));
    repo.expect_record_movement()
        .times(1)
        .withf(move |parcel, event| {
            parcel.status == ParcelStatus::AtBorder
                && parcel.current_location == "Border Checkpoint"
                && event.parcel_id == parcel_id
                && event.status == ParcelStatus::AtBorder
        })
        .return_once(|_, _| Ok(()));
    let mut notifier = MockTrackingNotifier::new();
    notifier.expect_notify().times(1).return_once(|_, _| ());

    let service = ParcelCommandService::new(Arc::new(repo), Arc::new(notifier));
    let response = service
        .advance_parcel(AdvanceParcelRequest {
            tracking_code: "CWY260828K4QZ71MB".to_owned(),
            location: "Border Checkpoint".to_owned(),
            status: ParcelStatus::AtBorder,
            coordinates: None,
            description: Some("Held pending border fee".to_owned()),
        })
        .await
        .expect("advance succeeds");

    assert_eq!(response.parcel.status, ParcelStatus::AtBorder);
    assert_eq!(response.parcel.current_location, "Border Checkpoint");
}

#[tokio::test]
async fn advance_rejects_blank_location_without_touching_the_repo() {
    let mut repo = MockParcelRepository::new();
    repo.expect_find_by_tracking_code().times(0);

    let service = ParcelCommandService::new(Arc::new(repo), Arc::new(NoopTrackingNotifier));
    let error = service
        .advance_parcel(AdvanceParcelRequest {
            tracking_code: "CWY260828K4QZ71MB".to_owned(),
            location: "   ".to_owned(),
            status: ParcelStatus::InTransit,
            coordinates: None,
            description: None,
        })
        .await
        .expect_err("blank location");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn advance_returns_not_found_for_unknown_code() {
    let mut repo = MockParcelRepository::new();
    repo.expect_find_by_tracking_code()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_record_movement().times(0);

    let service = ParcelCommandService::new(Arc::new(repo), Arc::new(NoopTrackingNotifier));
    let error = service
        .advance_parcel(AdvanceParcelRequest {
            tracking_code: "CWY260828K4QZ71MB".to_owned(),
            location: "Hub".to_owned(),
            status: ParcelStatus::InTransit,
            coordinates: None,
            description: None,
        })
        .await
        .expect_err("not found");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn track_returns_parcel_with_history() {
    let parcel = sample_parcel();
    let parcel_id = parcel.id;
    let event = TrackingEvent::record(
        parcel_id,
        ParcelStatus::Pending,
        "Warehouse - Origin",
        None,
        Some("Parcel registered".to_owned()),
        Utc::now(),
    );

    let mut repo = MockParcelRepository::new();
    repo.expect_find_by_tracking_code()
        .times(1)
        .return_once(move |_| Ok(Some(parcel)));
    repo.expect_history()
        .times(1)
        .return_once(move |_| Ok(vec![event]));

    let service = ParcelQueryService::new(Arc::new(repo));
    let response = service
        .track_parcel(TrackParcelRequest {
            tracking_code: "CWY260828K4QZ71MB".to_owned(),
        })
        .await
        .expect("track succeeds");

    assert_eq!(response.history.len(), 1);
    assert_eq!(response.history[0].status, ParcelStatus::Pending);
}

#[tokio::test]
async fn track_rejects_malformed_codes_without_touching_the_repo() {
    let mut repo = MockParcelRepository::new();
    repo.expect_find_by_tracking_code().times(0);

    let service = ParcelQueryService::new(Arc::new(repo));
    let error = service
        .track_parcel(TrackParcelRequest {
            tracking_code: "not-a-code".to_owned(),
        })
        .await
        .expect_err("malformed code");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn search_normalises_blank_terms_and_clamps_the_page() {
    let mut repo = MockParcelRepository::new();
    repo.expect_search()
        .times(1)
        .withf(|filter, page| {
            filter.tracking_code.is_none()
                && filter.contact_email == Some("ada@example.com".to_owned())
                && page.limit == 100
        })
        .return_once(|_, _| Ok(Vec::new()));

    let service = ParcelQueryService::new(Arc::new(repo));
    let response = service
        .search_parcels(SearchParcelsRequest {
            tracking_code: Some("   ".to_owned()),
            status: None,
            contact_email: Some("  ada@example.com ".to_owned()),
            offset: None,
            limit: Some(500),
        })
        .await
        .expect("search succeeds");

    assert!(response.parcels.is_empty());
}
