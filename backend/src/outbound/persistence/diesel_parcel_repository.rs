//! PostgreSQL-backed `ParcelRepository` implementation using Diesel ORM.
//!
//! Registration and movement both write the parcel and its ledger entry in
//! one transaction, so a parcel is never visible without a matching event.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use uuid::Uuid;

use crate::domain::parcel::{
    Coordinates, DimensionUnit, Dimensions, Parcel, TrackingCode,
};
use crate::domain::ports::{
    Page, ParcelRepository, ParcelRepositoryError, ParcelSearchFilter,
};
use crate::domain::tracking::TrackingEvent;

use super::diesel_error::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{
    NewParcelRow, NewTrackingEventRow, ParcelMovementChangeset, ParcelRow, TrackingEventRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{parcels, tracking_events};

/// Diesel-backed implementation of the parcel repository port.
#[derive(Clone)]
pub struct DieselParcelRepository {
    pool: DbPool,
}

impl DieselParcelRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ParcelRepositoryError {
    map_basic_pool_error(error, ParcelRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ParcelRepositoryError {
    map_basic_diesel_error(
        error,
        ParcelRepositoryError::query,
        ParcelRepositoryError::connection,
    )
}

/// Like [`map_diesel_error`], but turns a unique violation into the
/// duplicate-code conflict the service retries on.
fn map_create_error(error: diesel::result::Error, code: &str) -> ParcelRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) = &error {
        return ParcelRepositoryError::duplicate_tracking_code(code);
    }
    map_diesel_error(error)
}

fn unit_to_str(unit: DimensionUnit) -> &'static str {
    match unit {
        DimensionUnit::Cm => "cm",
        DimensionUnit::In => "in",
    }
}

fn unit_from_str(value: &str) -> Result<DimensionUnit, ParcelRepositoryError> {
    match value {
        "cm" => Ok(DimensionUnit::Cm),
        "in" => Ok(DimensionUnit::In),
        other => Err(ParcelRepositoryError::query(format!(
            "unknown dimension unit: {other}"
        ))),
    }
}

fn split_coordinates(coordinates: Option<Coordinates>) -> (Option<f64>, Option<f64>) {
    match coordinates {
        Some(point) => (Some(point.lat), Some(point.lng)),
        None => (None, None),
    }
}

fn join_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Option<Coordinates> {
    match (latitude, longitude) {
        (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
        _ => None,
    }
}

fn parcel_to_new_row(parcel: &Parcel) -> NewParcelRow<'_> {
    let (latitude, longitude) = split_coordinates(parcel.coordinates);
    NewParcelRow {
        id: parcel.id,
        tracking_code: parcel.tracking_code.as_str(),
        sender_name: &parcel.sender_name,
        sender_email: &parcel.sender_email,
        sender_phone: &parcel.sender_phone,
        recipient_name: &parcel.recipient_name,
        recipient_email: &parcel.recipient_email,
        recipient_phone: &parcel.recipient_phone,
        recipient_address: &parcel.recipient_address,
        destination_country: &parcel.destination_country,
        weight_kg: parcel.weight_kg,
        dim_length: parcel.dimensions.length,
        dim_width: parcel.dimensions.width,
        dim_height: parcel.dimensions.height,
        dim_unit: unit_to_str(parcel.dimensions.unit),
        shipping_cost: parcel.shipping_cost,
        border_fee: parcel.border_fee,
        status: parcel.status.as_str(),
        current_location: &parcel.current_location,
        latitude,
        longitude,
        border_fee_paid: parcel.border_fee_paid,
        estimated_delivery: parcel.estimated_delivery,
        actual_delivery: parcel.actual_delivery,
        user_id: parcel.user_id,
        created_at: parcel.created_at,
        updated_at: parcel.updated_at,
    }
}

pub(super) fn parcel_to_movement_changeset(parcel: &Parcel) -> ParcelMovementChangeset<'_> {
    let (latitude, longitude) = split_coordinates(parcel.coordinates);
    ParcelMovementChangeset {
        status: parcel.status.as_str(),
        current_location: &parcel.current_location,
        latitude,
        longitude,
        border_fee_paid: parcel.border_fee_paid,
        actual_delivery: parcel.actual_delivery,
        updated_at: parcel.updated_at,
    }
}

pub(super) fn event_to_new_row(event: &TrackingEvent) -> NewTrackingEventRow<'_> {
    let (latitude, longitude) = split_coordinates(event.coordinates);
    NewTrackingEventRow {
        id: event.id,
        parcel_id: event.parcel_id,
        status: event.status.as_str(),
        location: &event.location,
        latitude,
        longitude,
        description: event.description.as_deref(),
        created_at: event.created_at,
    }
}

/// Convert a database row into a domain parcel.
pub(super) fn row_to_parcel(row: ParcelRow) -> Result<Parcel, ParcelRepositoryError> {
    let tracking_code = TrackingCode::parse(row.tracking_code)
        .map_err(|err| ParcelRepositoryError::query(format!("stored tracking code: {err}")))?;
    let status = row
        .status
        .parse()
        .map_err(|err| ParcelRepositoryError::query(format!("stored parcel status: {err}")))?;

    Ok(Parcel {
        id: row.id,
        tracking_code,
        sender_name: row.sender_name,
        sender_email: row.sender_email,
        sender_phone: row.sender_phone,
        recipient_name: row.recipient_name,
        recipient_email: row.recipient_email,
        recipient_phone: row.recipient_phone,
        recipient_address: row.recipient_address,
        destination_country: row.destination_country,
        weight_kg: row.weight_kg,
        dimensions: Dimensions {
            length: row.dim_length,
            width: row.dim_width,
            height: row.dim_height,
            unit: unit_from_str(&row.dim_unit)?,
        },
        shipping_cost: row.shipping_cost,
        border_fee: row.border_fee,
        status,
        current_location: row.current_location,
        coordinates: join_coordinates(row.latitude, row.longitude),
        border_fee_paid: row.border_fee_paid,
        estimated_delivery: row.estimated_delivery,
        actual_delivery: row.actual_delivery,
        user_id: row.user_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Convert a database row into a domain ledger entry.
fn row_to_event(row: TrackingEventRow) -> Result<TrackingEvent, ParcelRepositoryError> {
    let status = row
        .status
        .parse()
        .map_err(|err| ParcelRepositoryError::query(format!("stored event status: {err}")))?;

    Ok(TrackingEvent {
        id: row.id,
        parcel_id: row.parcel_id,
        status,
        location: row.location,
        coordinates: join_coordinates(row.latitude, row.longitude),
        description: row.description,
        created_at: row.created_at,
    })
}

fn contains_pattern(term: &str) -> String {
    format!("%{term}%")
}

#[async_trait]
impl ParcelRepository for DieselParcelRepository {
    async fn create(
        &self,
        parcel: &Parcel,
        initial_event: &TrackingEvent,
    ) -> Result<(), ParcelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_parcel = parcel_to_new_row(parcel);
        let new_event = event_to_new_row(initial_event);

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(parcels::table)
                    .values(&new_parcel)
                    .execute(conn)
                    .await?;
                diesel::insert_into(tracking_events::table)
                    .values(&new_event)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_create_error(err, parcel.tracking_code.as_str()))
    }

    async fn find_by_tracking_code(
        &self,
        code: &TrackingCode,
    ) -> Result<Option<Parcel>, ParcelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = parcels::table
            .filter(parcels::tracking_code.eq(code.as_str()))
            .select(ParcelRow::as_select())
            .first::<ParcelRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_parcel).transpose()
    }

    async fn find_by_id(&self, parcel_id: Uuid) -> Result<Option<Parcel>, ParcelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = parcels::table
            .filter(parcels::id.eq(parcel_id))
            .select(ParcelRow::as_select())
            .first::<ParcelRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_parcel).transpose()
    }

    async fn record_movement(
        &self,
        parcel: &Parcel,
        event: &TrackingEvent,
    ) -> Result<(), ParcelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = parcel_to_movement_changeset(parcel);
        let new_event = event_to_new_row(event);
        let parcel_id = parcel.id;

        conn.transaction(|conn| {
            async move {
                diesel::update(parcels::table.filter(parcels::id.eq(parcel_id)))
                    .set(&changeset)
                    .execute(conn)
                    .await?;
                diesel::insert_into(tracking_events::table)
                    .values(&new_event)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn history(&self, parcel_id: Uuid) -> Result<Vec<TrackingEvent>, ParcelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TrackingEventRow> = tracking_events::table
            .filter(tracking_events::parcel_id.eq(parcel_id))
            .order((tracking_events::created_at.asc(), tracking_events::id.asc()))
            .select(TrackingEventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_event).collect()
    }

    async fn search(
        &self,
        filter: &ParcelSearchFilter,
        page: Page,
    ) -> Result<Vec<Parcel>, ParcelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = parcels::table.into_boxed();
        if let Some(code) = &filter.tracking_code {
            query = query.filter(parcels::tracking_code.ilike(contains_pattern(code)));
        }
        if let Some(status) = filter.status {
            query = query.filter(parcels::status.eq(status.as_str()));
        }
        if let Some(email) = &filter.contact_email {
            let pattern = contains_pattern(email);
            query = query.filter(
                parcels::sender_email
                    .ilike(pattern.clone())
                    .or(parcels::recipient_email.ilike(pattern)),
            );
        }

        let rows: Vec<ParcelRow> = query
            .order((parcels::created_at.desc(), parcels::id.desc()))
            .offset(page.offset)
            .limit(page.limit)
            .select(ParcelRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_parcel).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion edge cases.

    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn valid_row() -> ParcelRow {
        let now = Utc::now();
        ParcelRow {
            id: Uuid::new_v4(),
            tracking_code: "CWY260828K4QZ71MB".to_owned(),
            sender_name: "Ada Osei".to_owned(),
            sender_email: "ada@example.com".to_owned(),
            sender_phone: String::new(),
            recipient_name: "Bo Lindqvist".to_owned(),
            recipient_email: "bo@example.net".to_owned(),
            recipient_phone: String::new(),
            recipient_address: "1 Main St, Springfield".to_owned(),
            destination_country: "US".to_owned(),
            weight_kg: 5.0,
            dim_length: 30.0,
            dim_width: 20.0,
            dim_height: 15.0,
            dim_unit: "cm".to_owned(),
            shipping_cost: 24.0,
            border_fee: 25.0,
            status: "at_border".to_owned(),
            current_location: "Border Checkpoint".to_owned(),
            latitude: Some(49.0),
            longitude: Some(8.4),
            border_fee_paid: false,
            estimated_delivery: Some(now),
            actual_delivery: None,
            user_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, ParcelRepositoryError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn unique_violation_maps_to_duplicate_tracking_code() {
        let diesel_err = diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value".to_owned()),
        );

        let repo_err = map_create_error(diesel_err, "CWY260828K4QZ71MB");
        assert_eq!(
            repo_err,
            ParcelRepositoryError::duplicate_tracking_code("CWY260828K4QZ71MB")
        );
    }

    #[rstest]
    fn other_database_errors_map_to_query_errors() {
        let repo_err = map_create_error(diesel::result::Error::NotFound, "CWY260828K4QZ71MB");
        assert!(matches!(repo_err, ParcelRepositoryError::Query { .. }));
    }

    #[rstest]
    fn row_conversion_restores_coordinates_and_dimensions(valid_row: ParcelRow) {
        let parcel = row_to_parcel(valid_row).expect("valid row converts");

        assert_eq!(parcel.tracking_code.as_str(), "CWY260828K4QZ71MB");
        assert_eq!(parcel.status, crate::domain::ParcelStatus::AtBorder);
        assert_eq!(parcel.dimensions.unit, DimensionUnit::Cm);
        let point = parcel.coordinates.expect("coordinates present");
        assert!((point.lat - 49.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn row_conversion_rejects_unknown_status(mut valid_row: ParcelRow) {
        valid_row.status = "teleported".to_owned();

        let error = row_to_parcel(valid_row).expect_err("unknown status fails");
        assert!(matches!(error, ParcelRepositoryError::Query { .. }));
        assert!(error.to_string().contains("teleported"));
    }

    #[rstest]
    fn row_conversion_rejects_unknown_dimension_unit(mut valid_row: ParcelRow) {
        valid_row.dim_unit = "furlongs".to_owned();

        let error = row_to_parcel(valid_row).expect_err("unknown unit fails");
        assert!(error.to_string().contains("furlongs"));
    }

    #[rstest]
    fn half_present_coordinates_are_dropped(mut valid_row: ParcelRow) {
        valid_row.longitude = None;

        let parcel = row_to_parcel(valid_row).expect("valid row converts");
        assert!(parcel.coordinates.is_none());
    }

    #[rstest]
    fn search_patterns_wrap_the_term() {
        assert_eq!(contains_pattern("CWY2608"), "%CWY2608%");
    }
}
