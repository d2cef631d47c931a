//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{parcels, payments, tracking_events, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub full_name: &'a str,
    pub phone: Option<&'a str>,
    pub role: &'a str,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Parcel models
// ---------------------------------------------------------------------------

/// Row struct for reading from the parcels table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = parcels)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ParcelRow {
    pub id: Uuid,
    pub tracking_code: String,
    pub sender_name: String,
    pub sender_email: String,
    pub sender_phone: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub recipient_phone: String,
    pub recipient_address: String,
    pub destination_country: String,
    pub weight_kg: f64,
    pub dim_length: f64,
    pub dim_width: f64,
    pub dim_height: f64,
    pub dim_unit: String,
    pub shipping_cost: f64,
    pub border_fee: f64,
    pub status: String,
    pub current_location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub border_fee_paid: bool,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for registering parcels.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = parcels)]
pub(crate) struct NewParcelRow<'a> {
    pub id: Uuid,
    pub tracking_code: &'a str,
    pub sender_name: &'a str,
    pub sender_email: &'a str,
    pub sender_phone: &'a str,
    pub recipient_name: &'a str,
    pub recipient_email: &'a str,
    pub recipient_phone: &'a str,
    pub recipient_address: &'a str,
    pub destination_country: &'a str,
    pub weight_kg: f64,
    pub dim_length: f64,
    pub dim_width: f64,
    pub dim_height: f64,
    pub dim_unit: &'a str,
    pub shipping_cost: f64,
    pub border_fee: f64,
    pub status: &'a str,
    pub current_location: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub border_fee_paid: bool,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied when a parcel moves or clears the border. Intake fields
/// are immutable after registration and deliberately absent.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = parcels)]
pub(crate) struct ParcelMovementChangeset<'a> {
    pub status: &'a str,
    pub current_location: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub border_fee_paid: bool,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tracking ledger models
// ---------------------------------------------------------------------------

/// Row struct for reading from the tracking_events table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tracking_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TrackingEventRow {
    pub id: Uuid,
    pub parcel_id: Uuid,
    pub status: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for appending ledger entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tracking_events)]
pub(crate) struct NewTrackingEventRow<'a> {
    pub id: Uuid,
    pub parcel_id: Uuid,
    pub status: &'a str,
    pub location: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Payment models
// ---------------------------------------------------------------------------

/// Row struct for reading from the payments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PaymentRow {
    pub id: Uuid,
    pub parcel_id: Uuid,
    pub processor_ref: String,
    pub kind: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub details: serde_json::Value,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for recording fee-collection attempts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub(crate) struct NewPaymentRow<'a> {
    pub id: Uuid,
    pub parcel_id: Uuid,
    pub processor_ref: &'a str,
    pub kind: &'a str,
    pub amount: f64,
    pub currency: &'a str,
    pub status: &'a str,
    pub details: &'a serde_json::Value,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
