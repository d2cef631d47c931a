//! Tracking ledger entries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::parcel::{Coordinates, ParcelStatus};

/// Immutable audit entry recording a status/location change.
///
/// Events are append-only, ordered by creation time, and owned exclusively by
/// the parcel they reference. Exactly one event is created atomically with
/// every parcel status/location mutation, including registration itself.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingEvent {
    pub id: Uuid,
    pub parcel_id: Uuid,
    pub status: ParcelStatus,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TrackingEvent {
    /// Record a new ledger entry for `parcel_id`.
    pub fn record(
        parcel_id: Uuid,
        status: ParcelStatus,
        location: impl Into<String>,
        coordinates: Option<Coordinates>,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            parcel_id,
            status,
            location: location.into(),
            coordinates,
            description,
            created_at: now,
        }
    }
}
