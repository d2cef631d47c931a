//! Port for parcel persistence and the tracking ledger.
//!
//! Multi-row mutations (registration, movement) pair the parcel write with
//! its ledger append; adapters must apply both in a single transaction so a
//! reader never observes one without the other.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::parcel::{Parcel, ParcelStatus, TrackingCode};
use crate::domain::tracking::TrackingEvent;

/// Errors raised by parcel repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParcelRepositoryError {
    /// Repository connection could not be established.
    #[error("parcel repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("parcel repository query failed: {message}")]
    Query { message: String },
    /// The store rejected a duplicate tracking code.
    #[error("tracking code {code} already exists")]
    DuplicateTrackingCode { code: String },
}

impl ParcelRepositoryError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for tracking-code uniqueness violations.
    pub fn duplicate_tracking_code(code: impl Into<String>) -> Self {
        Self::DuplicateTrackingCode { code: code.into() }
    }
}

/// Search filter for the parcel listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParcelSearchFilter {
    /// Case-insensitive substring match on the tracking code.
    pub tracking_code: Option<String>,
    /// Exact status match.
    pub status: Option<ParcelStatus>,
    /// Case-insensitive substring match on sender or recipient email.
    pub contact_email: Option<String>,
}

/// Offset/limit pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

/// Largest page a single search may return.
pub const MAX_PAGE_LIMIT: i64 = 100;
const DEFAULT_PAGE_LIMIT: i64 = 20;

impl Page {
    /// Clamp caller-supplied pagination to sane bounds.
    pub fn clamped(offset: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            offset: offset.unwrap_or(0).max(0),
            limit: limit
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::clamped(None, None)
    }
}

/// Port for writing parcels and reading them back with their ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParcelRepository: Send + Sync {
    /// Persist a freshly registered parcel together with its initial
    /// `pending` ledger entry, atomically.
    async fn create(
        &self,
        parcel: &Parcel,
        initial_event: &TrackingEvent,
    ) -> Result<(), ParcelRepositoryError>;

    /// Find a parcel by its tracking code.
    async fn find_by_tracking_code(
        &self,
        code: &TrackingCode,
    ) -> Result<Option<Parcel>, ParcelRepositoryError>;

    /// Find a parcel by internal id.
    async fn find_by_id(&self, parcel_id: Uuid) -> Result<Option<Parcel>, ParcelRepositoryError>;

    /// Persist an already-mutated parcel and append the movement's ledger
    /// entry, atomically.
    async fn record_movement(
        &self,
        parcel: &Parcel,
        event: &TrackingEvent,
    ) -> Result<(), ParcelRepositoryError>;

    /// Ledger entries for a parcel, ordered by creation time ascending.
    async fn history(&self, parcel_id: Uuid) -> Result<Vec<TrackingEvent>, ParcelRepositoryError>;

    /// Filtered listing, newest-created first.
    async fn search(
        &self,
        filter: &ParcelSearchFilter,
        page: Page,
    ) -> Result<Vec<Parcel>, ParcelRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureParcelRepository;

#[async_trait]
impl ParcelRepository for FixtureParcelRepository {
    async fn create(
        &self,
        _parcel: &Parcel,
        _initial_event: &TrackingEvent,
    ) -> Result<(), ParcelRepositoryError> {
        Ok(())
    }

    async fn find_by_tracking_code(
        &self,
        _code: &TrackingCode,
    ) -> Result<Option<Parcel>, ParcelRepositoryError> {
        Ok(None)
    }

    async fn find_by_id(&self, _parcel_id: Uuid) -> Result<Option<Parcel>, ParcelRepositoryError> {
        Ok(None)
    }

    async fn record_movement(
        &self,
        _parcel: &Parcel,
        _event: &TrackingEvent,
    ) -> Result<(), ParcelRepositoryError> {
        Ok(())
    }

    async fn history(&self, _parcel_id: Uuid) -> Result<Vec<TrackingEvent>, ParcelRepositoryError> {
        Ok(Vec::new())
    }

    async fn search(
        &self,
        _filter: &ParcelSearchFilter,
        _page: Page,
    ) -> Result<Vec<Parcel>, ParcelRepositoryError> {
        Ok(Vec::new())
    }
}
