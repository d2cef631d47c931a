//! Driving port for parcel read operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::parcel::{Coordinates, ParcelStatus};
use crate::domain::tracking::TrackingEvent;
use crate::domain::Error;

use super::parcel_command::ParcelPayload;

/// Serializable ledger entry for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEventPayload {
    pub id: Uuid,
    pub status: ParcelStatus,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TrackingEvent> for TrackingEventPayload {
    fn from(value: TrackingEvent) -> Self {
        Self {
            id: value.id,
            status: value.status,
            location: value.location,
            coordinates: value.coordinates,
            description: value.description,
            created_at: value.created_at,
        }
    }
}

/// Request to fetch one parcel with its full ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackParcelRequest {
    pub tracking_code: String,
}

/// Response for a tracking lookup: the parcel plus its ledger, oldest entry
/// first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackParcelResponse {
    pub parcel: ParcelPayload,
    pub history: Vec<TrackingEventPayload>,
}

/// Request to list parcels matching a filter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParcelsRequest {
    pub tracking_code: Option<String>,
    pub status: Option<ParcelStatus>,
    pub contact_email: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

/// Response containing matching parcels, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchParcelsResponse {
    pub parcels: Vec<ParcelPayload>,
}

/// Driving port for parcel read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParcelQuery: Send + Sync {
    /// Fetches a parcel and its ledger by tracking code.
    async fn track_parcel(&self, request: TrackParcelRequest)
        -> Result<TrackParcelResponse, Error>;

    /// Lists parcels matching the filter, newest-registered first.
    async fn search_parcels(
        &self,
        request: SearchParcelsRequest,
    ) -> Result<SearchParcelsResponse, Error>;
}

/// Fixture query implementation for tests that do not need persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureParcelQuery;

#[async_trait]
impl ParcelQuery for FixtureParcelQuery {
    async fn track_parcel(
        &self,
        request: TrackParcelRequest,
    ) -> Result<TrackParcelResponse, Error> {
        Err(Error::not_found(format!(
            "parcel {} not found",
            request.tracking_code
        )))
    }

    async fn search_parcels(
        &self,
        _request: SearchParcelsRequest,
    ) -> Result<SearchParcelsResponse, Error> {
        Ok(SearchParcelsResponse {
            parcels: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;
    use crate::domain::ErrorCode;

    #[tokio::test]
    async fn fixture_query_returns_not_found_for_track() {
        let query = FixtureParcelQuery;
        let request = TrackParcelRequest {
            tracking_code: "CWY260828K4QZ71MB".to_owned(),
        };

        let error = query.track_parcel(request).await.expect_err("not found");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn fixture_query_returns_empty_search_results() {
        let query = FixtureParcelQuery;

        let response = query
            .search_parcels(SearchParcelsRequest::default())
            .await
            .expect("fixture search succeeds");

        assert!(response.parcels.is_empty());
    }
}
