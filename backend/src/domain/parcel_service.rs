//! Parcel domain services.
//!
//! These services implement the parcel driving ports: registration, movement
//! recording, tracking lookups, and the operator search listing. Every
//! mutation appends exactly one ledger entry in the same transaction, then
//! fans the update out to the notifier on a best-effort basis.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::Error;
use crate::domain::parcel::{Parcel, ParcelStatus, TrackingCode};
use crate::domain::ports::{
    AdvanceParcelRequest, AdvanceParcelResponse, Page, ParcelCommand, ParcelQuery,
    ParcelRepository, ParcelRepositoryError, ParcelSearchFilter, RegisterParcelRequest,
    RegisterParcelResponse, SearchParcelsRequest, SearchParcelsResponse, TrackParcelRequest,
    TrackParcelResponse, TrackingNotifier,
};
use crate::domain::tracking::TrackingEvent;

/// Ledger description stamped on the registration entry.
const REGISTERED_DESCRIPTION: &str = "Parcel registered";

fn map_repository_error(error: ParcelRepositoryError) -> Error {
    match error {
        ParcelRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("parcel repository unavailable: {message}"))
        }
        ParcelRepositoryError::Query { message } => {
            Error::internal(format!("parcel repository error: {message}"))
        }
        ParcelRepositoryError::DuplicateTrackingCode { code } => Error::conflict(format!(
            "tracking code {code} already exists; retry the registration"
        )),
    }
}

fn parse_tracking_code(raw: &str) -> Result<TrackingCode, Error> {
    TrackingCode::parse(raw)
        .map_err(|err| Error::invalid_request(format!("invalid tracking code: {err}")))
}

/// Parcel service implementing command driving ports.
#[derive(Clone)]
pub struct ParcelCommandService<R, N> {
    parcel_repo: Arc<R>,
    notifier: Arc<N>,
}

impl<R, N> ParcelCommandService<R, N> {
    /// Create a new command service with the parcel repository and notifier.
    pub fn new(parcel_repo: Arc<R>, notifier: Arc<N>) -> Self {
        Self {
            parcel_repo,
            notifier,
        }
    }
}

#[async_trait]
impl<R, N> ParcelCommand for ParcelCommandService<R, N>
where
    R: ParcelRepository,
    N: TrackingNotifier,
{
    async fn register_parcel(
        &self,
        request: RegisterParcelRequest,
    ) -> Result<RegisterParcelResponse, Error> {
        let now = Utc::now();
        let code = TrackingCode::generate(now, &mut rand::thread_rng());
        let parcel = Parcel::register(request.into(), code, now)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let event = TrackingEvent::record(
            parcel.id,
            ParcelStatus::Pending,
            parcel.current_location.clone(),
            None,
            Some(REGISTERED_DESCRIPTION.to_owned()),
            now,
        );

        self.parcel_repo
            .create(&parcel, &event)
            .await
            .map_err(map_repository_error)?;

        tracing::info!(
            tracking_code = %parcel.tracking_code,
            destination = %parcel.destination_country,
            "parcel registered"
        );
        self.notifier.notify(&parcel, &event).await;

        Ok(RegisterParcelResponse {
            parcel: parcel.into(),
        })
    }

    async fn advance_parcel(
        &self,
        request: AdvanceParcelRequest,
    ) -> Result<AdvanceParcelResponse, Error> {
        if request.location.trim().is_empty() {
            return Err(Error::invalid_request("location must not be empty"));
        }
        let code = parse_tracking_code(&request.tracking_code)?;
        let mut parcel = self
            .parcel_repo
            .find_by_tracking_code(&code)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("parcel {code} not found")))?;

        let now = Utc::now();
        parcel.advance(
            request.location.clone(),
            request.status,
            request.coordinates,
            now,
        );
        let event = TrackingEvent::record(
            parcel.id,
            request.status,
            request.location,
            request.coordinates,
            request.description,
            now,
        );

        self.parcel_repo
            .record_movement(&parcel, &event)
            .await
            .map_err(map_repository_error)?;

        tracing::info!(
            tracking_code = %parcel.tracking_code,
            status = %parcel.status,
            location = %parcel.current_location,
            "parcel advanced"
        );
        self.notifier.notify(&parcel, &event).await;

        Ok(AdvanceParcelResponse {
            parcel: parcel.into(),
        })
    }
}

/// Parcel service implementing query driving ports.
#[derive(Clone)]
pub struct ParcelQueryService<R> {
    parcel_repo: Arc<R>,
}

impl<R> ParcelQueryService<R> {
    /// Create a new query service with the parcel repository.
    pub fn new(parcel_repo: Arc<R>) -> Self {
        Self { parcel_repo }
    }
}

/// Drop blank filter terms so the repository only sees meaningful ones.
fn normalise_term(term: Option<String>) -> Option<String> {
    term.map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[async_trait]
impl<R> ParcelQuery for ParcelQueryService<R>
where
    R: ParcelRepository,
{
    async fn track_parcel(
        &self,
        request: TrackParcelRequest,
    ) -> Result<TrackParcelResponse, Error> {
        let code = parse_tracking_code(&request.tracking_code)?;
        let parcel = self
            .parcel_repo
            .find_by_tracking_code(&code)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("parcel {code} not found")))?;
        let history = self
            .parcel_repo
            .history(parcel.id)
            .await
            .map_err(map_repository_error)?;

        Ok(TrackParcelResponse {
            parcel: parcel.into(),
            history: history.into_iter().map(Into::into).collect(),
        })
    }

    async fn search_parcels(
        &self,
        request: SearchParcelsRequest,
    ) -> Result<SearchParcelsResponse, Error> {
        let filter = ParcelSearchFilter {
            tracking_code: normalise_term(request.tracking_code),
            status: request.status,
            contact_email: normalise_term(request.contact_email),
        };
        let page = Page::clamped(request.offset, request.limit);
        let parcels = self
            .parcel_repo
            .search(&filter, page)
            .await
            .map_err(map_repository_error)?;

        Ok(SearchParcelsResponse {
            parcels: parcels.into_iter().map(Into::into).collect(),
        })
    }
}

#[cfg(test)]
#[path = "parcel_service_tests.rs"]
mod tests;
