//! Parcel HTTP handlers.
//!
//! ```text
//! POST /api/v1/parcels                          Register a parcel
//! GET  /api/v1/parcels/{trackingCode}           Fetch a single parcel
//! PUT  /api/v1/parcels/{trackingCode}/location  Record a movement scan
//! GET  /api/v1/parcels                          Search the parcel listing
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::Deserialize;

use crate::domain::ParcelStatus;
use crate::domain::ports::{
    AdvanceParcelRequest, ParcelPayload, RegisterParcelRequest, SearchParcelsRequest,
    SearchParcelsResponse, TrackParcelRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Movement scan body; the tracking code comes from the path.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceParcelBody {
    pub location: String,
    pub status: ParcelStatus,
    pub coordinates: Option<crate::domain::Coordinates>,
    pub description: Option<String>,
}

/// Search query parameters for the parcel listing.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchParcelsParams {
    /// Case-insensitive substring match on the tracking code.
    pub tracking_code: Option<String>,
    /// Exact status match.
    pub status: Option<ParcelStatus>,
    /// Case-insensitive substring match on sender or recipient email.
    pub contact_email: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

/// Register a parcel.
#[utoipa::path(
    post,
    path = "/api/v1/parcels",
    request_body = RegisterParcelRequest,
    responses(
        (status = 201, description = "Parcel registered", body = crate::domain::ports::RegisterParcelResponse),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 409, description = "Tracking code collision", body = crate::domain::Error),
        (status = 503, description = "Service unavailable", body = crate::domain::Error)
    ),
    tags = ["parcels"],
    operation_id = "registerParcel"
)]
#[post("/parcels")]
pub async fn register_parcel(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterParcelRequest>,
) -> ApiResult<HttpResponse> {
    let response = state.parcels.register_parcel(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Fetch a single parcel by tracking code.
#[utoipa::path(
    get,
    path = "/api/v1/parcels/{trackingCode}",
    responses(
        (status = 200, description = "The parcel", body = ParcelPayload),
        (status = 400, description = "Malformed tracking code", body = crate::domain::Error),
        (status = 404, description = "Unknown tracking code", body = crate::domain::Error),
        (status = 503, description = "Service unavailable", body = crate::domain::Error)
    ),
    params(
        ("trackingCode" = String, Path, description = "Parcel tracking code")
    ),
    tags = ["parcels"],
    operation_id = "getParcel"
)]
#[get("/parcels/{tracking_code}")]
pub async fn get_parcel(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ParcelPayload>> {
    let response = state
        .parcels_query
        .track_parcel(TrackParcelRequest {
            tracking_code: path.into_inner(),
        })
        .await?;
    Ok(web::Json(response.parcel))
}

/// Record a status/location change against a parcel.
#[utoipa::path(
    put,
    path = "/api/v1/parcels/{trackingCode}/location",
    request_body = AdvanceParcelBody,
    responses(
        (status = 200, description = "Movement recorded", body = crate::domain::ports::AdvanceParcelResponse),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 404, description = "Unknown tracking code", body = crate::domain::Error),
        (status = 503, description = "Service unavailable", body = crate::domain::Error)
    ),
    params(
        ("trackingCode" = String, Path, description = "Parcel tracking code")
    ),
    tags = ["parcels"],
    operation_id = "advanceParcel"
)]
#[put("/parcels/{tracking_code}/location")]
pub async fn advance_parcel(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<AdvanceParcelBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let response = state
        .parcels
        .advance_parcel(AdvanceParcelRequest {
            tracking_code: path.into_inner(),
            location: body.location,
            status: body.status,
            coordinates: body.coordinates,
            description: body.description,
        })
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Search the parcel listing.
#[utoipa::path(
    get,
    path = "/api/v1/parcels",
    params(SearchParcelsParams),
    responses(
        (status = 200, description = "Matching parcels, newest first", body = SearchParcelsResponse),
        (status = 503, description = "Service unavailable", body = crate::domain::Error)
    ),
    tags = ["parcels"],
    operation_id = "searchParcels"
)]
#[get("/parcels")]
pub async fn search_parcels(
    state: web::Data<HttpState>,
    params: web::Query<SearchParcelsParams>,
) -> ApiResult<web::Json<SearchParcelsResponse>> {
    let params = params.into_inner();
    let response = state
        .parcels_query
        .search_parcels(SearchParcelsRequest {
            tracking_code: params.tracking_code,
            status: params.status,
            contact_email: params.contact_email,
            offset: params.offset,
            limit: params.limit,
        })
        .await?;
    Ok(web::Json(response))
}

#[cfg(test)]
#[path = "parcels_tests.rs"]
mod tests;
