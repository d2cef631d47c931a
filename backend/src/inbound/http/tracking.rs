//! Public tracking lookup.
//!
//! ```text
//! GET /api/v1/track/{trackingCode}
//! ```

use actix_web::{get, web};

use crate::domain::ports::{TrackParcelRequest, TrackParcelResponse};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Look up a parcel and its full tracking history.
#[utoipa::path(
    get,
    path = "/api/v1/track/{trackingCode}",
    responses(
        (status = 200, description = "Parcel with tracking history", body = TrackParcelResponse),
        (status = 400, description = "Malformed tracking code", body = crate::domain::Error),
        (status = 404, description = "Unknown tracking code", body = crate::domain::Error),
        (status = 503, description = "Service unavailable", body = crate::domain::Error)
    ),
    params(
        ("trackingCode" = String, Path, description = "Parcel tracking code")
    ),
    tags = ["tracking"],
    operation_id = "trackParcel"
)]
#[get("/track/{tracking_code}")]
pub async fn track_parcel(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<TrackParcelResponse>> {
    let response = state
        .parcels_query
        .track_parcel(TrackParcelRequest {
            tracking_code: path.into_inner(),
        })
        .await?;
    Ok(web::Json(response))
}
