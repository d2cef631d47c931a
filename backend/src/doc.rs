//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the REST API: every HTTP endpoint from the inbound layer, the shared
//! payload schemas, and the bearer token security scheme. The generated
//! specification backs Swagger UI in debug builds.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{
    AdvanceParcelResponse, AuthenticatedResponse, GetPaymentResponse,
    InitiateBorderPaymentRequest, InitiateBorderPaymentResponse, LoginRequest, ParcelPayload,
    PaymentPayload, RegisterParcelRequest, RegisterParcelResponse, RegisterUserRequest,
    SearchParcelsResponse, TrackParcelResponse, TrackingEventPayload, UserPayload,
};
use crate::domain::{Error, ErrorCode};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Crossway backend API",
        description = "Parcel tracking and border-fee collection for cross-border shipments."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::parcels::register_parcel,
        crate::inbound::http::parcels::get_parcel,
        crate::inbound::http::parcels::advance_parcel,
        crate::inbound::http::parcels::search_parcels,
        crate::inbound::http::tracking::track_parcel,
        crate::inbound::http::payments::initiate_border_payment,
        crate::inbound::http::payments::processor_webhook,
        crate::inbound::http::payments::get_payment,
        crate::inbound::http::users::register_user,
        crate::inbound::http::users::login,
    ),
    components(schemas(
        Error,
        ErrorCode,
        ParcelPayload,
        RegisterParcelRequest,
        RegisterParcelResponse,
        AdvanceParcelResponse,
        TrackingEventPayload,
        TrackParcelResponse,
        SearchParcelsResponse,
        InitiateBorderPaymentRequest,
        InitiateBorderPaymentResponse,
        PaymentPayload,
        GetPaymentResponse,
        UserPayload,
        RegisterUserRequest,
        LoginRequest,
        AuthenticatedResponse,
    )),
    tags(
        (name = "parcels", description = "Parcel registration, movement, and search"),
        (name = "tracking", description = "Public tracking lookups"),
        (name = "payments", description = "Border-fee collection and settlement"),
        (name = "users", description = "Account registration and login")
    )
)]
pub struct ApiDoc;
