//! Backend entry-point: wires the PostgreSQL, processor, and auth adapters
//! into the domain services and serves the REST API.

use std::env;
use std::io;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use reqwest::Url;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use backend::ApiDoc;
use backend::domain::{
    ParcelCommandService, ParcelQueryService, PaymentCommandService, PaymentQueryService,
    UserCommandService,
};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::inbound::http::{parcels, payments, tracking, users};
use backend::outbound::auth::Argon2AuthProvider;
use backend::outbound::notify::TracingTrackingNotifier;
use backend::outbound::persistence::{
    DbPool, DieselParcelRepository, DieselPaymentRepository, DieselUserRepository, PoolConfig,
};
use backend::outbound::processor::{HmacWebhookVerifier, HttpPaymentGateway};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PROCESSOR_BASE_URL: &str = "https://api.stripe.com/";

fn required_env(name: &str) -> io::Result<String> {
    env::var(name).map_err(|_| io::Error::other(format!("{name} must be set")))
}

/// Startup configuration assembled from the environment.
struct ServerConfig {
    database_url: String,
    bind_addr: String,
    processor_base_url: Url,
    processor_secret_key: String,
    processor_webhook_secret: String,
    auth_signing_key: String,
}

impl ServerConfig {
    fn from_env() -> io::Result<Self> {
        let processor_base_url = env::var("PROCESSOR_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_PROCESSOR_BASE_URL.into());
        let processor_base_url = Url::parse(&processor_base_url)
            .map_err(|err| io::Error::other(format!("PROCESSOR_BASE_URL: {err}")))?;

        Ok(Self {
            database_url: required_env("DATABASE_URL")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into()),
            processor_base_url,
            processor_secret_key: required_env("PROCESSOR_SECRET_KEY")?,
            processor_webhook_secret: required_env("PROCESSOR_WEBHOOK_SECRET")?,
            auth_signing_key: required_env("AUTH_SIGNING_KEY")?,
        })
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = ServerConfig::from_env()?;

    let pool = DbPool::new(PoolConfig::new(config.database_url))
        .await
        .map_err(|err| io::Error::other(format!("database pool: {err}")))?;

    let gateway = Arc::new(
        HttpPaymentGateway::new(config.processor_base_url, config.processor_secret_key)
            .map_err(|err| io::Error::other(format!("processor client: {err}")))?,
    );
    let verifier = Arc::new(HmacWebhookVerifier::new(
        config.processor_webhook_secret.into_bytes(),
    ));
    let auth = Arc::new(Argon2AuthProvider::new(config.auth_signing_key.into_bytes()));
    let notifier = Arc::new(TracingTrackingNotifier);

    let parcel_repo = Arc::new(DieselParcelRepository::new(pool.clone()));
    let payment_repo = Arc::new(DieselPaymentRepository::new(pool.clone()));
    let user_repo = Arc::new(DieselUserRepository::new(pool));

    let state = HttpState::new(HttpStatePorts {
        parcels: Arc::new(ParcelCommandService::new(
            Arc::clone(&parcel_repo),
            Arc::clone(&notifier),
        )),
        parcels_query: Arc::new(ParcelQueryService::new(Arc::clone(&parcel_repo))),
        payments: Arc::new(PaymentCommandService::new(
            Arc::clone(&payment_repo),
            parcel_repo,
            gateway,
            verifier,
            notifier,
        )),
        payments_query: Arc::new(PaymentQueryService::new(payment_repo)),
        users: Arc::new(UserCommandService::new(user_repo, auth)),
    });

    HttpServer::new(move || build_app(state.clone()))
        .bind(config.bind_addr)?
        .run()
        .await
}

fn build_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .service(parcels::register_parcel)
        .service(parcels::get_parcel)
        .service(parcels::advance_parcel)
        .service(parcels::search_parcels)
        .service(tracking::track_parcel)
        .service(payments::initiate_border_payment)
        .service(payments::processor_webhook)
        .service(payments::get_payment)
        .service(users::register_user)
        .service(users::login);

    let app = App::new().app_data(web::Data::new(state)).service(api);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}
