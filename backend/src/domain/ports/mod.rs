//! Domain ports and supporting types for the hexagonal boundary.

mod auth;
mod notifier;
mod parcel_command;
mod parcel_query;
mod parcel_repository;
mod payment_command;
mod payment_gateway;
mod payment_query;
mod payment_repository;
mod user_command;
mod user_repository;
mod webhook_verifier;

#[cfg(test)]
pub use auth::MockAuthProvider;
pub use auth::{AuthProvider, AuthProviderError, FixtureAuthProvider, TokenClaims};
#[cfg(test)]
pub use notifier::MockTrackingNotifier;
pub use notifier::{NoopTrackingNotifier, TrackingNotifier};
#[cfg(test)]
pub use parcel_command::MockParcelCommand;
pub use parcel_command::{
    AdvanceParcelRequest, AdvanceParcelResponse, FixtureParcelCommand, ParcelCommand,
    ParcelPayload, RegisterParcelRequest, RegisterParcelResponse,
};
#[cfg(test)]
pub use parcel_query::MockParcelQuery;
pub use parcel_query::{
    FixtureParcelQuery, ParcelQuery, SearchParcelsRequest, SearchParcelsResponse,
    TrackParcelRequest, TrackParcelResponse, TrackingEventPayload,
};
#[cfg(test)]
pub use parcel_repository::MockParcelRepository;
pub use parcel_repository::{
    FixtureParcelRepository, MAX_PAGE_LIMIT, Page, ParcelRepository, ParcelRepositoryError,
    ParcelSearchFilter,
};
#[cfg(test)]
pub use payment_command::MockPaymentCommand;
pub use payment_command::{
    FixturePaymentCommand, InitiateBorderPaymentRequest, InitiateBorderPaymentResponse,
    PaymentCommand, ProcessorEventDelivery, WebhookOutcome,
};
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub use payment_gateway::{
    FixturePaymentGateway, PaymentGateway, PaymentGatewayError, PaymentIntent,
    PaymentIntentRequest,
};
#[cfg(test)]
pub use payment_query::MockPaymentQuery;
pub use payment_query::{
    FixturePaymentQuery, GetPaymentRequest, GetPaymentResponse, PaymentPayload, PaymentQuery,
};
#[cfg(test)]
pub use payment_repository::MockPaymentRepository;
pub use payment_repository::{
    BorderFeeClearance, FixturePaymentRepository, PaymentRepository, PaymentRepositoryError,
};
#[cfg(test)]
pub use user_command::MockUserCommand;
pub use user_command::{
    AuthenticatedResponse, FixtureUserCommand, LoginRequest, RegisterUserRequest, UserCommand,
    UserPayload,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserRepository, UserRepositoryError};
#[cfg(test)]
pub use webhook_verifier::MockWebhookVerifier;
pub use webhook_verifier::{
    FixtureWebhookVerifier, ProcessorEvent, WebhookError, WebhookVerifier,
};
