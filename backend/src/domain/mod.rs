//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the strongly typed core of the tracking and payment
//! system — parcels, their append-only ledger, fee-collection payments, and
//! accounts — plus the services that implement the driving ports. Adapters
//! on either side of the hexagon depend on this module, never the reverse.

pub mod error;
pub mod fees;
pub mod parcel;
mod parcel_service;
pub mod payment;
mod payment_service;
pub mod ports;
pub mod tracking;
pub mod user;
mod user_service;

pub use self::error::{Error, ErrorCode};
pub use self::parcel::{
    Coordinates, DimensionUnit, Dimensions, ORIGIN_LOCATION, Parcel, ParcelIntake, ParcelStatus,
    ParcelValidationError, TRACKING_CODE_PREFIX, TrackingCode, TrackingCodeError,
    UnknownParcelStatus,
};
pub use self::parcel_service::{ParcelCommandService, ParcelQueryService};
pub use self::payment::{
    PAYMENT_CURRENCY, Payment, PaymentKind, PaymentStatus, UnknownPaymentValue, to_minor_units,
};
pub use self::payment_service::{PaymentCommandService, PaymentQueryService};
pub use self::tracking::TrackingEvent;
pub use self::user::{User, UserValidationError};
pub use self::user_service::UserCommandService;

/// Convenient API result alias.
pub type ApiResult<T> = Result<T, Error>;
