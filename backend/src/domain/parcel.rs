//! Parcel aggregate and its value types.
//!
//! A parcel is registered once, then mutated only through the lifecycle
//! service; it is never deleted (audit requirement). The tracking code is a
//! human-facing identifier distinct from the internal uuid and is immutable
//! after creation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::fees;

/// Location every parcel starts from.
pub const ORIGIN_LOCATION: &str = "Warehouse - Origin";

/// Days added to the registration time to produce the delivery estimate.
const ESTIMATED_DELIVERY_DAYS: i64 = 7;

/// Upper bound on declared weight in kilograms (exclusive lower bound zero).
const MAX_WEIGHT_KG: f64 = 100.0;

/// Closed set of logistics states a parcel moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    Pending,
    Collected,
    InTransit,
    AtBorder,
    BorderCleared,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl ParcelStatus {
    /// Wire name of the status, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Collected => "collected",
            Self::InTransit => "in_transit",
            Self::AtBorder => "at_border",
            Self::BorderCleared => "border_cleared",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a status outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parcel status: {value}")]
pub struct UnknownParcelStatus {
    pub value: String,
}

impl FromStr for ParcelStatus {
    type Err = UnknownParcelStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "collected" => Ok(Self::Collected),
            "in_transit" => Ok(Self::InTransit),
            "at_border" => Ok(Self::AtBorder),
            "border_cleared" => Ok(Self::BorderCleared),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownParcelStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// Human-facing unique shipment identifier.
///
/// Format: three-letter prefix, six-digit date (YYMMDD), eight random
/// uppercase alphanumerics, e.g. `CWY260828K4QZ71MB`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackingCode(String);

/// Prefix stamped on every generated tracking code.
pub const TRACKING_CODE_PREFIX: &str = "CWY";

const TRACKING_CODE_RANDOM_LEN: usize = 8;
const TRACKING_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Validation errors for [`TrackingCode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackingCodeError {
    #[error("tracking code must be 17 characters, got {length}")]
    Length { length: usize },
    #[error("tracking code must be <3 letters><6 digits><8 alphanumerics>")]
    Format,
}

impl TrackingCode {
    /// Generate a fresh code stamped with `now`'s date.
    ///
    /// Uniqueness is enforced by the store, not here; a collision surfaces as
    /// a conflict from the repository and the caller regenerates.
    pub fn generate(now: DateTime<Utc>, rng: &mut impl Rng) -> Self {
        let date = now.format("%y%m%d");
        let random: String = (0..TRACKING_CODE_RANDOM_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..TRACKING_CODE_ALPHABET.len());
                char::from(TRACKING_CODE_ALPHABET[idx])
            })
            .collect();
        Self(format!("{TRACKING_CODE_PREFIX}{date}{random}"))
    }

    /// Validate and wrap an externally supplied code.
    pub fn parse(value: impl Into<String>) -> Result<Self, TrackingCodeError> {
        let value = value.into();
        let expected = 3 + 6 + TRACKING_CODE_RANDOM_LEN;
        if value.chars().count() != expected {
            return Err(TrackingCodeError::Length {
                length: value.chars().count(),
            });
        }
        let bytes = value.as_bytes();
        let prefix_ok = bytes[..3].iter().all(u8::is_ascii_uppercase);
        let date_ok = bytes[3..9].iter().all(u8::is_ascii_digit);
        let random_ok = bytes[9..]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        if prefix_ok && date_ok && random_ok {
            Ok(Self(value))
        } else {
            Err(TrackingCodeError::Format)
        }
    }

    /// Borrow the underlying code.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for TrackingCode {
    type Error = TrackingCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TrackingCode> for String {
    fn from(code: TrackingCode) -> Self {
        code.0
    }
}

/// Declared package dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub unit: DimensionUnit,
}

/// Unit the dimensions are declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    Cm,
    In,
}

/// Geographic point attached to a location scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Intake data supplied when registering a parcel.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelIntake {
    pub sender_name: String,
    pub sender_email: String,
    pub sender_phone: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub recipient_phone: String,
    pub recipient_address: String,
    pub destination_country: String,
    pub weight_kg: f64,
    pub dimensions: Dimensions,
    pub user_id: Option<Uuid>,
}

/// Validation errors raised during parcel registration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParcelValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("{field} is not a plausible email address")]
    InvalidEmail { field: &'static str },
    #[error("weight must be in (0, {MAX_WEIGHT_KG}] kg, got {weight}")]
    WeightOutOfRange { weight: f64 },
    #[error("dimensions must be positive")]
    NonPositiveDimensions,
}

fn require_non_empty(value: &str, field: &'static str) -> Result<(), ParcelValidationError> {
    if value.trim().is_empty() {
        Err(ParcelValidationError::EmptyField { field })
    } else {
        Ok(())
    }
}

/// Cheap plausibility check, not an RFC 5321 validator: one `@` with
/// non-empty local part and a dotted domain.
fn require_plausible_email(value: &str, field: &'static str) -> Result<(), ParcelValidationError> {
    let invalid = ParcelValidationError::InvalidEmail { field };
    let Some((local, domain)) = value.split_once('@') else {
        return Err(invalid);
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || value.contains(' ') {
        return Err(invalid);
    }
    Ok(())
}

/// A registered shipment.
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    pub id: Uuid,
    pub tracking_code: TrackingCode,
    pub sender_name: String,
    pub sender_email: String,
    pub sender_phone: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub recipient_phone: String,
    pub recipient_address: String,
    pub destination_country: String,
    pub weight_kg: f64,
    pub dimensions: Dimensions,
    pub shipping_cost: f64,
    pub border_fee: f64,
    pub status: ParcelStatus,
    pub current_location: String,
    pub coordinates: Option<Coordinates>,
    pub border_fee_paid: bool,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Parcel {
    /// Validate intake data and build a pending parcel with computed fees.
    pub fn register(
        intake: ParcelIntake,
        tracking_code: TrackingCode,
        now: DateTime<Utc>,
    ) -> Result<Self, ParcelValidationError> {
        require_non_empty(&intake.sender_name, "sender_name")?;
        require_non_empty(&intake.recipient_name, "recipient_name")?;
        require_non_empty(&intake.recipient_address, "recipient_address")?;
        require_non_empty(&intake.destination_country, "destination_country")?;
        require_plausible_email(&intake.sender_email, "sender_email")?;
        require_plausible_email(&intake.recipient_email, "recipient_email")?;

        if !(intake.weight_kg > 0.0 && intake.weight_kg <= MAX_WEIGHT_KG) {
            return Err(ParcelValidationError::WeightOutOfRange {
                weight: intake.weight_kg,
            });
        }
        let dims = intake.dimensions;
        if dims.length <= 0.0 || dims.width <= 0.0 || dims.height <= 0.0 {
            return Err(ParcelValidationError::NonPositiveDimensions);
        }

        let shipping_cost = fees::shipping_cost(intake.weight_kg, &intake.destination_country);
        let border_fee = fees::border_fee(&intake.destination_country);

        Ok(Self {
            id: Uuid::new_v4(),
            tracking_code,
            sender_name: intake.sender_name,
            sender_email: intake.sender_email,
            sender_phone: intake.sender_phone,
            recipient_name: intake.recipient_name,
            recipient_email: intake.recipient_email,
            recipient_phone: intake.recipient_phone,
            recipient_address: intake.recipient_address,
            destination_country: intake.destination_country,
            weight_kg: intake.weight_kg,
            dimensions: intake.dimensions,
            shipping_cost,
            border_fee,
            status: ParcelStatus::Pending,
            current_location: ORIGIN_LOCATION.to_owned(),
            coordinates: None,
            border_fee_paid: false,
            estimated_delivery: Some(now + Duration::days(ESTIMATED_DELIVERY_DAYS)),
            actual_delivery: None,
            user_id: intake.user_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrite location and status from an operator or scan event.
    ///
    /// No transition graph is enforced: any member of the status enum is
    /// accepted. Whether that permissiveness should be tightened to an
    /// allowed-next-states table is an open product question.
    pub fn advance(
        &mut self,
        location: String,
        status: ParcelStatus,
        coordinates: Option<Coordinates>,
        now: DateTime<Utc>,
    ) {
        self.current_location = location;
        self.status = status;
        if coordinates.is_some() {
            self.coordinates = coordinates;
        }
        if status == ParcelStatus::Delivered && self.actual_delivery.is_none() {
            self.actual_delivery = Some(now);
        }
        self.updated_at = now;
    }

    /// Release the parcel from customs hold after a completed border-fee
    /// payment.
    pub fn clear_border(&mut self, now: DateTime<Utc>) {
        self.border_fee_paid = true;
        self.status = ParcelStatus::BorderCleared;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn intake() -> ParcelIntake {
        ParcelIntake {
            sender_name: "Ada Osei".to_owned(),
            sender_email: "ada@example.com".to_owned(),
            sender_phone: "+44 20 7946 0000".to_owned(),
            recipient_name: "Bo Lindqvist".to_owned(),
            recipient_email: "bo@example.net".to_owned(),
            recipient_phone: "+1 212 555 0100".to_owned(),
            recipient_address: "1 Main St, Springfield".to_owned(),
            destination_country: "US".to_owned(),
            weight_kg: 5.0,
            dimensions: Dimensions {
                length: 30.0,
                width: 20.0,
                height: 15.0,
                unit: DimensionUnit::Cm,
            },
            user_id: None,
        }
    }

    fn code() -> TrackingCode {
        TrackingCode::parse("CWY260828K4QZ71MB").expect("valid code")
    }

    #[rstest]
    fn register_computes_fees_and_defaults(intake: ParcelIntake) {
        let now = Utc::now();
        let parcel = Parcel::register(intake, code(), now).expect("valid intake");

        assert_eq!(parcel.status, ParcelStatus::Pending);
        assert_eq!(parcel.current_location, ORIGIN_LOCATION);
        assert!((parcel.shipping_cost - 24.0).abs() < f64::EPSILON);
        assert!((parcel.border_fee - 25.0).abs() < f64::EPSILON);
        assert!(!parcel.border_fee_paid);
        assert_eq!(
            parcel.estimated_delivery,
            Some(now + Duration::days(7)),
            "ETA is registration time plus seven days"
        );
        assert!(parcel.actual_delivery.is_none());
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(100.01)]
    #[case(f64::NAN)]
    fn register_rejects_out_of_range_weight(mut intake: ParcelIntake, #[case] weight: f64) {
        intake.weight_kg = weight;
        let err = Parcel::register(intake, code(), Utc::now()).expect_err("invalid weight");
        assert!(matches!(err, ParcelValidationError::WeightOutOfRange { .. }));
    }

    #[rstest]
    fn register_accepts_the_boundary_weight(mut intake: ParcelIntake) {
        intake.weight_kg = 100.0;
        Parcel::register(intake, code(), Utc::now()).expect("100 kg is inclusive");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn register_rejects_blank_names(mut intake: ParcelIntake, #[case] name: &str) {
        intake.recipient_name = name.to_owned();
        let err = Parcel::register(intake, code(), Utc::now()).expect_err("blank name");
        assert_eq!(
            err,
            ParcelValidationError::EmptyField {
                field: "recipient_name"
            }
        );
    }

    #[rstest]
    #[case("not-an-email")]
    #[case("@nodomain")]
    #[case("user@")]
    #[case("user@nodot")]
    #[case("spaced user@example.com")]
    fn register_rejects_implausible_emails(mut intake: ParcelIntake, #[case] email: &str) {
        intake.sender_email = email.to_owned();
        let err = Parcel::register(intake, code(), Utc::now()).expect_err("bad email");
        assert!(matches!(err, ParcelValidationError::InvalidEmail { .. }));
    }

    #[rstest]
    fn register_rejects_non_positive_dimensions(mut intake: ParcelIntake) {
        intake.dimensions.height = 0.0;
        let err = Parcel::register(intake, code(), Utc::now()).expect_err("flat box");
        assert_eq!(err, ParcelValidationError::NonPositiveDimensions);
    }

    #[rstest]
    fn generated_codes_match_the_documented_format() {
        let mut rng = rand::thread_rng();
        let now = Utc::now();
        for _ in 0..32 {
            let generated = TrackingCode::generate(now, &mut rng);
            TrackingCode::parse(generated.as_str()).expect("generated code re-parses");
            assert!(generated.as_str().starts_with(TRACKING_CODE_PREFIX));
            assert_eq!(generated.as_str().len(), 17);
        }
    }

    #[rstest]
    #[case("CWY2608")]
    #[case("cwy260828K4QZ71MB")]
    #[case("CWYAB0828K4QZ71MB")]
    #[case("CWY260828k4qz71mb")]
    #[case("CWY260828K4QZ71M!")]
    fn malformed_codes_are_rejected(#[case] raw: &str) {
        TrackingCode::parse(raw).expect_err("malformed code");
    }

    #[rstest]
    fn advance_overwrites_location_and_stamps_updated_at(intake: ParcelIntake) {
        let registered_at = Utc::now();
        let mut parcel = Parcel::register(intake, code(), registered_at).expect("valid");
        let later = registered_at + Duration::hours(6);

        parcel.advance(
            "Border Checkpoint".to_owned(),
            ParcelStatus::AtBorder,
            Some(Coordinates {
                lat: 49.0,
                lng: 8.4,
            }),
            later,
        );

        assert_eq!(parcel.status, ParcelStatus::AtBorder);
        assert_eq!(parcel.current_location, "Border Checkpoint");
        assert_eq!(parcel.updated_at, later);
        assert!(parcel.coordinates.is_some());
        assert!(parcel.actual_delivery.is_none());
    }

    #[rstest]
    fn advance_keeps_prior_coordinates_when_none_supplied(intake: ParcelIntake) {
        let now = Utc::now();
        let mut parcel = Parcel::register(intake, code(), now).expect("valid");
        parcel.advance(
            "Hub".to_owned(),
            ParcelStatus::InTransit,
            Some(Coordinates { lat: 1.0, lng: 2.0 }),
            now,
        );
        parcel.advance("Hub 2".to_owned(), ParcelStatus::InTransit, None, now);
        assert!(parcel.coordinates.is_some(), "last known point is retained");
    }

    #[rstest]
    fn delivery_stamps_actual_delivery_once(intake: ParcelIntake) {
        let now = Utc::now();
        let mut parcel = Parcel::register(intake, code(), now).expect("valid");
        let first = now + Duration::days(3);
        parcel.advance("Doorstep".to_owned(), ParcelStatus::Delivered, None, first);
        parcel.advance(
            "Doorstep".to_owned(),
            ParcelStatus::Delivered,
            None,
            first + Duration::hours(1),
        );
        assert_eq!(parcel.actual_delivery, Some(first));
    }

    #[rstest]
    fn clear_border_flips_flag_and_status(intake: ParcelIntake) {
        let now = Utc::now();
        let mut parcel = Parcel::register(intake, code(), now).expect("valid");
        parcel.advance("Border".to_owned(), ParcelStatus::AtBorder, None, now);
        parcel.clear_border(now);
        assert!(parcel.border_fee_paid);
        assert_eq!(parcel.status, ParcelStatus::BorderCleared);
    }

    #[rstest]
    fn status_round_trips_through_from_str() {
        for status in [
            ParcelStatus::Pending,
            ParcelStatus::Collected,
            ParcelStatus::InTransit,
            ParcelStatus::AtBorder,
            ParcelStatus::BorderCleared,
            ParcelStatus::OutForDelivery,
            ParcelStatus::Delivered,
            ParcelStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<ParcelStatus>(), Ok(status));
        }
        assert!("lost_in_the_post".parse::<ParcelStatus>().is_err());
    }
}
