//! Payment aggregate for processor-collected fees.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Currency every processor charge is denominated in.
pub const PAYMENT_CURRENCY: &str = "usd";

/// Category of fee a payment settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    BorderFee,
    ShippingFee,
    Tax,
}

impl PaymentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BorderFee => "border_fee",
            Self::ShippingFee => "shipping_fee",
            Self::Tax => "tax",
        }
    }
}

impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentKind {
    type Err = UnknownPaymentValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "border_fee" => Ok(Self::BorderFee),
            "shipping_fee" => Ok(Self::ShippingFee),
            "tax" => Ok(Self::Tax),
            other => Err(UnknownPaymentValue {
                value: other.to_owned(),
            }),
        }
    }
}

/// Lifecycle of a single payment attempt.
///
/// `pending → completed | failed`; `completed → refunded`. The refund flow
/// itself is out of scope; the member exists so stored rows stay
/// representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Whether the status machine permits moving to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed)
                | (Self::Pending, Self::Failed)
                | (Self::Completed, Self::Refunded)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownPaymentValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(UnknownPaymentValue {
                value: other.to_owned(),
            }),
        }
    }
}

/// Error returned when decoding a payment kind or status outside the enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment value: {value}")]
pub struct UnknownPaymentValue {
    pub value: String,
}

/// A fee-collection attempt against the external processor.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub parcel_id: Uuid,
    /// Processor-assigned reference, unique across all payments.
    pub processor_ref: String,
    pub kind: PaymentKind,
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    /// Opaque processor metadata (contact email, card summary once known).
    pub details: Value,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Build a pending payment awaiting processor confirmation.
    pub fn pending(
        parcel_id: Uuid,
        processor_ref: impl Into<String>,
        kind: PaymentKind,
        amount: f64,
        details: Value,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            parcel_id,
            processor_ref: processor_ref.into(),
            kind,
            amount,
            currency: PAYMENT_CURRENCY.to_owned(),
            status: PaymentStatus::Pending,
            details,
            completed_at: None,
            created_at: now,
        }
    }
}

/// Convert a major-unit amount to the minor units the processor expects.
pub fn to_minor_units(amount: f64) -> i64 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "fees are bounded table values well inside i64 range"
    )]
    let minor = (amount * 100.0).round() as i64;
    minor
}
