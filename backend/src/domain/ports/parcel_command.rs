//! Driving port for parcel mutations.
//!
//! Inbound adapters register parcels and record movements through this port
//! without depending on service or repository details.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::parcel::{
    Coordinates, Dimensions, Parcel, ParcelIntake, ParcelStatus, TrackingCode,
};
use crate::domain::Error;

/// Serializable parcel projection for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParcelPayload {
    pub id: Uuid,
    pub tracking_code: String,
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

impl From<Parcel> for ParcelPayload {
    fn from(value: Parcel) -> Self {
        Self {
            id: value.id,
            tracking_code: value.tracking_code.to_string(),
            sender_name: value.sender_name,
            sender_email: value.sender_email,
            sender_phone: value.sender_phone,
            recipient_name: value.recipient_name,
            recipient_email: value.recipient_email,
            recipient_phone: value.recipient_phone,
            recipient_address: value.recipient_address,
            destination_country: value.destination_country,
            weight_kg: value.weight_kg,
            dimensions: value.dimensions,
            shipping_cost: value.shipping_cost,
            border_fee: value.border_fee,
            status: value.status,
            current_location: value.current_location,
            coordinates: value.coordinates,
            border_fee_paid: value.border_fee_paid,
            estimated_delivery: value.estimated_delivery,
            actual_delivery: value.actual_delivery,
            user_id: value.user_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Request to register a new parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterParcelRequest {
    pub sender_name: String,
    pub sender_email: String,
    #[serde(default)]
    pub sender_phone: String,
    pub recipient_name: String,
    pub recipient_email: String,
    #[serde(default)]
    pub recipient_phone: String,
    pub recipient_address: String,
    pub destination_country: String,
    pub weight_kg: f64,
    pub dimensions: Dimensions,
    pub user_id: Option<Uuid>,
}

impl From<RegisterParcelRequest> for ParcelIntake {
    fn from(value: RegisterParcelRequest) -> Self {
        Self {
            sender_name: value.sender_name,
            sender_email: value.sender_email,
            sender_phone: value.sender_phone,
            recipient_name: value.recipient_name,
            recipient_email: value.recipient_email,
            recipient_phone: value.recipient_phone,
            recipient_address: value.recipient_address,
            destination_country: value.destination_country,
            weight_kg: value.weight_kg,
            dimensions: value.dimensions,
            user_id: value.user_id,
        }
    }
}

/// Response from registering a parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterParcelResponse {
    pub parcel: ParcelPayload,
}

/// Request to record a movement scan against a parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceParcelRequest {
    pub tracking_code: String,
    pub location: String,
    pub status: ParcelStatus,
    pub coordinates: Option<Coordinates>,
    pub description: Option<String>,
}

/// Response from recording a movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceParcelResponse {
    pub parcel: ParcelPayload,
}

/// Driving port for parcel write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParcelCommand: Send + Sync {
    /// Registers a parcel, assigning a tracking code, computed fees, and the
    /// initial `pending` ledger entry.
    async fn register_parcel(
        &self,
        request: RegisterParcelRequest,
    ) -> Result<RegisterParcelResponse, Error>;

    /// Records a status/location change and appends the matching ledger
    /// entry.
    async fn advance_parcel(
        &self,
        request: AdvanceParcelRequest,
    ) -> Result<AdvanceParcelResponse, Error>;
}

/// Fixture command implementation for tests that do not need persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureParcelCommand;

#[async_trait]
impl ParcelCommand for FixtureParcelCommand {
    async fn register_parcel(
        &self,
        request: RegisterParcelRequest,
    ) -> Result<RegisterParcelResponse, Error> {
        let now = Utc::now();
        let code = TrackingCode::generate(now, &mut rand::thread_rng());
        let parcel = Parcel::register(request.into(), code, now)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        Ok(RegisterParcelResponse {
            parcel: parcel.into(),
        })
    }

    async fn advance_parcel(
        &self,
        request: AdvanceParcelRequest,
    ) -> Result<AdvanceParcelResponse, Error> {
        Err(Error::not_found(format!(
            "parcel {} not found",
            request.tracking_code
        )))
    }
}
