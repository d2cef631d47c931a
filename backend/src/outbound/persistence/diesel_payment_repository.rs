//! PostgreSQL-backed `PaymentRepository` implementation using Diesel ORM.
//!
//! Settlement of a border fee is the one place where three tables change
//! together: the payment row, the parcel row, and the tracking ledger. The
//! whole set is applied inside a single transaction so a webhook retry can
//! never observe a half-settled state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::payment::{Payment, PaymentStatus};
use crate::domain::ports::{BorderFeeClearance, PaymentRepository, PaymentRepositoryError};

use super::diesel_error::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_parcel_repository::{event_to_new_row, parcel_to_movement_changeset};
use super::models::{NewPaymentRow, PaymentRow};
use super::pool::{DbPool, PoolError};
use super::schema::{parcels, payments, tracking_events};

/// Diesel-backed implementation of the payment repository port.
#[derive(Clone)]
pub struct DieselPaymentRepository {
    pool: DbPool,
}

impl DieselPaymentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PaymentRepositoryError {
    map_basic_pool_error(error, PaymentRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PaymentRepositoryError {
    map_basic_diesel_error(
        error,
        PaymentRepositoryError::query,
        PaymentRepositoryError::connection,
    )
}

fn payment_to_new_row(payment: &Payment) -> NewPaymentRow<'_> {
    NewPaymentRow {
        id: payment.id,
        parcel_id: payment.parcel_id,
        processor_ref: &payment.processor_ref,
        kind: payment.kind.as_str(),
        amount: payment.amount,
        currency: &payment.currency,
        status: payment.status.as_str(),
        details: &payment.details,
        completed_at: payment.completed_at,
        created_at: payment.created_at,
    }
}

/// Convert a database row into a domain payment.
fn row_to_payment(row: PaymentRow) -> Result<Payment, PaymentRepositoryError> {
    let kind = row
        .kind
        .parse()
        .map_err(|err| PaymentRepositoryError::query(format!("stored payment kind: {err}")))?;
    let status = row
        .status
        .parse()
        .map_err(|err| PaymentRepositoryError::query(format!("stored payment status: {err}")))?;

    Ok(Payment {
        id: row.id,
        parcel_id: row.parcel_id,
        processor_ref: row.processor_ref,
        kind,
        amount: row.amount,
        currency: row.currency,
        status,
        details: row.details,
        completed_at: row.completed_at,
        created_at: row.created_at,
    })
}

#[async_trait]
impl PaymentRepository for DieselPaymentRepository {
    async fn create(&self, payment: &Payment) -> Result<(), PaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(payments::table)
            .values(payment_to_new_row(payment))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        payment_id: Uuid,
    ) -> Result<Option<Payment>, PaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = payments::table
            .filter(payments::id.eq(payment_id))
            .select(PaymentRow::as_select())
            .first::<PaymentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_payment).transpose()
    }

    async fn find_by_processor_ref(
        &self,
        processor_ref: &str,
    ) -> Result<Option<Payment>, PaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = payments::table
            .filter(payments::processor_ref.eq(processor_ref))
            .select(PaymentRow::as_select())
            .first::<PaymentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_payment).transpose()
    }

    async fn mark_failed(&self, payment_id: Uuid) -> Result<(), PaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(payments::table.filter(payments::id.eq(payment_id)))
            .set(payments::status.eq(PaymentStatus::Failed.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(())
    }

    async fn mark_completed(
        &self,
        payment_id: Uuid,
        completed_at: DateTime<Utc>,
        details: Value,
    ) -> Result<(), PaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(payments::table.filter(payments::id.eq(payment_id)))
            .set((
                payments::status.eq(PaymentStatus::Completed.as_str()),
                payments::completed_at.eq(Some(completed_at)),
                payments::details.eq(&details),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(())
    }

    async fn complete_border_fee(
        &self,
        clearance: &BorderFeeClearance,
    ) -> Result<(), PaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let payment_id = clearance.payment_id;
        let completed_at = clearance.completed_at;
        let details = &clearance.details;
        let parcel_id = clearance.parcel.id;
        let changeset = parcel_to_movement_changeset(&clearance.parcel);
        let new_event = event_to_new_row(&clearance.event);

        conn.transaction(|conn| {
            async move {
                diesel::update(payments::table.filter(payments::id.eq(payment_id)))
                    .set((
                        payments::status.eq(PaymentStatus::Completed.as_str()),
                        payments::completed_at.eq(Some(completed_at)),
                        payments::details.eq(details),
                    ))
                    .execute(conn)
                    .await?;
                diesel::update(parcels::table.filter(parcels::id.eq(parcel_id)))
                    .set(&changeset)
                    .execute(conn)
                    .await?;
                diesel::insert_into(tracking_events::table)
                    .values(&new_event)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
