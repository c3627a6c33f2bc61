//! Payment repository implementation
//!
//! Provides PostgreSQL-backed storage for payments. The schema enforces
//! one payment per booking; a racing duplicate insert surfaces as
//! `AlreadyExists` rather than corrupting state.

use crate::repositories::is_unique_violation;
use rentora_core::{
    models::{Payment, PaymentMethod, PaymentStatus},
    traits::{PaymentRepository, Repository},
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of PaymentRepository
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    /// Create a new payment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse payment status from string
    fn parse_status(s: &str) -> PaymentStatus {
        PaymentStatus::from_str(s).unwrap_or(PaymentStatus::Pending)
    }

    /// Parse payment method from string
    fn parse_method(s: &str) -> PaymentMethod {
        PaymentMethod::from_str(s).unwrap_or(PaymentMethod::CreditCard)
    }
}

#[async_trait]
impl Repository<Payment, i64> for PgPaymentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Payment>> {
        debug!("Finding payment by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, PaymentRow>(
            r#"
            SELECT
                id, booking_id, renter_id, amount,
                payment_method, payment_status,
                transaction_id, payment_date
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding payment {}: {}", id, e);
            AppError::Database(format!("Failed to find payment: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Payment>> {
        let rows = sqlx::query_as::<sqlx::Postgres, PaymentRow>(
            r#"
            SELECT
                id, booking_id, renter_id, amount,
                payment_method, payment_status,
                transaction_id, payment_date
            FROM payments
            ORDER BY payment_date DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding payments: {}", e);
            AppError::Database(format!("Failed to fetch payments: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting payments: {}", e);
                AppError::Database(format!("Failed to count payments: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Payment) -> AppResult<Payment> {
        debug!("Creating payment for booking: {}", entity.booking_id);

        let row = sqlx::query_as::<sqlx::Postgres, PaymentRow>(
            r#"
            INSERT INTO payments (
                booking_id, renter_id, amount,
                payment_method, payment_status,
                transaction_id, payment_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id, booking_id, renter_id, amount,
                payment_method, payment_status,
                transaction_id, payment_date
            "#,
        )
        .bind(entity.booking_id)
        .bind(entity.renter_id)
        .bind(entity.amount)
        .bind(entity.payment_method.to_string())
        .bind(entity.payment_status.to_string())
        .bind(&entity.transaction_id)
        .bind(entity.payment_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AppError::AlreadyExists(format!(
                    "payment already exists for booking {}",
                    entity.booking_id
                ));
            }
            error!("Database error creating payment: {}", e);
            AppError::Database(format!("Failed to create payment: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Payment) -> AppResult<Payment> {
        debug!("Updating payment: {}", entity.id);

        let row = sqlx::query_as::<sqlx::Postgres, PaymentRow>(
            r#"
            UPDATE payments
            SET amount = $2,
                payment_method = $3,
                payment_status = $4,
                transaction_id = $5
            WHERE id = $1
            RETURNING
                id, booking_id, renter_id, amount,
                payment_method, payment_status,
                transaction_id, payment_date
            "#,
        )
        .bind(entity.id)
        .bind(entity.amount)
        .bind(entity.payment_method.to_string())
        .bind(entity.payment_status.to_string())
        .bind(&entity.transaction_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating payment {}: {}", entity.id, e);
            AppError::Database(format!("Failed to update payment: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting payment {}: {}", id, e);
                AppError::Database(format!("Failed to delete payment: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    #[instrument(skip(self))]
    async fn find_by_booking(&self, booking_id: i64) -> AppResult<Option<Payment>> {
        debug!("Finding payment by booking: {}", booking_id);

        let result = sqlx::query_as::<sqlx::Postgres, PaymentRow>(
            r#"
            SELECT
                id, booking_id, renter_id, amount,
                payment_method, payment_status,
                transaction_id, payment_date
            FROM payments
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding payment by booking: {}", e);
            AppError::Database(format!("Failed to find payment: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_renter(&self, renter_id: i64) -> AppResult<Vec<Payment>> {
        debug!("Finding payments for renter: {}", renter_id);

        let rows = sqlx::query_as::<sqlx::Postgres, PaymentRow>(
            r#"
            SELECT
                id, booking_id, renter_id, amount,
                payment_method, payment_status,
                transaction_id, payment_date
            FROM payments
            WHERE renter_id = $1
            ORDER BY payment_date DESC, id DESC
            "#,
        )
        .bind(renter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding payments by renter: {}", e);
            AppError::Database(format!("Failed to fetch payments: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn delete_by_booking(&self, booking_id: i64) -> AppResult<bool> {
        debug!("Deleting payment for booking: {}", booking_id);

        let result = sqlx::query("DELETE FROM payments WHERE booking_id = $1")
            .bind(booking_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting payment for booking {}: {}", booking_id, e);
                AppError::Database(format!("Failed to delete payment: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn total_by_renter(&self, renter_id: i64) -> AppResult<Option<Decimal>> {
        let result: (Option<Decimal>,) =
            sqlx::query_as("SELECT SUM(amount) FROM payments WHERE renter_id = $1")
                .bind(renter_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error summing payments by renter: {}", e);
                    AppError::Database(format!("Failed to sum payments: {}", e))
                })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn total_all(&self) -> AppResult<Option<Decimal>> {
        let result: (Option<Decimal>,) = sqlx::query_as("SELECT SUM(amount) FROM payments")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error summing payments: {}", e);
                AppError::Database(format!("Failed to sum payments: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn total_by_property(&self, property_id: i64) -> AppResult<Option<Decimal>> {
        let result: (Option<Decimal>,) = sqlx::query_as(
            r#"
            SELECT SUM(p.amount)
            FROM payments p
            JOIN bookings b ON b.id = p.booking_id
            WHERE b.property_id = $1
            "#,
        )
        .bind(property_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error summing payments by property: {}", e);
            AppError::Database(format!("Failed to sum payments: {}", e))
        })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn set_status(&self, id: i64, status: PaymentStatus) -> AppResult<Option<Payment>> {
        debug!("Setting payment {} status to {}", id, status);

        let row = sqlx::query_as::<sqlx::Postgres, PaymentRow>(
            r#"
            UPDATE payments
            SET payment_status = $2
            WHERE id = $1
            RETURNING
                id, booking_id, renter_id, amount,
                payment_method, payment_status,
                transaction_id, payment_date
            "#,
        )
        .bind(id)
        .bind(status.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating payment status: {}", e);
            AppError::Database(format!("Failed to update payment status: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn set_method(&self, id: i64, method: PaymentMethod) -> AppResult<Option<Payment>> {
        debug!("Setting payment {} method to {}", id, method);

        let row = sqlx::query_as::<sqlx::Postgres, PaymentRow>(
            r#"
            UPDATE payments
            SET payment_method = $2
            WHERE id = $1
            RETURNING
                id, booking_id, renter_id, amount,
                payment_method, payment_status,
                transaction_id, payment_date
            "#,
        )
        .bind(id)
        .bind(method.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating payment method: {}", e);
            AppError::Database(format!("Failed to update payment method: {}", e))
        })?;

        Ok(row.map(Into::into))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    booking_id: i64,
    renter_id: i64,
    amount: Decimal,
    payment_method: String,
    payment_status: String,
    transaction_id: Option<String>,
    payment_date: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            renter_id: row.renter_id,
            amount: row.amount,
            payment_method: PgPaymentRepository::parse_method(&row.payment_method),
            payment_status: PgPaymentRepository::parse_status(&row.payment_status),
            transaction_id: row.transaction_id,
            payment_date: row.payment_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(
            PgPaymentRepository::parse_status("refunded"),
            PaymentStatus::Refunded
        );
        assert_eq!(
            PgPaymentRepository::parse_status("bogus"),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(
            PgPaymentRepository::parse_method("paypal"),
            PaymentMethod::Paypal
        );
        assert_eq!(
            PgPaymentRepository::parse_method("bogus"),
            PaymentMethod::CreditCard
        );
    }
}
