//! Booking repository implementation
//!
//! Provides PostgreSQL-backed storage for bookings, including the
//! range-overlap query used by the booking lifecycle. Deleting a booking
//! cascades to its payment and review at the schema level.

use rentora_core::{
    models::{Booking, BookingStatus},
    traits::{BookingRepository, Repository},
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of BookingRepository
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse booking status from string
    fn parse_status(s: &str) -> BookingStatus {
        BookingStatus::from_str(s).unwrap_or(BookingStatus::Pending)
    }
}

#[async_trait]
impl Repository<Booking, i64> for PgBookingRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Booking>> {
        debug!("Finding booking by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, BookingRow>(
            r#"
            SELECT
                id, property_id, renter_id,
                start_date, end_date, total_price,
                booking_date, booking_status
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding booking {}: {}", id, e);
            AppError::Database(format!("Failed to find booking: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Booking>> {
        debug!("Finding all bookings with limit {} offset {}", limit, offset);

        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(
            r#"
            SELECT
                id, property_id, renter_id,
                start_date, end_date, total_price,
                booking_date, booking_status
            FROM bookings
            ORDER BY booking_date DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding bookings: {}", e);
            AppError::Database(format!("Failed to fetch bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting bookings: {}", e);
                AppError::Database(format!("Failed to count bookings: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Booking) -> AppResult<Booking> {
        debug!(
            "Creating booking for property {} renter {}",
            entity.property_id, entity.renter_id
        );

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(
            r#"
            INSERT INTO bookings (
                property_id, renter_id, start_date, end_date,
                total_price, booking_date, booking_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id, property_id, renter_id,
                start_date, end_date, total_price,
                booking_date, booking_status
            "#,
        )
        .bind(entity.property_id)
        .bind(entity.renter_id)
        .bind(entity.start_date)
        .bind(entity.end_date)
        .bind(entity.total_price)
        .bind(entity.booking_date)
        .bind(entity.status.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating booking: {}", e);
            AppError::Database(format!("Failed to create booking: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Booking) -> AppResult<Booking> {
        debug!("Updating booking: {}", entity.id);

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(
            r#"
            UPDATE bookings
            SET start_date = $2,
                end_date = $3,
                total_price = $4,
                booking_status = $5
            WHERE id = $1
            RETURNING
                id, property_id, renter_id,
                start_date, end_date, total_price,
                booking_date, booking_status
            "#,
        )
        .bind(entity.id)
        .bind(entity.start_date)
        .bind(entity.end_date)
        .bind(entity.total_price)
        .bind(entity.status.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating booking {}: {}", entity.id, e);
            AppError::Database(format!("Failed to update booking: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> AppResult<bool> {
        debug!("Deleting booking: {}", id);

        // Payment and review rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting booking {}: {}", id, e);
                AppError::Database(format!("Failed to delete booking: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    #[instrument(skip(self))]
    async fn find_by_renter(&self, renter_id: i64) -> AppResult<Vec<Booking>> {
        debug!("Finding bookings for renter: {}", renter_id);

        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(
            r#"
            SELECT
                id, property_id, renter_id,
                start_date, end_date, total_price,
                booking_date, booking_status
            FROM bookings
            WHERE renter_id = $1
            ORDER BY booking_date DESC, id DESC
            "#,
        )
        .bind(renter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding bookings by renter: {}", e);
            AppError::Database(format!("Failed to fetch bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_property(&self, property_id: i64) -> AppResult<Vec<Booking>> {
        debug!("Finding bookings for property: {}", property_id);

        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(
            r#"
            SELECT
                id, property_id, renter_id,
                start_date, end_date, total_price,
                booking_date, booking_status
            FROM bookings
            WHERE property_id = $1
            ORDER BY booking_date DESC, id DESC
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding bookings by property: {}", e);
            AppError::Database(format!("Failed to fetch bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count_by_property(&self, property_id: i64) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE property_id = $1")
            .bind(property_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting bookings by property: {}", e);
                AppError::Database(format!("Failed to count bookings: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn find_overlapping(
        &self,
        property_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Booking>> {
        debug!(
            "Finding bookings of property {} overlapping [{}, {}]",
            property_id, start, end
        );

        // Closed intervals [a, b] and [c, d] overlap iff a <= d AND c <= b
        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(
            r#"
            SELECT
                id, property_id, renter_id,
                start_date, end_date, total_price,
                booking_date, booking_status
            FROM bookings
            WHERE property_id = $1
                AND start_date <= $3
                AND end_date >= $2
                AND booking_status <> 'cancelled'
            ORDER BY start_date
            "#,
        )
        .bind(property_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding overlapping bookings: {}", e);
            AppError::Database(format!("Failed to find overlapping bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn set_status(&self, id: i64, status: BookingStatus) -> AppResult<Option<Booking>> {
        debug!("Setting booking {} status to {}", id, status);

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(
            r#"
            UPDATE bookings
            SET booking_status = $2
            WHERE id = $1
            RETURNING
                id, property_id, renter_id,
                start_date, end_date, total_price,
                booking_date, booking_status
            "#,
        )
        .bind(id)
        .bind(status.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating booking status: {}", e);
            AppError::Database(format!("Failed to update booking status: {}", e))
        })?;

        Ok(row.map(Into::into))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: i64,
    property_id: i64,
    renter_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_price: Decimal,
    booking_date: DateTime<Utc>,
    booking_status: String,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            property_id: row.property_id,
            renter_id: row.renter_id,
            start_date: row.start_date,
            end_date: row.end_date,
            total_price: row.total_price,
            booking_date: row.booking_date,
            status: PgBookingRepository::parse_status(&row.booking_status),
        }
    }
}
