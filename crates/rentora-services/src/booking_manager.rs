//! Booking lifecycle service
//!
//! Manages reservations from creation to their terminal status:
//! - Create bookings with the availability, overlap, and price rules
//! - List bookings for renters and properties
//! - Answer ownership checks for the transport layer's authorization
//! - Apply status transitions driven by external policy
//! - Delete bookings, cascading to their payment and review
//!
//! The availability check, overlap check, and insert run inside one
//! transaction that row-locks the property, so two concurrent calls for
//! overlapping ranges on the same property cannot both succeed.

use crate::pricing;
use rentora_core::{
    models::{Booking, BookingStatus, Property, PropertyType},
    traits::{BookingRepository, PropertyRepository, Repository, UserRepository},
    AppError, AppResult,
};
use chrono::{DateTime, NaiveDate, Utc};
use rentora_db::PgPool;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Booking manager
///
/// Holds the repositories for plain reads and a pool handle for the
/// transactional creation path.
pub struct BookingManager<P, B, U>
where
    P: PropertyRepository,
    B: BookingRepository,
    U: UserRepository,
{
    property_repo: Arc<P>,
    booking_repo: Arc<B>,
    user_repo: Arc<U>,
    pool: Arc<PgPool>,
}

/// Check a candidate stay against the property's listing state and its
/// existing bookings. Cancelled bookings never block a range.
fn admit_booking(
    property: &Property,
    existing: &[Booking],
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<()> {
    if !property.is_bookable() {
        return Err(AppError::PropertyUnavailable(property.id.to_string()));
    }

    if existing.iter().any(|b| b.conflicts_with(start, end)) {
        return Err(AppError::BookingConflict(format!(
            "property {} between {} and {}",
            property.id, start, end
        )));
    }

    Ok(())
}

impl<P, B, U> BookingManager<P, B, U>
where
    P: PropertyRepository,
    B: BookingRepository,
    U: UserRepository,
{
    /// Create a new booking manager
    pub fn new(
        property_repo: Arc<P>,
        booking_repo: Arc<B>,
        user_repo: Arc<U>,
        pool: Arc<PgPool>,
    ) -> Self {
        Self {
            property_repo,
            booking_repo,
            user_repo,
            pool,
        }
    }

    /// Create a new booking for a property
    ///
    /// The stay is an inclusive date range; the total price is computed
    /// from the property's per-day rate at this moment and never
    /// recalculated afterwards.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` / `PropertyNotFound` if a reference is absent
    /// - `InvalidDateRange` if `end_date` is before `start_date`
    /// - `PropertyUnavailable` if the listing toggle is off
    /// - `BookingConflict` if a non-cancelled booking overlaps the range
    #[instrument(skip(self))]
    pub async fn create_booking(
        &self,
        property_id: i64,
        username: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<Booking> {
        let renter = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        // Reject an inverted range before touching the database
        pricing::stay_days(start_date, end_date)?;

        info!(
            "Creating booking for property {} renter {} [{} - {}]",
            property_id, renter.id, start_date, end_date
        );

        // Start transaction
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        // Lock the property row; concurrent creators for the same
        // property serialize here
        let property = sqlx::query_as::<sqlx::Postgres, PropertyRow>(
            r#"
            SELECT id, owner_id, title, description, property_type,
                   price_per_day, availability, created_at
            FROM properties
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(property_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to lock property: {}", e);
            AppError::Database(format!("Failed to lock property: {}", e))
        })?
        .ok_or_else(|| AppError::PropertyNotFound(property_id.to_string()))?;

        let property: Property = property.into();

        // Overlap check inside the same transaction as the insert
        let existing = sqlx::query_as::<sqlx::Postgres, BookingRow>(
            r#"
            SELECT id, property_id, renter_id, start_date, end_date,
                   total_price, booking_date, booking_status
            FROM bookings
            WHERE property_id = $1
                AND start_date <= $3
                AND end_date >= $2
                AND booking_status <> 'cancelled'
            "#,
        )
        .bind(property_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to query overlapping bookings: {}", e);
            AppError::Database(format!("Failed to query overlapping bookings: {}", e))
        })?;

        let existing: Vec<Booking> = existing.into_iter().map(Into::into).collect();

        admit_booking(&property, &existing, start_date, end_date)?;

        let total_price = pricing::quote(property.price_per_day, start_date, end_date)?;
        let booking = Booking::new(property_id, renter.id, start_date, end_date, total_price);

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(
            r#"
            INSERT INTO bookings (
                property_id, renter_id, start_date, end_date,
                total_price, booking_date, booking_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, property_id, renter_id, start_date, end_date,
                      total_price, booking_date, booking_status
            "#,
        )
        .bind(booking.property_id)
        .bind(booking.renter_id)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.total_price)
        .bind(booking.booking_date)
        .bind(booking.status.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to create booking: {}", e);
            AppError::Database(format!("Failed to create booking: {}", e))
        })?;

        // Commit transaction
        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        let booking: Booking = row.into();

        info!(
            "Created booking {} for property {}: total {}",
            booking.id, property_id, booking.total_price
        );

        Ok(booking)
    }

    /// List all bookings made by a renter, newest first
    ///
    /// Fails `NotFound` when the renter has no bookings.
    #[instrument(skip(self))]
    pub async fn list_for_renter(&self, username: &str) -> AppResult<Vec<Booking>> {
        let renter = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        let bookings = self.booking_repo.find_by_renter(renter.id).await?;
        if bookings.is_empty() {
            return Err(AppError::NotFound(
                "No bookings found for this user".to_string(),
            ));
        }

        Ok(bookings)
    }

    /// List all bookings for a property, newest first
    ///
    /// Fails `NotFound` when the property has no bookings.
    #[instrument(skip(self))]
    pub async fn list_for_property(&self, property_id: i64) -> AppResult<Vec<Booking>> {
        if self.property_repo.find_by_id(property_id).await?.is_none() {
            return Err(AppError::PropertyNotFound(property_id.to_string()));
        }

        let bookings = self.booking_repo.find_by_property(property_id).await?;
        if bookings.is_empty() {
            return Err(AppError::NotFound(
                "No bookings found for this property".to_string(),
            ));
        }

        Ok(bookings)
    }

    /// Whether any non-cancelled booking of the property shares a day
    /// with the candidate range
    ///
    /// This is the plain read form of the interval index; booking
    /// creation repeats the check inside its own transaction.
    #[instrument(skip(self))]
    pub async fn has_overlap(
        &self,
        property_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<bool> {
        let overlapping = self
            .booking_repo
            .find_overlapping(property_id, start, end)
            .await?;
        Ok(!overlapping.is_empty())
    }

    /// Whether the booking belongs to the given renter
    ///
    /// Consumed by the transport layer's authorization policy.
    #[instrument(skip(self))]
    pub async fn is_booking_owner(&self, booking_id: i64, username: &str) -> AppResult<bool> {
        let booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

        let renter = self.user_repo.find_by_id(booking.renter_id).await?;
        Ok(renter.map(|u| u.username == username).unwrap_or(false))
    }

    /// Apply a status transition
    ///
    /// Legal moves are Pending -> Completed and Pending -> Cancelled;
    /// Completed and Cancelled are terminal. The timing of transitions is
    /// external policy.
    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        booking_id: i64,
        new_status: BookingStatus,
    ) -> AppResult<Booking> {
        let booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

        if !booking.status.can_transition_to(new_status) {
            return Err(AppError::IllegalTransition {
                from: booking.status.to_string(),
                to: new_status.to_string(),
            });
        }

        debug!(
            "Transitioning booking {} from {} to {}",
            booking_id, booking.status, new_status
        );

        self.booking_repo
            .set_status(booking_id, new_status)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))
    }

    /// Delete a booking
    ///
    /// The booking's payment and review go with it; they cannot outlive
    /// their booking.
    #[instrument(skip(self))]
    pub async fn delete_booking(&self, booking_id: i64) -> AppResult<()> {
        let deleted = self.booking_repo.delete(booking_id).await?;
        if !deleted {
            return Err(AppError::BookingNotFound(booking_id.to_string()));
        }

        info!("Deleted booking {}", booking_id);
        Ok(())
    }
}

/// Helper struct for property row mapping
#[derive(Debug, sqlx::FromRow)]
struct PropertyRow {
    id: i64,
    owner_id: i64,
    title: String,
    description: Option<String>,
    property_type: String,
    price_per_day: Decimal,
    availability: bool,
    created_at: DateTime<Utc>,
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            property_type: PropertyType::from_str(&row.property_type)
                .unwrap_or(PropertyType::Apartment),
            price_per_day: row.price_per_day,
            availability: row.availability,
            created_at: row.created_at,
        }
    }
}

/// Helper struct for booking row mapping
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
            status: BookingStatus::from_str(&row.booking_status).unwrap_or(BookingStatus::Pending),
        }
    }
}
