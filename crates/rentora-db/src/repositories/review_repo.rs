//! Review repository implementation
//!
//! One review per booking, enforced by the schema; a racing duplicate
//! insert surfaces as `AlreadyExists`.

use crate::repositories::is_unique_violation;
use rentora_core::{
    models::Review,
    traits::{Repository, ReviewRepository},
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of ReviewRepository
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    /// Create a new review repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Review, i64> for PgReviewRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Review>> {
        debug!("Finding review by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, ReviewRow>(
            r#"
            SELECT
                id, booking_id, renter_id, property_id,
                rating, comment, review_date
            FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding review {}: {}", id, e);
            AppError::Database(format!("Failed to find review: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Review>> {
        let rows = sqlx::query_as::<sqlx::Postgres, ReviewRow>(
            r#"
            SELECT
                id, booking_id, renter_id, property_id,
                rating, comment, review_date
            FROM reviews
            ORDER BY review_date DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding reviews: {}", e);
            AppError::Database(format!("Failed to fetch reviews: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting reviews: {}", e);
                AppError::Database(format!("Failed to count reviews: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Review) -> AppResult<Review> {
        debug!("Creating review for booking: {}", entity.booking_id);

        let row = sqlx::query_as::<sqlx::Postgres, ReviewRow>(
            r#"
            INSERT INTO reviews (
                booking_id, renter_id, property_id,
                rating, comment, review_date
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING
                id, booking_id, renter_id, property_id,
                rating, comment, review_date
            "#,
        )
        .bind(entity.booking_id)
        .bind(entity.renter_id)
        .bind(entity.property_id)
        .bind(entity.rating)
        .bind(&entity.comment)
        .bind(entity.review_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AppError::AlreadyExists(format!(
                    "review already exists for booking {}",
                    entity.booking_id
                ));
            }
            error!("Database error creating review: {}", e);
            AppError::Database(format!("Failed to create review: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Review) -> AppResult<Review> {
        debug!("Updating review: {}", entity.id);

        let row = sqlx::query_as::<sqlx::Postgres, ReviewRow>(
            r#"
            UPDATE reviews
            SET rating = $2,
                comment = $3,
                review_date = $4
            WHERE id = $1
            RETURNING
                id, booking_id, renter_id, property_id,
                rating, comment, review_date
            "#,
        )
        .bind(entity.id)
        .bind(entity.rating)
        .bind(&entity.comment)
        .bind(entity.review_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating review {}: {}", entity.id, e);
            AppError::Database(format!("Failed to update review: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> AppResult<bool> {
        debug!("Deleting review: {}", id);

        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting review {}: {}", id, e);
                AppError::Database(format!("Failed to delete review: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    #[instrument(skip(self))]
    async fn find_by_booking(&self, booking_id: i64) -> AppResult<Option<Review>> {
        debug!("Finding review by booking: {}", booking_id);

        let result = sqlx::query_as::<sqlx::Postgres, ReviewRow>(
            r#"
            SELECT
                id, booking_id, renter_id, property_id,
                rating, comment, review_date
            FROM reviews
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding review by booking: {}", e);
            AppError::Database(format!("Failed to find review: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_renter(&self, renter_id: i64) -> AppResult<Vec<Review>> {
        let rows = sqlx::query_as::<sqlx::Postgres, ReviewRow>(
            r#"
            SELECT
                id, booking_id, renter_id, property_id,
                rating, comment, review_date
            FROM reviews
            WHERE renter_id = $1
            ORDER BY review_date DESC, id DESC
            "#,
        )
        .bind(renter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding reviews by renter: {}", e);
            AppError::Database(format!("Failed to fetch reviews: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_property(&self, property_id: i64) -> AppResult<Vec<Review>> {
        let rows = sqlx::query_as::<sqlx::Postgres, ReviewRow>(
            r#"
            SELECT
                id, booking_id, renter_id, property_id,
                rating, comment, review_date
            FROM reviews
            WHERE property_id = $1
            ORDER BY review_date DESC, id DESC
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding reviews by property: {}", e);
            AppError::Database(format!("Failed to fetch reviews: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    booking_id: i64,
    renter_id: i64,
    property_id: i64,
    rating: i32,
    comment: Option<String>,
    review_date: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            renter_id: row.renter_id,
            property_id: row.property_id,
            rating: row.rating,
            comment: row.comment,
            review_date: row.review_date,
        }
    }
}
