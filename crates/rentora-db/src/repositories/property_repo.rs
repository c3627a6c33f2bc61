//! Property repository implementation

use rentora_core::{
    models::{Property, PropertyType},
    traits::{PropertyRepository, Repository},
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

const PROPERTY_COLUMNS: &str =
    "id, owner_id, title, description, property_type, price_per_day, availability, created_at";

/// PostgreSQL implementation of PropertyRepository
pub struct PgPropertyRepository {
    pool: PgPool,
}

impl PgPropertyRepository {
    /// Create a new property repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse property type from string
    fn parse_type(s: &str) -> PropertyType {
        PropertyType::from_str(s).unwrap_or(PropertyType::Apartment)
    }
}

#[async_trait]
impl Repository<Property, i64> for PgPropertyRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Property>> {
        debug!("Finding property by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, PropertyRow>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding property {}: {}", id, e);
            AppError::Database(format!("Failed to find property: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Property>> {
        let rows = sqlx::query_as::<sqlx::Postgres, PropertyRow>(&format!(
            r#"
            SELECT {PROPERTY_COLUMNS}
            FROM properties
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding properties: {}", e);
            AppError::Database(format!("Failed to fetch properties: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM properties")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting properties: {}", e);
                AppError::Database(format!("Failed to count properties: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Property) -> AppResult<Property> {
        debug!("Creating property '{}'", entity.title);

        let row = sqlx::query_as::<sqlx::Postgres, PropertyRow>(&format!(
            r#"
            INSERT INTO properties (owner_id, title, description, property_type, price_per_day, availability)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(entity.owner_id)
        .bind(&entity.title)
        .bind(&entity.description)
        .bind(entity.property_type.to_string())
        .bind(entity.price_per_day)
        .bind(entity.availability)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating property: {}", e);
            AppError::Database(format!("Failed to create property: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Property) -> AppResult<Property> {
        let row = sqlx::query_as::<sqlx::Postgres, PropertyRow>(&format!(
            r#"
            UPDATE properties
            SET title = $2,
                description = $3,
                property_type = $4,
                price_per_day = $5,
                availability = $6
            WHERE id = $1
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(entity.id)
        .bind(&entity.title)
        .bind(&entity.description)
        .bind(entity.property_type.to_string())
        .bind(entity.price_per_day)
        .bind(entity.availability)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating property {}: {}", entity.id, e);
            AppError::Database(format!("Failed to update property: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> AppResult<bool> {
        debug!("Deleting property: {}", id);

        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting property {}: {}", id, e);
                AppError::Database(format!("Failed to delete property: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PropertyRepository for PgPropertyRepository {
    #[instrument(skip(self))]
    async fn find_by_owner(&self, owner_id: i64) -> AppResult<Vec<Property>> {
        let rows = sqlx::query_as::<sqlx::Postgres, PropertyRow>(&format!(
            r#"
            SELECT {PROPERTY_COLUMNS}
            FROM properties
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding properties by owner: {}", e);
            AppError::Database(format!("Failed to fetch properties: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn list_by_availability(
        &self,
        availability: bool,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Property>, i64)> {
        let rows = sqlx::query_as::<sqlx::Postgres, PropertyRow>(&format!(
            r#"
            SELECT {PROPERTY_COLUMNS}
            FROM properties
            WHERE availability = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(availability)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing properties: {}", e);
            AppError::Database(format!("Failed to fetch properties: {}", e))
        })?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM properties WHERE availability = $1")
                .bind(availability)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error counting properties: {}", e);
                    AppError::Database(format!("Failed to count properties: {}", e))
                })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }

    #[instrument(skip(self))]
    async fn set_availability(&self, id: i64, availability: bool) -> AppResult<Option<Property>> {
        debug!("Setting property {} availability to {}", id, availability);

        let row = sqlx::query_as::<sqlx::Postgres, PropertyRow>(&format!(
            r#"
            UPDATE properties
            SET availability = $2
            WHERE id = $1
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(availability)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating availability for {}: {}", id, e);
            AppError::Database(format!("Failed to update availability: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn set_price_per_day(
        &self,
        id: i64,
        price_per_day: Decimal,
    ) -> AppResult<Option<Property>> {
        debug!("Setting property {} rate to {}", id, price_per_day);

        let row = sqlx::query_as::<sqlx::Postgres, PropertyRow>(&format!(
            r#"
            UPDATE properties
            SET price_per_day = $2
            WHERE id = $1
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(price_per_day)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating rate for {}: {}", id, e);
            AppError::Database(format!("Failed to update rate: {}", e))
        })?;

        Ok(row.map(Into::into))
    }
}

/// Helper struct for mapping database rows
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
            property_type: PgPropertyRepository::parse_type(&row.property_type),
            price_per_day: row.price_per_day,
            availability: row.availability,
            created_at: row.created_at,
        }
    }
}
