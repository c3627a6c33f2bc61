//! Property listing service
//!
//! Owner-facing listing management. The availability flag is a manual
//! toggle independent of date-range booking state: flipping it back on
//! does not reconcile against existing bookings, and existing bookings of
//! a disabled property remain valid.

use rentora_core::{
    models::{Property, PropertyDraft},
    traits::{
        PaginatedResponse, Pagination, PaginationMeta, PropertyRepository, Repository,
        UserRepository,
    },
    AppError, AppResult,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument};

/// Property service
pub struct PropertyService<P, U>
where
    P: PropertyRepository,
    U: UserRepository,
{
    property_repo: Arc<P>,
    user_repo: Arc<U>,
}

impl<P, U> PropertyService<P, U>
where
    P: PropertyRepository,
    U: UserRepository,
{
    /// Create a new property service
    pub fn new(property_repo: Arc<P>, user_repo: Arc<U>) -> Self {
        Self {
            property_repo,
            user_repo,
        }
    }

    /// List a new property for an owner
    #[instrument(skip(self, draft))]
    pub async fn create_property(
        &self,
        username: &str,
        draft: PropertyDraft,
    ) -> AppResult<Property> {
        let owner = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        if draft.title.trim().is_empty() {
            return Err(AppError::Validation("title cannot be blank".to_string()));
        }
        if draft.price_per_day < Decimal::ZERO {
            return Err(AppError::Validation(
                "price per day cannot be negative".to_string(),
            ));
        }

        let property = self.property_repo.create(&Property::new(owner.id, draft)).await?;

        info!(
            "Created property {} for owner {}",
            property.id, property.owner_id
        );

        Ok(property)
    }

    /// Fetch a property by id
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, property_id: i64) -> AppResult<Property> {
        self.property_repo
            .find_by_id(property_id)
            .await?
            .ok_or_else(|| AppError::PropertyNotFound(property_id.to_string()))
    }

    /// Page through available listings
    ///
    /// Fails `NotFound` when the page is empty.
    #[instrument(skip(self))]
    pub async fn list_available(&self, page: Pagination) -> AppResult<PaginatedResponse<Property>> {
        let (properties, total) = self
            .property_repo
            .list_by_availability(true, page.limit(), page.offset())
            .await?;

        if properties.is_empty() {
            return Err(AppError::NotFound(
                "No available properties found".to_string(),
            ));
        }

        Ok(PaginatedResponse {
            data: properties,
            pagination: PaginationMeta::new(total, page.page, page.per_page),
        })
    }

    /// Flip the availability toggle
    ///
    /// Re-enabling a listing performs no reconciliation against its
    /// existing bookings.
    #[instrument(skip(self))]
    pub async fn set_availability(
        &self,
        property_id: i64,
        availability: bool,
    ) -> AppResult<Property> {
        let property = self
            .property_repo
            .set_availability(property_id, availability)
            .await?
            .ok_or_else(|| AppError::PropertyNotFound(property_id.to_string()))?;

        info!(
            "Property {} availability set to {}",
            property_id, availability
        );

        Ok(property)
    }

    /// Change the per-day rate
    ///
    /// Existing bookings keep the price they were created with.
    #[instrument(skip(self))]
    pub async fn update_price_per_day(
        &self,
        property_id: i64,
        price_per_day: Decimal,
    ) -> AppResult<Property> {
        if price_per_day < Decimal::ZERO {
            return Err(AppError::Validation(
                "price per day cannot be negative".to_string(),
            ));
        }

        self.property_repo
            .set_price_per_day(property_id, price_per_day)
            .await?
            .ok_or_else(|| AppError::PropertyNotFound(property_id.to_string()))
    }

    /// Whether the property is listed by the given owner
    ///
    /// Consumed by the transport layer's authorization policy.
    #[instrument(skip(self))]
    pub async fn is_owner(&self, property_id: i64, username: &str) -> AppResult<bool> {
        let property = self
            .property_repo
            .find_by_id(property_id)
            .await?
            .ok_or_else(|| AppError::PropertyNotFound(property_id.to_string()))?;

        let owner = self.user_repo.find_by_id(property.owner_id).await?;
        Ok(owner.map(|u| u.username == username).unwrap_or(false))
    }

    /// Delete a listing
    ///
    /// Bookings of the property, and their payments and reviews, go with it.
    #[instrument(skip(self))]
    pub async fn delete_property(&self, property_id: i64) -> AppResult<()> {
        let deleted = self.property_repo.delete(property_id).await?;
        if !deleted {
            return Err(AppError::PropertyNotFound(property_id.to_string()));
        }

        info!("Deleted property {}", property_id);
        Ok(())
    }
}
