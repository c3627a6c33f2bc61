//! Common traits for the persistence gateway
//!
//! Defines the abstractions the services use for durable state. All
//! cross-entity navigation goes through these traits; entities reference
//! each other by identifier, never by live pointer.

use crate::error::AppError;
use crate::models::{
    Booking, BookingStatus, Payment, PaymentMethod, PaymentStatus, Property, Review, User,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Generic repository trait for CRUD operations
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// Find all entities with pagination
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<T>, AppError>;

    /// Count total entities
    async fn count(&self) -> Result<i64, AppError>;

    /// Create a new entity
    async fn create(&self, entity: &T) -> Result<T, AppError>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> Result<T, AppError>;

    /// Delete entity by ID
    async fn delete(&self, id: ID) -> Result<bool, AppError>;
}

/// User repository trait with specialized methods
#[async_trait]
pub trait UserRepository: Repository<User, i64> {
    /// Find user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}

/// Property repository trait with specialized methods
#[async_trait]
pub trait PropertyRepository: Repository<Property, i64> {
    /// Find properties listed by an owner
    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<Property>, AppError>;

    /// List properties filtered by the availability toggle
    async fn list_by_availability(
        &self,
        availability: bool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Property>, i64), AppError>;

    /// Flip the availability toggle
    async fn set_availability(
        &self,
        id: i64,
        availability: bool,
    ) -> Result<Option<Property>, AppError>;

    /// Change the per-day rate. Existing bookings keep their price.
    async fn set_price_per_day(
        &self,
        id: i64,
        price_per_day: Decimal,
    ) -> Result<Option<Property>, AppError>;
}

/// Booking repository trait with specialized methods
#[async_trait]
pub trait BookingRepository: Repository<Booking, i64> {
    /// Find bookings made by a renter, newest first
    async fn find_by_renter(&self, renter_id: i64) -> Result<Vec<Booking>, AppError>;

    /// Find bookings for a property, newest first
    async fn find_by_property(&self, property_id: i64) -> Result<Vec<Booking>, AppError>;

    /// Count bookings for a property
    async fn count_by_property(&self, property_id: i64) -> Result<i64, AppError>;

    /// Find non-cancelled bookings of a property whose stay shares a day
    /// with the candidate range
    async fn find_overlapping(
        &self,
        property_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Booking>, AppError>;

    /// Set the booking status
    async fn set_status(
        &self,
        id: i64,
        status: BookingStatus,
    ) -> Result<Option<Booking>, AppError>;
}

/// Payment repository trait with specialized methods
#[async_trait]
pub trait PaymentRepository: Repository<Payment, i64> {
    /// Find the payment for a booking, if any
    async fn find_by_booking(&self, booking_id: i64) -> Result<Option<Payment>, AppError>;

    /// Find payments made by a renter
    async fn find_by_renter(&self, renter_id: i64) -> Result<Vec<Payment>, AppError>;

    /// Delete the payment for a booking
    async fn delete_by_booking(&self, booking_id: i64) -> Result<bool, AppError>;

    /// Sum of a renter's payment amounts; None when the renter has none
    async fn total_by_renter(&self, renter_id: i64) -> Result<Option<Decimal>, AppError>;

    /// Platform-wide sum of payment amounts; None when there are none
    async fn total_all(&self) -> Result<Option<Decimal>, AppError>;

    /// Sum of payments whose booking references the property; None when
    /// there are none
    async fn total_by_property(&self, property_id: i64) -> Result<Option<Decimal>, AppError>;

    /// Set the payment status
    async fn set_status(
        &self,
        id: i64,
        status: PaymentStatus,
    ) -> Result<Option<Payment>, AppError>;

    /// Set the payment method
    async fn set_method(
        &self,
        id: i64,
        method: PaymentMethod,
    ) -> Result<Option<Payment>, AppError>;
}

/// Review repository trait with specialized methods
#[async_trait]
pub trait ReviewRepository: Repository<Review, i64> {
    /// Find the review for a booking, if any
    async fn find_by_booking(&self, booking_id: i64) -> Result<Option<Review>, AppError>;

    /// Find reviews written by a renter
    async fn find_by_renter(&self, renter_id: i64) -> Result<Vec<Review>, AppError>;

    /// Find reviews for a property
    async fn find_by_property(&self, property_id: i64) -> Result<Vec<Review>, AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 1000),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}
