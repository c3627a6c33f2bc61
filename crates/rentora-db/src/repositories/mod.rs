//! Repository implementations
//!
//! This module contains concrete implementations of all repository traits
//! defined in rentora-core, using sqlx for PostgreSQL access.

pub mod booking_repo;
pub mod payment_repo;
pub mod property_repo;
pub mod review_repo;
pub mod user_repo;

pub use booking_repo::PgBookingRepository;
pub use payment_repo::PgPaymentRepository;
pub use property_repo::PgPropertyRepository;
pub use review_repo::PgReviewRepository;
pub use user_repo::PgUserRepository;

/// Whether a driver error is a unique-constraint violation
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
