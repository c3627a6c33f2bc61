//! Business logic services for Rentora
//!
//! This crate contains the consistency engine that sits between the
//! transport layer and the persistence gateway:
//!
//! - No property is ever double-booked
//! - A booking's price is computed deterministically from its date range
//! - A payment exists only for an existing booking and matches its price
//! - A review exists only for a concluded booking, once, by its renter
//!
//! # Architecture
//!
//! Services are designed to be composable and testable:
//! - Each service owns its dependencies (repositories, pool)
//! - Repositories are wrapped in Arc for safe sharing across async tasks
//! - All operations are instrumented with tracing
//! - Comprehensive error handling with AppError
//!
//! # Services
//!
//! - `BookingManager` - Reservation creation, status transitions, ownership
//! - `PaymentService` - Payment creation, updates, and aggregate totals
//! - `ReviewService` - Review gating, updates, and lookups
//! - `PropertyService` - Listing management and the availability toggle
//! - `pricing` - Stay-length and total-price calculation

pub mod booking_manager;
pub mod payment_service;
pub mod pricing;
pub mod property_service;
pub mod review_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use booking_manager::BookingManager;
pub use payment_service::PaymentService;
pub use property_service::PropertyService;
pub use review_service::ReviewService;
