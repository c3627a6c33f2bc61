//! Domain models for Rentora
//!
//! This module contains all the core domain models used throughout the application.

pub mod booking;
pub mod payment;
pub mod property;
pub mod review;
pub mod user;

pub use booking::{ranges_overlap, Booking, BookingStatus};
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use property::{Property, PropertyDraft, PropertyType};
pub use review::{Review, MAX_RATING, MIN_RATING};
pub use user::User;
