//! Rentora Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the Rentora rental platform. It includes:
//!
//! - Domain models (User, Property, Booking, Payment, Review)
//! - Common traits for repositories
//! - Unified error handling with transport-agnostic error codes
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
