//! Unified error handling for Rentora
//!
//! This module provides a single error type covering all failure scenarios
//! in the core, with stable error codes for transport-layer mapping.

use chrono::NaiveDate;
use thiserror::Error;

/// Main application error type
///
/// All errors in the core should be converted to this type. Every failure
/// is recoverable by the caller; the transport layer maps `error_code()`
/// to a user-visible response.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Storage Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Missing Entities ====================
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    #[error("Review not found: {0}")]
    ReviewNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // ==================== Booking Rules ====================
    #[error("Property is not available for booking: {0}")]
    PropertyUnavailable(String),

    #[error("Property is already booked for the selected dates: {0}")]
    BookingConflict(String),

    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Illegal state: {0}")]
    IllegalState(String),

    // ==================== Payment Rules ====================
    #[error("Payment amount does not match booking total: expected {expected}, got {actual}")]
    AmountMismatch { expected: String, actual: String },

    // ==================== Ownership & Uniqueness ====================
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the stable error code for transport-layer responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::UserNotFound(_) => "user_not_found",
            AppError::PropertyNotFound(_) => "property_not_found",
            AppError::BookingNotFound(_) => "booking_not_found",
            AppError::PaymentNotFound(_) => "payment_not_found",
            AppError::ReviewNotFound(_) => "review_not_found",
            AppError::NotFound(_) => "not_found",
            AppError::PropertyUnavailable(_) => "property_unavailable",
            AppError::BookingConflict(_) => "booking_conflict",
            AppError::InvalidDateRange { .. } => "invalid_date_range",
            AppError::IllegalTransition { .. } => "illegal_transition",
            AppError::IllegalState(_) => "illegal_state",
            AppError::AmountMismatch { .. } => "amount_mismatch",
            AppError::Forbidden(_) => "forbidden",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether the error indicates an absent entity
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::UserNotFound(_)
                | AppError::PropertyNotFound(_)
                | AppError::BookingNotFound(_)
                | AppError::PaymentNotFound(_)
                | AppError::ReviewNotFound(_)
                | AppError::NotFound(_)
        )
    }

    /// Whether the error indicates a conflict with existing state
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            AppError::BookingConflict(_) | AppError::AlreadyExists(_)
        )
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
