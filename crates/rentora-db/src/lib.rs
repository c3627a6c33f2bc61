//! Rentora Database Layer
//!
//! This crate provides PostgreSQL database access and repository
//! implementations for the Rentora platform. It includes:
//!
//! - Connection pool management with sqlx
//! - Embedded schema migrations
//! - Repository implementations for all domain entities
//! - The range-overlap query backing the interval index

pub mod pool;
pub mod repositories;

pub use pool::{create_pool, run_migrations};
pub use repositories::*;

// Re-export commonly used types
pub use rentora_core::{AppError, AppResult};
pub use sqlx::{PgPool, Postgres, Transaction};
