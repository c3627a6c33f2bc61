//! Review model
//!
//! A review is tied 1:1 to a concluded booking. The input layer validates
//! the rating range first; the review gate re-asserts it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest accepted rating
pub const MIN_RATING: i32 = 1;

/// Highest accepted rating
pub const MAX_RATING: i32 = 5;

/// Review entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Unique identifier
    pub id: i64,

    /// Reviewed booking (unique per review)
    pub booking_id: i64,

    /// Renter, copied from the booking at creation time
    pub renter_id: i64,

    /// Property, copied from the booking at creation time
    pub property_id: i64,

    /// Rating in [MIN_RATING, MAX_RATING]
    pub rating: i32,

    /// Free-text comment
    pub comment: Option<String>,

    /// Creation or last-update timestamp
    pub review_date: DateTime<Utc>,
}

impl Review {
    /// Create a new review, not yet persisted
    pub fn new(
        booking_id: i64,
        renter_id: i64,
        property_id: i64,
        rating: i32,
        comment: Option<String>,
    ) -> Self {
        Self {
            id: 0,
            booking_id,
            renter_id,
            property_id,
            rating,
            comment,
            review_date: Utc::now(),
        }
    }

    /// Whether a rating value falls inside the accepted range
    pub fn rating_in_range(rating: i32) -> bool {
        (MIN_RATING..=MAX_RATING).contains(&rating)
    }
}
