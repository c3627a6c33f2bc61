//! Booking model
//!
//! A reservation of a property for an inclusive date range. The booking
//! lifecycle:
//! 1. Created Pending by the renter
//! 2. Moved to Completed or Cancelled by external policy (stay elapsed,
//!    manual cancellation)
//! 3. Completed and Cancelled are terminal

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Reservation created, stay not concluded
    #[default]
    Pending,
    /// Stay concluded; reviews become possible
    Completed,
    /// Reservation withdrawn; ignored by overlap checks
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl BookingStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(BookingStatus::Pending),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether no further transitions are allowed from this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Whether a transition to `next` is legal
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Completed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
        )
    }
}

/// Closed-interval overlap: [a_start, a_end] and [b_start, b_end] share
/// at least one day iff `a_start <= b_end && b_start <= a_end`.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Booking entity
///
/// The total price is computed from the property's per-day rate at
/// creation time and never recalculated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier
    pub id: i64,

    /// Booked property
    pub property_id: i64,

    /// Renter who made the reservation
    pub renter_id: i64,

    /// First day of the stay (inclusive)
    pub start_date: NaiveDate,

    /// Last day of the stay (inclusive)
    pub end_date: NaiveDate,

    /// Computed total, never client-supplied
    pub total_price: Decimal,

    /// Creation timestamp
    pub booking_date: DateTime<Utc>,

    /// Current status
    pub status: BookingStatus,
}

impl Booking {
    /// Create a new pending booking, not yet persisted
    pub fn new(
        property_id: i64,
        renter_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        total_price: Decimal,
    ) -> Self {
        Self {
            id: 0,
            property_id,
            renter_id,
            start_date,
            end_date,
            total_price,
            booking_date: Utc::now(),
            status: BookingStatus::Pending,
        }
    }

    /// Whether this booking's stay shares a day with the candidate range
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        ranges_overlap(self.start_date, self.end_date, start, end)
    }

    /// Whether this booking blocks the candidate range: cancelled
    /// bookings never conflict.
    pub fn conflicts_with(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.status != BookingStatus::Cancelled && self.overlaps(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_legal_transitions() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Completed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Pending));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Completed));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Pending));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!BookingStatus::Pending.is_terminal());
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_overlap_shared_days() {
        // [01-01, 01-05] vs [01-04, 01-10]: the 4th and 5th are shared
        assert!(ranges_overlap(
            date(2024, 1, 1),
            date(2024, 1, 5),
            date(2024, 1, 4),
            date(2024, 1, 10),
        ));
        // [01-01, 01-05] vs [01-06, 01-10]: disjoint
        assert!(!ranges_overlap(
            date(2024, 1, 1),
            date(2024, 1, 5),
            date(2024, 1, 6),
            date(2024, 1, 10),
        ));
        // single shared boundary day
        assert!(ranges_overlap(
            date(2024, 1, 1),
            date(2024, 1, 5),
            date(2024, 1, 5),
            date(2024, 1, 8),
        ));
    }

    #[test]
    fn test_cancelled_booking_never_conflicts() {
        let mut booking = Booking::new(
            1,
            2,
            date(2024, 1, 1),
            date(2024, 1, 5),
            dec!(500.00),
        );
        assert!(booking.conflicts_with(date(2024, 1, 3), date(2024, 1, 8)));

        booking.status = BookingStatus::Cancelled;
        assert!(!booking.conflicts_with(date(2024, 1, 3), date(2024, 1, 8)));
        // still geometrically overlapping
        assert!(booking.overlaps(date(2024, 1, 3), date(2024, 1, 8)));
    }

    proptest! {
        /// The closed-interval formula agrees with brute-force day-set
        /// intersection for arbitrary small ranges.
        #[test]
        fn overlap_matches_day_sets(
            a_off in 0i64..400,
            a_len in 0i64..30,
            b_off in 0i64..400,
            b_len in 0i64..30,
        ) {
            let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            let a_start = base + Duration::days(a_off);
            let a_end = a_start + Duration::days(a_len);
            let b_start = base + Duration::days(b_off);
            let b_end = b_start + Duration::days(b_len);

            let brute = (a_off..=a_off + a_len)
                .any(|day| day >= b_off && day <= b_off + b_len);

            prop_assert_eq!(ranges_overlap(a_start, a_end, b_start, b_end), brute);
            // symmetry
            prop_assert_eq!(
                ranges_overlap(a_start, a_end, b_start, b_end),
                ranges_overlap(b_start, b_end, a_start, a_end)
            );
        }
    }
}
