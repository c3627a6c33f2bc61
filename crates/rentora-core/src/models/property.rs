//! Property model
//!
//! A rentable unit listed by an owner. The availability flag is a
//! listing-level toggle controlled by the owner; it is independent of
//! date-range booking state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Property type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[default]
    Apartment,
    House,
    Studio,
    Villa,
    Loft,
    Penthouse,
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::Apartment => write!(f, "apartment"),
            PropertyType::House => write!(f, "house"),
            PropertyType::Studio => write!(f, "studio"),
            PropertyType::Villa => write!(f, "villa"),
            PropertyType::Loft => write!(f, "loft"),
            PropertyType::Penthouse => write!(f, "penthouse"),
        }
    }
}

impl PropertyType {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "apartment" => Some(PropertyType::Apartment),
            "house" => Some(PropertyType::House),
            "studio" => Some(PropertyType::Studio),
            "villa" => Some(PropertyType::Villa),
            "loft" => Some(PropertyType::Loft),
            "penthouse" => Some(PropertyType::Penthouse),
            _ => None,
        }
    }
}

/// Property entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    /// Unique identifier
    pub id: i64,

    /// Listing owner
    pub owner_id: i64,

    /// Listing title
    pub title: String,

    /// Free-text description
    pub description: Option<String>,

    /// Kind of unit
    pub property_type: PropertyType,

    /// Per-day rate, fixed-point with 2 decimal places
    pub price_per_day: Decimal,

    /// Owner-controlled listing toggle
    pub availability: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by an owner when listing a property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDraft {
    pub title: String,
    pub description: Option<String>,
    pub property_type: PropertyType,
    pub price_per_day: Decimal,
}

impl Property {
    /// Create a new listing from a draft, not yet persisted
    pub fn new(owner_id: i64, draft: PropertyDraft) -> Self {
        Self {
            id: 0,
            owner_id,
            title: draft.title,
            description: draft.description,
            property_type: draft.property_type,
            price_per_day: draft.price_per_day,
            availability: true,
            created_at: Utc::now(),
        }
    }

    /// Whether new bookings may target this listing
    pub fn is_bookable(&self) -> bool {
        self.availability
    }
}
