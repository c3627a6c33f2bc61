//! Payment model
//!
//! A payment is tied 1:1 to a booking and must match its total price at
//! creation time. Status progression beyond the enumeration is deployment
//! policy; Pending is the creation default.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    Paypal,
    BankTransfer,
    Cash,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::CreditCard => write!(f, "credit_card"),
            PaymentMethod::Paypal => write!(f, "paypal"),
            PaymentMethod::BankTransfer => write!(f, "bank_transfer"),
            PaymentMethod::Cash => write!(f, "cash"),
        }
    }
}

impl PaymentMethod {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "credit_card" => Some(PaymentMethod::CreditCard),
            "paypal" => Some(PaymentMethod::Paypal),
            "bank_transfer" => Some(PaymentMethod::BankTransfer),
            "cash" => Some(PaymentMethod::Cash),
            _ => None,
        }
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Created, not yet settled
    #[default]
    Pending,
    /// Funds captured
    Completed,
    /// Settlement failed
    Failed,
    /// Funds returned after capture
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Refunded => write!(f, "refunded"),
        }
    }
}

impl PaymentStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    /// Whether funds were captured and kept
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Completed)
    }
}

/// Payment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: i64,

    /// Paid booking (unique per payment)
    pub booking_id: i64,

    /// Renter, copied from the booking at creation time
    pub renter_id: i64,

    /// Amount, equal to the booking total at creation time
    pub amount: Decimal,

    /// How the payment was made
    pub payment_method: PaymentMethod,

    /// Current status
    pub payment_status: PaymentStatus,

    /// External processor reference, if any
    pub transaction_id: Option<String>,

    /// Creation timestamp
    pub payment_date: DateTime<Utc>,
}

impl Payment {
    /// Create a new pending payment, not yet persisted
    pub fn new(
        booking_id: i64,
        renter_id: i64,
        amount: Decimal,
        payment_method: PaymentMethod,
        transaction_id: Option<String>,
    ) -> Self {
        Self {
            id: 0,
            booking_id,
            renter_id,
            amount,
            payment_method,
            payment_status: PaymentStatus::Pending,
            transaction_id,
            payment_date: Utc::now(),
        }
    }
}
