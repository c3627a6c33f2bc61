//! Payment reconciliation service
//!
//! A payment is tied 1:1 to its booking and must match the booking's
//! total price exactly. The schema's unique constraint backs the 1:1
//! rule, so a losing concurrent writer observes `AlreadyExists` rather
//! than corrupting state; no partial payment record survives a failed
//! call.

use rentora_core::{
    models::{Payment, PaymentMethod, PaymentStatus},
    traits::{BookingRepository, PaymentRepository, Repository, UserRepository},
    AppError, AppResult,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Payment service
pub struct PaymentService<PR, B, U>
where
    PR: PaymentRepository,
    B: BookingRepository,
    U: UserRepository,
{
    payment_repo: Arc<PR>,
    booking_repo: Arc<B>,
    user_repo: Arc<U>,
}

impl<PR, B, U> PaymentService<PR, B, U>
where
    PR: PaymentRepository,
    B: BookingRepository,
    U: UserRepository,
{
    /// Create a new payment service
    pub fn new(payment_repo: Arc<PR>, booking_repo: Arc<B>, user_repo: Arc<U>) -> Self {
        Self {
            payment_repo,
            booking_repo,
            user_repo,
        }
    }

    /// Create the payment for a booking
    ///
    /// # Errors
    ///
    /// - `BookingNotFound` if the booking is absent
    /// - `AlreadyExists` if a payment already references the booking
    /// - `AmountMismatch` if the amount differs from the booking total
    #[instrument(skip(self))]
    pub async fn make_payment(
        &self,
        booking_id: i64,
        amount: Decimal,
        method: PaymentMethod,
        transaction_id: Option<String>,
    ) -> AppResult<Payment> {
        let booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

        if self.payment_repo.find_by_booking(booking_id).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "payment already exists for booking {}",
                booking_id
            )));
        }

        if amount != booking.total_price {
            warn!(
                "Payment amount {} does not match booking {} total {}",
                amount, booking_id, booking.total_price
            );
            return Err(AppError::AmountMismatch {
                expected: booking.total_price.to_string(),
                actual: amount.to_string(),
            });
        }

        let payment = Payment::new(booking.id, booking.renter_id, amount, method, transaction_id);
        let payment = self.payment_repo.create(&payment).await?;

        info!(
            "Created payment {} for booking {}: {}",
            payment.id, booking_id, payment.amount
        );

        Ok(payment)
    }

    /// Fetch the payment for a booking
    #[instrument(skip(self))]
    pub async fn get_by_booking(&self, booking_id: i64) -> AppResult<Payment> {
        self.payment_repo
            .find_by_booking(booking_id)
            .await?
            .ok_or_else(|| {
                AppError::PaymentNotFound(format!("for booking {}", booking_id))
            })
    }

    /// Update the payment status
    ///
    /// The enumeration is the only constraint; progression between
    /// statuses is deployment policy.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        payment_id: i64,
        status: PaymentStatus,
    ) -> AppResult<Payment> {
        debug!("Updating payment {} status to {}", payment_id, status);

        self.payment_repo
            .set_status(payment_id, status)
            .await?
            .ok_or_else(|| AppError::PaymentNotFound(payment_id.to_string()))
    }

    /// Update the payment method
    #[instrument(skip(self))]
    pub async fn update_method(
        &self,
        payment_id: i64,
        method: PaymentMethod,
    ) -> AppResult<Payment> {
        debug!("Updating payment {} method to {}", payment_id, method);

        self.payment_repo
            .set_method(payment_id, method)
            .await?
            .ok_or_else(|| AppError::PaymentNotFound(payment_id.to_string()))
    }

    /// Delete the payment for a booking
    #[instrument(skip(self))]
    pub async fn delete_by_booking(&self, booking_id: i64) -> AppResult<()> {
        let deleted = self.payment_repo.delete_by_booking(booking_id).await?;
        if !deleted {
            return Err(AppError::PaymentNotFound(format!(
                "for booking {}",
                booking_id
            )));
        }

        info!("Deleted payment for booking {}", booking_id);
        Ok(())
    }

    /// List all payments made by a renter, newest first
    ///
    /// Fails `NotFound` when the renter has no payments.
    #[instrument(skip(self))]
    pub async fn list_for_renter(&self, username: &str) -> AppResult<Vec<Payment>> {
        let renter = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        let payments = self.payment_repo.find_by_renter(renter.id).await?;
        if payments.is_empty() {
            return Err(AppError::NotFound(
                "No payments found for user".to_string(),
            ));
        }

        Ok(payments)
    }

    /// Total amount paid by a renter
    ///
    /// Fails `NotFound` when the renter has no payments.
    #[instrument(skip(self))]
    pub async fn total_paid_by_renter(&self, username: &str) -> AppResult<Decimal> {
        let renter = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        self.payment_repo
            .total_by_renter(renter.id)
            .await?
            .ok_or_else(|| AppError::NotFound("No payments found for user".to_string()))
    }

    /// Total amount paid platform-wide
    ///
    /// Fails `NotFound` when no payments exist.
    #[instrument(skip(self))]
    pub async fn total_paid(&self) -> AppResult<Decimal> {
        self.payment_repo
            .total_all()
            .await?
            .ok_or_else(|| AppError::NotFound("No payments found".to_string()))
    }

    /// Total amount paid across a property's bookings
    ///
    /// Fails `NotFound` when the property has no bookings; bookings
    /// without a payment count as zero.
    #[instrument(skip(self))]
    pub async fn total_paid_for_property(&self, property_id: i64) -> AppResult<Decimal> {
        let bookings = self.booking_repo.count_by_property(property_id).await?;
        if bookings == 0 {
            return Err(AppError::NotFound(format!(
                "No bookings found for property {}",
                property_id
            )));
        }

        let total = self
            .payment_repo
            .total_by_property(property_id)
            .await?
            .unwrap_or(Decimal::ZERO);

        Ok(total)
    }

    /// Whether the payment belongs to the given renter
    ///
    /// Consumed by the transport layer's authorization policy.
    #[instrument(skip(self))]
    pub async fn is_payment_owner(&self, payment_id: i64, username: &str) -> AppResult<bool> {
        let payment = self
            .payment_repo
            .find_by_id(payment_id)
            .await?
            .ok_or_else(|| AppError::PaymentNotFound(payment_id.to_string()))?;

        let renter = self.user_repo.find_by_id(payment.renter_id).await?;
        Ok(renter.map(|u| u.username == username).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        seeded_booking, InMemoryBookingRepository, InMemoryPaymentRepository,
        InMemoryUserRepository,
    };
    use chrono::NaiveDate;
    use rentora_core::models::{BookingStatus, User};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        service: PaymentService<
            InMemoryPaymentRepository,
            InMemoryBookingRepository,
            InMemoryUserRepository,
        >,
        payment_repo: Arc<InMemoryPaymentRepository>,
        booking_repo: Arc<InMemoryBookingRepository>,
        user_repo: Arc<InMemoryUserRepository>,
    }

    fn fixture() -> Fixture {
        let payment_repo = Arc::new(InMemoryPaymentRepository::default());
        let booking_repo = Arc::new(InMemoryBookingRepository::default());
        let user_repo = Arc::new(InMemoryUserRepository::default());

        Fixture {
            service: PaymentService::new(
                payment_repo.clone(),
                booking_repo.clone(),
                user_repo.clone(),
            ),
            payment_repo,
            booking_repo,
            user_repo,
        }
    }

    /// A booking priced at 500.00 for renter `ana`
    async fn seeded(fx: &Fixture) -> (User, rentora_core::models::Booking) {
        let renter = fx.user_repo.create(&User::new("ana", None)).await.unwrap();
        let mut booking = seeded_booking(0, 1, renter.id, date(2024, 1, 1), date(2024, 1, 5));
        booking.total_price = dec!(500.00);
        let booking = fx.booking_repo.create(&booking).await.unwrap();
        (renter, booking)
    }

    #[tokio::test]
    async fn test_make_payment_happy_path() {
        let fx = fixture();
        let (renter, booking) = seeded(&fx).await;

        let payment = fx
            .service
            .make_payment(booking.id, dec!(500.00), PaymentMethod::CreditCard, None)
            .await
            .unwrap();

        assert_eq!(payment.booking_id, booking.id);
        assert_eq!(payment.renter_id, renter.id);
        assert_eq!(payment.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_amount_mismatch_leaves_no_record() {
        let fx = fixture();
        let (_, booking) = seeded(&fx).await;

        let err = fx
            .service
            .make_payment(booking.id, dec!(499.99), PaymentMethod::CreditCard, None)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "amount_mismatch");

        // Idempotence: the failed call created nothing
        assert!(fx
            .payment_repo
            .find_by_booking(booking.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_second_payment_conflicts() {
        let fx = fixture();
        let (_, booking) = seeded(&fx).await;

        fx.service
            .make_payment(booking.id, dec!(500.00), PaymentMethod::Cash, None)
            .await
            .unwrap();

        let err = fx
            .service
            .make_payment(booking.id, dec!(500.00), PaymentMethod::Cash, None)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "already_exists");
    }

    #[tokio::test]
    async fn test_payment_for_missing_booking() {
        let fx = fixture();

        let err = fx
            .service
            .make_payment(42, dec!(100.00), PaymentMethod::Paypal, None)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "booking_not_found");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let fx = fixture();
        let (_, booking) = seeded(&fx).await;

        let payment = fx
            .service
            .make_payment(
                booking.id,
                dec!(500.00),
                PaymentMethod::BankTransfer,
                Some("tx-123".to_string()),
            )
            .await
            .unwrap();

        let updated = fx
            .service
            .update_status(payment.id, PaymentStatus::Completed)
            .await
            .unwrap();
        assert_eq!(updated.payment_status, PaymentStatus::Completed);

        let updated = fx
            .service
            .update_method(payment.id, PaymentMethod::Paypal)
            .await
            .unwrap();
        assert_eq!(updated.payment_method, PaymentMethod::Paypal);

        fx.service.delete_by_booking(booking.id).await.unwrap();
        let err = fx.service.delete_by_booking(booking.id).await.unwrap_err();
        assert_eq!(err.error_code(), "payment_not_found");
    }

    #[tokio::test]
    async fn test_totals() {
        let fx = fixture();
        let (_, booking) = seeded(&fx).await;

        // Empty platform: aggregate reads are NotFound by policy
        let err = fx.service.total_paid().await.unwrap_err();
        assert_eq!(err.error_code(), "not_found");
        let err = fx.service.total_paid_by_renter("ana").await.unwrap_err();
        assert_eq!(err.error_code(), "not_found");

        fx.service
            .make_payment(booking.id, dec!(500.00), PaymentMethod::Cash, None)
            .await
            .unwrap();

        assert_eq!(fx.service.total_paid().await.unwrap(), dec!(500.00));
        assert_eq!(
            fx.service.total_paid_by_renter("ana").await.unwrap(),
            dec!(500.00)
        );
        assert_eq!(
            fx.service.total_paid_for_property(1).await.unwrap(),
            dec!(500.00)
        );

        // Property without bookings
        let err = fx.service.total_paid_for_property(99).await.unwrap_err();
        assert_eq!(err.error_code(), "not_found");
    }

    #[tokio::test]
    async fn test_is_payment_owner() {
        let fx = fixture();
        let (_, booking) = seeded(&fx).await;

        let payment = fx
            .service
            .make_payment(booking.id, dec!(500.00), PaymentMethod::Cash, None)
            .await
            .unwrap();

        assert!(fx
            .service
            .is_payment_owner(payment.id, "ana")
            .await
            .unwrap());
        assert!(!fx
            .service
            .is_payment_owner(payment.id, "bob")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_booking_status_does_not_gate_payment() {
        let fx = fixture();
        let (_, booking) = seeded(&fx).await;
        fx.booking_repo
            .set_status(booking.id, BookingStatus::Completed)
            .await
            .unwrap();

        let payment = fx
            .service
            .make_payment(booking.id, dec!(500.00), PaymentMethod::Cash, None)
            .await
            .unwrap();
        assert_eq!(payment.amount, dec!(500.00));
    }
}
