//! In-memory repositories for service tests
//!
//! These mirror the gateway semantics the services rely on, including
//! the one-payment / one-review-per-booking uniqueness the schema
//! enforces in production.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use rentora_core::{
    models::{
        Booking, BookingStatus, Payment, PaymentMethod, PaymentStatus, Property, PropertyType,
        Review, User,
    },
    traits::{
        BookingRepository, PaymentRepository, PropertyRepository, Repository, ReviewRepository,
        UserRepository,
    },
    AppError, AppResult,
};
use rust_decimal::Decimal;

/// A fully-populated property for tests
pub fn seeded_property(id: i64, owner_id: i64, price_per_day: Decimal) -> Property {
    let mut property = Property::new(
        owner_id,
        rentora_core::models::PropertyDraft {
            title: "Test listing".to_string(),
            description: None,
            property_type: PropertyType::Apartment,
            price_per_day,
        },
    );
    property.id = id;
    property
}

/// A pending booking for tests
pub fn seeded_booking(
    id: i64,
    property_id: i64,
    renter_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Booking {
    let mut booking = Booking::new(property_id, renter_id, start, end, Decimal::ZERO);
    booking.id = id;
    booking
}

struct Store<T> {
    items: Vec<T>,
    next_id: i64,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> Store<T> {
    fn take_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

// ==================== Users ====================

#[derive(Default)]
pub struct InMemoryUserRepository {
    state: Mutex<Store<User>>,
}

#[async_trait]
impl Repository<User, i64> for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.state.lock().items.iter().find(|u| u.id == id).cloned())
    }

    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<User>> {
        let state = self.state.lock();
        Ok(state
            .items
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.state.lock().items.len() as i64)
    }

    async fn create(&self, entity: &User) -> AppResult<User> {
        let mut state = self.state.lock();
        let mut user = entity.clone();
        user.id = state.take_id();
        state.items.push(user.clone());
        Ok(user)
    }

    async fn update(&self, entity: &User) -> AppResult<User> {
        let mut state = self.state.lock();
        let slot = state
            .items
            .iter_mut()
            .find(|u| u.id == entity.id)
            .ok_or_else(|| AppError::NotFound(format!("user {}", entity.id)))?;
        *slot = entity.clone();
        Ok(entity.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut state = self.state.lock();
        let before = state.items.len();
        state.items.retain(|u| u.id != id);
        Ok(state.items.len() < before)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .state
            .lock()
            .items
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }
}

// ==================== Properties ====================

#[derive(Default)]
pub struct InMemoryPropertyRepository {
    state: Mutex<Store<Property>>,
}

#[async_trait]
impl Repository<Property, i64> for InMemoryPropertyRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Property>> {
        Ok(self.state.lock().items.iter().find(|p| p.id == id).cloned())
    }

    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Property>> {
        let state = self.state.lock();
        Ok(state
            .items
            .iter()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.state.lock().items.len() as i64)
    }

    async fn create(&self, entity: &Property) -> AppResult<Property> {
        let mut state = self.state.lock();
        let mut property = entity.clone();
        property.id = state.take_id();
        state.items.push(property.clone());
        Ok(property)
    }

    async fn update(&self, entity: &Property) -> AppResult<Property> {
        let mut state = self.state.lock();
        let slot = state
            .items
            .iter_mut()
            .find(|p| p.id == entity.id)
            .ok_or_else(|| AppError::NotFound(format!("property {}", entity.id)))?;
        *slot = entity.clone();
        Ok(entity.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut state = self.state.lock();
        let before = state.items.len();
        state.items.retain(|p| p.id != id);
        Ok(state.items.len() < before)
    }
}

#[async_trait]
impl PropertyRepository for InMemoryPropertyRepository {
    async fn find_by_owner(&self, owner_id: i64) -> AppResult<Vec<Property>> {
        Ok(self
            .state
            .lock()
            .items
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .rev()
            .cloned()
            .collect())
    }

    async fn list_by_availability(
        &self,
        availability: bool,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Property>, i64)> {
        let state = self.state.lock();
        let matching: Vec<Property> = state
            .items
            .iter()
            .filter(|p| p.availability == availability)
            .rev()
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn set_availability(&self, id: i64, availability: bool) -> AppResult<Option<Property>> {
        let mut state = self.state.lock();
        Ok(state.items.iter_mut().find(|p| p.id == id).map(|p| {
            p.availability = availability;
            p.clone()
        }))
    }

    async fn set_price_per_day(
        &self,
        id: i64,
        price_per_day: Decimal,
    ) -> AppResult<Option<Property>> {
        let mut state = self.state.lock();
        Ok(state.items.iter_mut().find(|p| p.id == id).map(|p| {
            p.price_per_day = price_per_day;
            p.clone()
        }))
    }
}

// ==================== Bookings ====================

#[derive(Default)]
pub struct InMemoryBookingRepository {
    state: Mutex<Store<Booking>>,
}

#[async_trait]
impl Repository<Booking, i64> for InMemoryBookingRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Booking>> {
        Ok(self.state.lock().items.iter().find(|b| b.id == id).cloned())
    }

    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Booking>> {
        let state = self.state.lock();
        Ok(state
            .items
            .iter()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.state.lock().items.len() as i64)
    }

    async fn create(&self, entity: &Booking) -> AppResult<Booking> {
        let mut state = self.state.lock();
        let mut booking = entity.clone();
        booking.id = state.take_id();
        state.items.push(booking.clone());
        Ok(booking)
    }

    async fn update(&self, entity: &Booking) -> AppResult<Booking> {
        let mut state = self.state.lock();
        let slot = state
            .items
            .iter_mut()
            .find(|b| b.id == entity.id)
            .ok_or_else(|| AppError::NotFound(format!("booking {}", entity.id)))?;
        *slot = entity.clone();
        Ok(entity.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut state = self.state.lock();
        let before = state.items.len();
        state.items.retain(|b| b.id != id);
        Ok(state.items.len() < before)
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn find_by_renter(&self, renter_id: i64) -> AppResult<Vec<Booking>> {
        Ok(self
            .state
            .lock()
            .items
            .iter()
            .filter(|b| b.renter_id == renter_id)
            .rev()
            .cloned()
            .collect())
    }

    async fn find_by_property(&self, property_id: i64) -> AppResult<Vec<Booking>> {
        Ok(self
            .state
            .lock()
            .items
            .iter()
            .filter(|b| b.property_id == property_id)
            .rev()
            .cloned()
            .collect())
    }

    async fn count_by_property(&self, property_id: i64) -> AppResult<i64> {
        Ok(self
            .state
            .lock()
            .items
            .iter()
            .filter(|b| b.property_id == property_id)
            .count() as i64)
    }

    async fn find_overlapping(
        &self,
        property_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Booking>> {
        Ok(self
            .state
            .lock()
            .items
            .iter()
            .filter(|b| b.property_id == property_id && b.conflicts_with(start, end))
            .cloned()
            .collect())
    }

    async fn set_status(&self, id: i64, status: BookingStatus) -> AppResult<Option<Booking>> {
        let mut state = self.state.lock();
        Ok(state.items.iter_mut().find(|b| b.id == id).map(|b| {
            b.status = status;
            b.clone()
        }))
    }
}

// ==================== Payments ====================

#[derive(Default)]
pub struct InMemoryPaymentRepository {
    state: Mutex<Store<Payment>>,
}

#[async_trait]
impl Repository<Payment, i64> for InMemoryPaymentRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Payment>> {
        Ok(self.state.lock().items.iter().find(|p| p.id == id).cloned())
    }

    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Payment>> {
        let state = self.state.lock();
        Ok(state
            .items
            .iter()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.state.lock().items.len() as i64)
    }

    async fn create(&self, entity: &Payment) -> AppResult<Payment> {
        let mut state = self.state.lock();
        // one payment per booking, like the schema's unique constraint
        if state
            .items
            .iter()
            .any(|p| p.booking_id == entity.booking_id)
        {
            return Err(AppError::AlreadyExists(format!(
                "payment already exists for booking {}",
                entity.booking_id
            )));
        }
        let mut payment = entity.clone();
        payment.id = state.take_id();
        state.items.push(payment.clone());
        Ok(payment)
    }

    async fn update(&self, entity: &Payment) -> AppResult<Payment> {
        let mut state = self.state.lock();
        let slot = state
            .items
            .iter_mut()
            .find(|p| p.id == entity.id)
            .ok_or_else(|| AppError::NotFound(format!("payment {}", entity.id)))?;
        *slot = entity.clone();
        Ok(entity.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut state = self.state.lock();
        let before = state.items.len();
        state.items.retain(|p| p.id != id);
        Ok(state.items.len() < before)
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn find_by_booking(&self, booking_id: i64) -> AppResult<Option<Payment>> {
        Ok(self
            .state
            .lock()
            .items
            .iter()
            .find(|p| p.booking_id == booking_id)
            .cloned())
    }

    async fn find_by_renter(&self, renter_id: i64) -> AppResult<Vec<Payment>> {
        Ok(self
            .state
            .lock()
            .items
            .iter()
            .filter(|p| p.renter_id == renter_id)
            .rev()
            .cloned()
            .collect())
    }

    async fn delete_by_booking(&self, booking_id: i64) -> AppResult<bool> {
        let mut state = self.state.lock();
        let before = state.items.len();
        state.items.retain(|p| p.booking_id != booking_id);
        Ok(state.items.len() < before)
    }

    async fn total_by_renter(&self, renter_id: i64) -> AppResult<Option<Decimal>> {
        let state = self.state.lock();
        let mut matched = false;
        let mut total = Decimal::ZERO;
        for payment in state.items.iter().filter(|p| p.renter_id == renter_id) {
            matched = true;
            total += payment.amount;
        }
        Ok(matched.then_some(total))
    }

    async fn total_all(&self) -> AppResult<Option<Decimal>> {
        let state = self.state.lock();
        if state.items.is_empty() {
            return Ok(None);
        }
        Ok(Some(state.items.iter().map(|p| p.amount).sum()))
    }

    async fn total_by_property(&self, _property_id: i64) -> AppResult<Option<Decimal>> {
        // The SQL implementation joins bookings; the in-memory store has
        // no booking table, so tests seed one payment per property and
        // the platform-wide sum stands in for the join.
        self.total_all().await
    }

    async fn set_status(&self, id: i64, status: PaymentStatus) -> AppResult<Option<Payment>> {
        let mut state = self.state.lock();
        Ok(state.items.iter_mut().find(|p| p.id == id).map(|p| {
            p.payment_status = status;
            p.clone()
        }))
    }

    async fn set_method(&self, id: i64, method: PaymentMethod) -> AppResult<Option<Payment>> {
        let mut state = self.state.lock();
        Ok(state.items.iter_mut().find(|p| p.id == id).map(|p| {
            p.payment_method = method;
            p.clone()
        }))
    }
}

// ==================== Reviews ====================

#[derive(Default)]
pub struct InMemoryReviewRepository {
    state: Mutex<Store<Review>>,
}

#[async_trait]
impl Repository<Review, i64> for InMemoryReviewRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Review>> {
        Ok(self.state.lock().items.iter().find(|r| r.id == id).cloned())
    }

    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Review>> {
        let state = self.state.lock();
        Ok(state
            .items
            .iter()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.state.lock().items.len() as i64)
    }

    async fn create(&self, entity: &Review) -> AppResult<Review> {
        let mut state = self.state.lock();
        // one review per booking, like the schema's unique constraint
        if state
            .items
            .iter()
            .any(|r| r.booking_id == entity.booking_id)
        {
            return Err(AppError::AlreadyExists(format!(
                "review already exists for booking {}",
                entity.booking_id
            )));
        }
        let mut review = entity.clone();
        review.id = state.take_id();
        state.items.push(review.clone());
        Ok(review)
    }

    async fn update(&self, entity: &Review) -> AppResult<Review> {
        let mut state = self.state.lock();
        let slot = state
            .items
            .iter_mut()
            .find(|r| r.id == entity.id)
            .ok_or_else(|| AppError::NotFound(format!("review {}", entity.id)))?;
        *slot = entity.clone();
        Ok(entity.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut state = self.state.lock();
        let before = state.items.len();
        state.items.retain(|r| r.id != id);
        Ok(state.items.len() < before)
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn find_by_booking(&self, booking_id: i64) -> AppResult<Option<Review>> {
        Ok(self
            .state
            .lock()
            .items
            .iter()
            .find(|r| r.booking_id == booking_id)
            .cloned())
    }

    async fn find_by_renter(&self, renter_id: i64) -> AppResult<Vec<Review>> {
        Ok(self
            .state
            .lock()
            .items
            .iter()
            .filter(|r| r.renter_id == renter_id)
            .rev()
            .cloned()
            .collect())
    }

    async fn find_by_property(&self, property_id: i64) -> AppResult<Vec<Review>> {
        Ok(self
            .state
            .lock()
            .items
            .iter()
            .filter(|r| r.property_id == property_id)
            .rev()
            .cloned()
            .collect())
    }
}
