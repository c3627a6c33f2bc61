//! Review gate service
//!
//! A review may be created only for a concluded booking, only once, and
//! only by the booking's renter. The input layer validates the rating
//! range before the core is invoked; the gate re-asserts it anyway.

use rentora_core::{
    models::{BookingStatus, Review, MAX_RATING, MIN_RATING},
    traits::{
        BookingRepository, PropertyRepository, Repository, ReviewRepository, UserRepository,
    },
    AppError, AppResult,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Review service
pub struct ReviewService<R, B, U, P>
where
    R: ReviewRepository,
    B: BookingRepository,
    U: UserRepository,
    P: PropertyRepository,
{
    review_repo: Arc<R>,
    booking_repo: Arc<B>,
    user_repo: Arc<U>,
    property_repo: Arc<P>,
}

fn check_rating(rating: i32) -> AppResult<()> {
    if !Review::rating_in_range(rating) {
        return Err(AppError::Validation(format!(
            "rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }
    Ok(())
}

impl<R, B, U, P> ReviewService<R, B, U, P>
where
    R: ReviewRepository,
    B: BookingRepository,
    U: UserRepository,
    P: PropertyRepository,
{
    /// Create a new review service
    pub fn new(
        review_repo: Arc<R>,
        booking_repo: Arc<B>,
        user_repo: Arc<U>,
        property_repo: Arc<P>,
    ) -> Self {
        Self {
            review_repo,
            booking_repo,
            user_repo,
            property_repo,
        }
    }

    /// Resolve a username and require it to be the review's renter
    async fn assert_review_owner(&self, review: &Review, username: &str) -> AppResult<()> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        if review.renter_id != user.id {
            return Err(AppError::Forbidden(
                "only the review's author may modify it".to_string(),
            ));
        }

        Ok(())
    }

    /// Create the review for a booking
    ///
    /// # Errors
    ///
    /// - `BookingNotFound` if the booking is absent
    /// - `Forbidden` if the requester is not the booking's renter
    /// - `AlreadyExists` if the booking already has a review
    /// - `IllegalState` unless the booking is completed
    /// - `Validation` if the rating falls outside [1, 5]
    #[instrument(skip(self, comment))]
    pub async fn create_review(
        &self,
        booking_id: i64,
        username: &str,
        rating: i32,
        comment: Option<String>,
    ) -> AppResult<Review> {
        let booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        if booking.renter_id != user.id {
            return Err(AppError::Forbidden(
                "only the booking's renter may review it".to_string(),
            ));
        }

        if self.review_repo.find_by_booking(booking_id).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "review already exists for booking {}",
                booking_id
            )));
        }

        if booking.status != BookingStatus::Completed {
            return Err(AppError::IllegalState(
                "booking must be completed to create a review".to_string(),
            ));
        }

        check_rating(rating)?;

        let review = Review::new(
            booking.id,
            booking.renter_id,
            booking.property_id,
            rating,
            comment,
        );
        let review = self.review_repo.create(&review).await?;

        info!(
            "Created review {} for booking {} with rating {}",
            review.id, booking_id, rating
        );

        Ok(review)
    }

    /// Fetch the review for a booking
    #[instrument(skip(self))]
    pub async fn get_by_booking(&self, booking_id: i64) -> AppResult<Review> {
        if self.booking_repo.find_by_id(booking_id).await?.is_none() {
            return Err(AppError::BookingNotFound(booking_id.to_string()));
        }

        self.review_repo
            .find_by_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::ReviewNotFound(format!("for booking {}", booking_id)))
    }

    /// List all reviews written by a renter, newest first
    ///
    /// Fails `NotFound` when the renter has none.
    #[instrument(skip(self))]
    pub async fn list_by_renter(&self, username: &str) -> AppResult<Vec<Review>> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        let reviews = self.review_repo.find_by_renter(user.id).await?;
        if reviews.is_empty() {
            return Err(AppError::NotFound(
                "No reviews found for this user".to_string(),
            ));
        }

        Ok(reviews)
    }

    /// List all reviews for a property, newest first
    ///
    /// Fails `NotFound` when the property has none.
    #[instrument(skip(self))]
    pub async fn list_by_property(&self, property_id: i64) -> AppResult<Vec<Review>> {
        if self.property_repo.find_by_id(property_id).await?.is_none() {
            return Err(AppError::PropertyNotFound(property_id.to_string()));
        }

        let reviews = self.review_repo.find_by_property(property_id).await?;
        if reviews.is_empty() {
            return Err(AppError::NotFound(
                "No reviews found for this property".to_string(),
            ));
        }

        Ok(reviews)
    }

    /// Replace the rating and comment of a review
    ///
    /// Only the review's author may update it.
    #[instrument(skip(self, comment))]
    pub async fn update_review(
        &self,
        review_id: i64,
        username: &str,
        rating: i32,
        comment: Option<String>,
    ) -> AppResult<Review> {
        let mut review = self
            .review_repo
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| AppError::ReviewNotFound(review_id.to_string()))?;

        self.assert_review_owner(&review, username).await?;
        check_rating(rating)?;

        review.rating = rating;
        review.comment = comment;
        review.review_date = Utc::now();

        debug!("Updating review {}", review_id);
        self.review_repo.update(&review).await
    }

    /// Update only the rating of a review
    #[instrument(skip(self))]
    pub async fn update_rating(
        &self,
        review_id: i64,
        username: &str,
        rating: i32,
    ) -> AppResult<Review> {
        let mut review = self
            .review_repo
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| AppError::ReviewNotFound(review_id.to_string()))?;

        self.assert_review_owner(&review, username).await?;
        check_rating(rating)?;

        review.rating = rating;
        review.review_date = Utc::now();

        self.review_repo.update(&review).await
    }

    /// Update only the comment of a review
    #[instrument(skip(self, comment))]
    pub async fn update_comment(
        &self,
        review_id: i64,
        username: &str,
        comment: String,
    ) -> AppResult<Review> {
        let mut review = self
            .review_repo
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| AppError::ReviewNotFound(review_id.to_string()))?;

        self.assert_review_owner(&review, username).await?;

        review.comment = Some(comment);
        review.review_date = Utc::now();

        self.review_repo.update(&review).await
    }

    /// Delete a review
    ///
    /// Only the review's author may delete it. The booking's reference to
    /// the review is derived through the gateway, so nothing dangles.
    #[instrument(skip(self))]
    pub async fn delete_review(&self, review_id: i64, username: &str) -> AppResult<()> {
        let review = self
            .review_repo
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| AppError::ReviewNotFound(review_id.to_string()))?;

        self.assert_review_owner(&review, username).await?;

        self.review_repo.delete(review_id).await?;
        info!("Deleted review {}", review_id);
        Ok(())
    }

    /// Whether the review was written by the given renter
    ///
    /// Consumed by the transport layer's authorization policy.
    #[instrument(skip(self))]
    pub async fn is_review_owner(&self, review_id: i64, username: &str) -> AppResult<bool> {
        let review = self
            .review_repo
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| AppError::ReviewNotFound(review_id.to_string()))?;

        let renter = self.user_repo.find_by_id(review.renter_id).await?;
        Ok(renter.map(|u| u.username == username).unwrap_or(false))
    }
}
