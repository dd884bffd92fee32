//! Write-time invariants for reviews and likes.
//!
//! The unique indexes on `review(user_id, movie_id)` and
//! `review_like(user_id, review_id)` are authoritative. The lookups here only
//! reject the common case early; a request that loses a race against an
//! identical one is caught by [`review_write_error`] / [`like_write_error`].

use common::{DomainError, Rating};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, SqlErr,
};

use crate::entity::{like, review};
use crate::error::AppError;

/// Check a new review: rating in range and no existing review for the pair.
pub async fn validate_review_create<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    movie_id: i32,
    rating: i64,
) -> Result<Rating, AppError> {
    let rating = Rating::try_from(rating)?;
    if review_exists(db, user_id, movie_id, None).await? {
        return Err(DomainError::DuplicateReview.into());
    }
    Ok(rating)
}

/// Check a review update that may change the rating or move it to another movie.
pub async fn validate_review_update<C: ConnectionTrait>(
    db: &C,
    existing: &review::Model,
    movie_id: Option<i32>,
    rating: Option<i64>,
) -> Result<Option<Rating>, AppError> {
    let rating = rating.map(Rating::try_from).transpose()?;
    if let Some(movie_id) = movie_id
        && movie_id != existing.movie_id
        && review_exists(db, existing.user_id, movie_id, Some(existing.id)).await?
    {
        return Err(DomainError::DuplicateReview.into());
    }
    Ok(rating)
}

/// Check a new like: the caller has not liked this review yet.
pub async fn validate_like_create<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    review_id: i32,
) -> Result<(), AppError> {
    if like_exists(db, user_id, review_id, None).await? {
        return Err(DomainError::DuplicateLike.into());
    }
    Ok(())
}

/// Check a like being moved to another review.
pub async fn validate_like_update<C: ConnectionTrait>(
    db: &C,
    existing: &like::Model,
    review_id: i32,
) -> Result<(), AppError> {
    if review_id != existing.review_id
        && like_exists(db, existing.user_id, review_id, Some(existing.id)).await?
    {
        return Err(DomainError::DuplicateLike.into());
    }
    Ok(())
}

/// Translate a failed review write, surfacing unique-index hits as `DuplicateReview`.
pub fn review_write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Duplicate review caught by unique index");
            DomainError::DuplicateReview.into()
        }
        _ => AppError::from(err),
    }
}

/// Translate a failed like write, surfacing unique-index hits as `DuplicateLike`.
pub fn like_write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Duplicate like caught by unique index");
            DomainError::DuplicateLike.into()
        }
        _ => AppError::from(err),
    }
}

async fn review_exists<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    movie_id: i32,
    exclude: Option<i32>,
) -> Result<bool, DbErr> {
    let mut select = review::Entity::find()
        .filter(review::Column::UserId.eq(user_id))
        .filter(review::Column::MovieId.eq(movie_id));
    if let Some(id) = exclude {
        select = select.filter(review::Column::Id.ne(id));
    }
    Ok(select.count(db).await? > 0)
}

async fn like_exists<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    review_id: i32,
    exclude: Option<i32>,
) -> Result<bool, DbErr> {
    let mut select = like::Entity::find()
        .filter(like::Column::UserId.eq(user_id))
        .filter(like::Column::ReviewId.eq(review_id));
    if let Some(id) = exclude {
        select = select.filter(like::Column::Id.ne(id));
    }
    Ok(select.count(db).await? > 0)
}
