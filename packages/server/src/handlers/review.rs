use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{Actor, Operation, Ownership, Resource, authorize};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{like, review};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::CurrentActor;
use crate::extractors::json::ValidJson;
use crate::models::review::*;
use crate::services::aggregation::like_counts;
use crate::services::constraints::{
    review_write_error, validate_review_create, validate_review_update,
};
use crate::services::lookup::{find_movie, find_review, usernames};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Reviews",
    operation_id = "listReviews",
    summary = "List reviews",
    description = "Newest first, optionally restricted to one movie. Open to anonymous callers.",
    params(ReviewListQuery),
    responses(
        (status = 200, description = "Reviews", body = Vec<ReviewResponse>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    let mut select = review::Entity::find();
    if let Some(movie_id) = query.movie_id {
        select = select.filter(review::Column::MovieId.eq(movie_id));
    }

    let reviews = select
        .order_by_desc(review::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(review_responses(&state.db, reviews).await?))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Reviews",
    operation_id = "createReview",
    summary = "Review a movie",
    description = "The author is always the caller; any `user` in the body is ignored. One review per user per movie.",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Rating outside 1-10 (INVALID_RATING) or bad body (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Movie not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already reviewed (DUPLICATE_REVIEW)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, actor, payload), fields(movie_id = payload.movie))]
pub async fn create_review(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&actor, Resource::Review, Operation::Create, Ownership::NotApplicable)?;
    let user_id = session_user_id(&actor)?;

    find_movie(&state.db, payload.movie).await?;
    let rating = validate_review_create(&state.db, user_id, payload.movie, payload.rating).await?;

    let now = chrono::Utc::now();
    let model = review::ActiveModel {
        user_id: Set(user_id),
        movie_id: Set(payload.movie),
        rating: Set(rating.get()),
        comment: Set(payload.comment),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(review_write_error)?;

    tracing::info!(review_id = model.id, user_id, "Created review");

    let response = review_response(&state.db, model).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Reviews",
    operation_id = "getReview",
    summary = "Get a review by ID",
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review", body = ReviewResponse),
        (status = 404, description = "Review not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ReviewResponse>, AppError> {
    let model = find_review(&state.db, id).await?;
    Ok(Json(review_response(&state.db, model).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Reviews",
    operation_id = "updateReview",
    summary = "Update a review",
    description = "Owner only; administrators have no override. PATCH semantics; `comment: null` clears the comment. Moving the review to another movie is subject to the one-review-per-movie rule.",
    params(("id" = i32, Path, description = "Review ID")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse),
        (status = 400, description = "Rating outside 1-10 (INVALID_RATING) or bad body (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Review or movie not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already reviewed that movie (DUPLICATE_REVIEW)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, actor, payload), fields(id))]
pub async fn update_review(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidJson(payload): ValidJson<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    let existing = find_review(&state.db, id).await?;
    authorize(
        &actor,
        Resource::Review,
        Operation::Update,
        actor.ownership_of(existing.user_id),
    )?;

    if payload == UpdateReviewRequest::default() {
        return Ok(Json(review_response(&state.db, existing).await?));
    }

    if let Some(movie_id) = payload.movie {
        find_movie(&state.db, movie_id).await?;
    }
    let rating = validate_review_update(&state.db, &existing, payload.movie, payload.rating).await?;

    let mut active: review::ActiveModel = existing.into();
    if let Some(movie_id) = payload.movie {
        active.movie_id = Set(movie_id);
    }
    if let Some(rating) = rating {
        active.rating = Set(rating.get());
    }
    if let Some(comment) = payload.comment {
        active.comment = Set(comment);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active
        .update(&state.db)
        .await
        .map_err(review_write_error)?;

    Ok(Json(review_response(&state.db, model).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Reviews",
    operation_id = "deleteReview",
    summary = "Delete a review",
    description = "Owner only; administrators have no override. Cascade-deletes the review's likes.",
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Review not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, actor), fields(id))]
pub async fn delete_review(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_review(&txn, id).await?;
    authorize(
        &actor,
        Resource::Review,
        Operation::Delete,
        actor.ownership_of(existing.user_id),
    )?;

    like::Entity::delete_many()
        .filter(like::Column::ReviewId.eq(id))
        .exec(&txn)
        .await?;
    review::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The authenticated caller's ID, `TOKEN_MISSING` for an anonymous actor.
pub(crate) fn session_user_id(actor: &Actor) -> Result<i32, AppError> {
    actor.id().ok_or(AppError::TokenMissing)
}

/// Shape reviews for output, resolving author names and like counts in bulk.
pub(crate) async fn review_responses<C: ConnectionTrait>(
    db: &C,
    reviews: Vec<review::Model>,
) -> Result<Vec<ReviewResponse>, AppError> {
    let ids: Vec<i32> = reviews.iter().map(|r| r.id).collect();
    let names = usernames(db, reviews.iter().map(|r| r.user_id)).await?;
    let likes = like_counts(db, &ids).await?;

    Ok(reviews
        .into_iter()
        .map(|r| {
            let username = names.get(&r.user_id).cloned().unwrap_or_default();
            let like_count = likes.get(&r.id).copied().unwrap_or(0);
            ReviewResponse::new(r, username, like_count)
        })
        .collect())
}

async fn review_response<C: ConnectionTrait>(
    db: &C,
    model: review::Model,
) -> Result<ReviewResponse, AppError> {
    review_responses(db, vec![model])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("review vanished while building response".into()))
}
