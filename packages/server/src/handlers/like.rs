use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{Operation, Ownership, Resource, authorize};
use sea_orm::*;
use tracing::instrument;

use crate::entity::like;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::CurrentActor;
use crate::extractors::json::ValidJson;
use crate::handlers::review::session_user_id;
use crate::models::like::*;
use crate::services::constraints::{like_write_error, validate_like_create, validate_like_update};
use crate::services::lookup::{find_like, find_review, usernames};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Likes",
    operation_id = "listLikes",
    summary = "List likes",
    description = "Newest first. Open to anonymous callers.",
    responses(
        (status = 200, description = "Likes", body = Vec<LikeResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_likes(
    State(state): State<AppState>,
) -> Result<Json<Vec<LikeResponse>>, AppError> {
    let likes = like::Entity::find()
        .order_by_desc(like::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let names = usernames(&state.db, likes.iter().map(|l| l.user_id)).await?;
    let data = likes
        .into_iter()
        .map(|l| {
            let username = names.get(&l.user_id).cloned().unwrap_or_default();
            LikeResponse::new(l, username)
        })
        .collect();

    Ok(Json(data))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Likes",
    operation_id = "createLike",
    summary = "Like a review",
    description = "The liker is always the caller; any `user` in the body is ignored. One like per user per review.",
    request_body = CreateLikeRequest,
    responses(
        (status = 201, description = "Like created", body = LikeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Review not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already liked (DUPLICATE_LIKE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, actor, payload), fields(review_id = payload.review))]
pub async fn create_like(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateLikeRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&actor, Resource::Like, Operation::Create, Ownership::NotApplicable)?;
    let user_id = session_user_id(&actor)?;

    find_review(&state.db, payload.review).await?;
    validate_like_create(&state.db, user_id, payload.review).await?;

    let model = like::ActiveModel {
        user_id: Set(user_id),
        review_id: Set(payload.review),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(like_write_error)?;

    let response = like_response(&state.db, model).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Likes",
    operation_id = "getLike",
    summary = "Get a like by ID",
    params(("id" = i32, Path, description = "Like ID")),
    responses(
        (status = 200, description = "Like", body = LikeResponse),
        (status = 404, description = "Like not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_like(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LikeResponse>, AppError> {
    let model = find_like(&state.db, id).await?;
    Ok(Json(like_response(&state.db, model).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Likes",
    operation_id = "updateLike",
    summary = "Move a like to another review",
    description = "Owner only; administrators have no override. An empty payload returns the like unchanged.",
    params(("id" = i32, Path, description = "Like ID")),
    request_body = UpdateLikeRequest,
    responses(
        (status = 200, description = "Like updated", body = LikeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the liker (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Like or review not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already liked that review (DUPLICATE_LIKE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, actor, payload), fields(id))]
pub async fn update_like(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidJson(payload): ValidJson<UpdateLikeRequest>,
) -> Result<Json<LikeResponse>, AppError> {
    let existing = find_like(&state.db, id).await?;
    authorize(
        &actor,
        Resource::Like,
        Operation::Update,
        actor.ownership_of(existing.user_id),
    )?;

    let Some(review_id) = payload.review else {
        return Ok(Json(like_response(&state.db, existing).await?));
    };

    find_review(&state.db, review_id).await?;
    validate_like_update(&state.db, &existing, review_id).await?;

    let mut active: like::ActiveModel = existing.into();
    active.review_id = Set(review_id);
    let model = active.update(&state.db).await.map_err(like_write_error)?;

    Ok(Json(like_response(&state.db, model).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Likes",
    operation_id = "deleteLike",
    summary = "Remove a like",
    description = "Owner only; administrators have no override.",
    params(("id" = i32, Path, description = "Like ID")),
    responses(
        (status = 204, description = "Like deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the liker (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Like not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, actor), fields(id))]
pub async fn delete_like(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_like(&state.db, id).await?;
    authorize(
        &actor,
        Resource::Like,
        Operation::Delete,
        actor.ownership_of(existing.user_id),
    )?;

    let active: like::ActiveModel = existing.into();
    active.delete(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn like_response<C: ConnectionTrait>(
    db: &C,
    model: like::Model,
) -> Result<LikeResponse, AppError> {
    let username = usernames(db, [model.user_id])
        .await?
        .remove(&model.user_id)
        .unwrap_or_default();
    Ok(LikeResponse::new(model, username))
}
