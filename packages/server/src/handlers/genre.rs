use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{Operation, Ownership, Resource, authorize};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{genre, movie_genre};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::CurrentActor;
use crate::extractors::json::ValidJson;
use crate::models::genre::*;
use crate::services::lookup::find_genre;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Genres",
    operation_id = "listGenres",
    summary = "List genres",
    description = "Returns every genre ordered by name. Open to anonymous callers.",
    responses(
        (status = 200, description = "All genres", body = Vec<GenreResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_genres(
    State(state): State<AppState>,
) -> Result<Json<Vec<GenreResponse>>, AppError> {
    let genres = genre::Entity::find()
        .order_by_asc(genre::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(genres.into_iter().map(GenreResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Genres",
    operation_id = "createGenre",
    summary = "Create a genre",
    description = "Admin only. Genre names are unique.",
    request_body = CreateGenreRequest,
    responses(
        (status = 201, description = "Genre created", body = GenreResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Name already used (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, actor, payload), fields(name = %payload.name))]
pub async fn create_genre(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateGenreRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&actor, Resource::Genre, Operation::Create, Ownership::NotApplicable)?;

    let model = genre::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(genre_write_error)?;

    Ok((StatusCode::CREATED, Json(GenreResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Genres",
    operation_id = "getGenre",
    summary = "Get a genre by ID",
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre", body = GenreResponse),
        (status = 404, description = "Genre not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<GenreResponse>, AppError> {
    let model = find_genre(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Genres",
    operation_id = "updateGenre",
    summary = "Rename a genre",
    description = "Admin only. An empty payload returns the genre unchanged.",
    params(("id" = i32, Path, description = "Genre ID")),
    request_body = UpdateGenreRequest,
    responses(
        (status = 200, description = "Genre updated", body = GenreResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Genre not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name already used (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, actor, payload), fields(id))]
pub async fn update_genre(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidJson(payload): ValidJson<UpdateGenreRequest>,
) -> Result<Json<GenreResponse>, AppError> {
    authorize(&actor, Resource::Genre, Operation::Update, Ownership::NotApplicable)?;

    let existing = find_genre(&state.db, id).await?;
    let Some(name) = payload.name else {
        return Ok(Json(existing.into()));
    };

    let mut active: genre::ActiveModel = existing.into();
    active.name = Set(name.trim().to_string());
    let model = active.update(&state.db).await.map_err(genre_write_error)?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Genres",
    operation_id = "deleteGenre",
    summary = "Delete a genre",
    description = "Admin only. Detaches the genre from every movie; the movies themselves are kept.",
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Genre not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, actor), fields(id))]
pub async fn delete_genre(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&actor, Resource::Genre, Operation::Delete, Ownership::NotApplicable)?;

    let txn = state.db.begin().await?;
    find_genre(&txn, id).await?;

    movie_genre::Entity::delete_many()
        .filter(movie_genre::Column::GenreId.eq(id))
        .exec(&txn)
        .await?;
    genre::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

fn genre_write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("A genre with this name already exists".into())
        }
        _ => AppError::from(err),
    }
}
