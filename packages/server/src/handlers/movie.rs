use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{Operation, Ownership, Resource, authorize};
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{like, movie, movie_genre, review};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::CurrentActor;
use crate::extractors::json::ValidJson;
use crate::handlers::review::review_responses;
use crate::models::movie::*;
use crate::models::review::ReviewResponse;
use crate::services::aggregation::{rating_summaries, rating_summary};
use crate::services::lookup::{find_movie, genre_names, require_genres};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Movies",
    operation_id = "listMovies",
    summary = "List movies",
    description = "Returns every movie, newest release first, with genre names, average rating and review count. Open to anonymous callers.",
    responses(
        (status = 200, description = "All movies", body = Vec<MovieResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_movies(
    State(state): State<AppState>,
) -> Result<Json<Vec<MovieResponse>>, AppError> {
    let movies = movie::Entity::find()
        .order_by_desc(movie::Column::ReleaseDate)
        .order_by_asc(movie::Column::Title)
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = movies.iter().map(|m| m.id).collect();
    let mut genres = genre_names(&state.db, &ids).await?;
    let summaries = rating_summaries(&state.db, &ids).await?;

    let data = movies
        .into_iter()
        .map(|m| {
            let names = genres.remove(&m.id).unwrap_or_default();
            let ratings = summaries.get(&m.id).copied().unwrap_or_default();
            MovieResponse::new(m, names, ratings)
        })
        .collect();

    Ok(Json(data))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Movies",
    operation_id = "createMovie",
    summary = "Create a movie",
    description = "Admin only. Every ID in `genre_ids` must exist.",
    request_body = CreateMovieRequest,
    responses(
        (status = 201, description = "Movie created", body = MovieResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Unknown genre (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, actor, payload), fields(title = %payload.title))]
pub async fn create_movie(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateMovieRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&actor, Resource::Movie, Operation::Create, Ownership::NotApplicable)?;

    let txn = state.db.begin().await?;
    let genre_ids = require_genres(&txn, &payload.genre_ids).await?;

    let now = chrono::Utc::now();
    let model = movie::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        release_date: Set(payload.release_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    link_genres(&txn, model.id, &genre_ids).await?;
    let names = genre_names(&txn, &[model.id])
        .await?
        .remove(&model.id)
        .unwrap_or_default();
    txn.commit().await?;

    tracing::info!(movie_id = model.id, "Created movie");

    Ok((
        StatusCode::CREATED,
        Json(MovieResponse::new(model, names, Default::default())),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Movies",
    operation_id = "getMovie",
    summary = "Get a movie by ID",
    params(("id" = i32, Path, description = "Movie ID")),
    responses(
        (status = 200, description = "Movie details", body = MovieResponse),
        (status = 404, description = "Movie not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MovieResponse>, AppError> {
    let model = find_movie(&state.db, id).await?;
    Ok(Json(movie_response(&state.db, model).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Movies",
    operation_id = "updateMovie",
    summary = "Update a movie",
    description = "Admin only. PATCH semantics; `genre_ids`, when present, replaces the whole genre set. An empty payload returns the movie unchanged.",
    params(("id" = i32, Path, description = "Movie ID")),
    request_body = UpdateMovieRequest,
    responses(
        (status = 200, description = "Movie updated", body = MovieResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Movie or genre not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, actor, payload), fields(id))]
pub async fn update_movie(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidJson(payload): ValidJson<UpdateMovieRequest>,
) -> Result<Json<MovieResponse>, AppError> {
    authorize(&actor, Resource::Movie, Operation::Update, Ownership::NotApplicable)?;

    if payload == UpdateMovieRequest::default() {
        let existing = find_movie(&state.db, id).await?;
        return Ok(Json(movie_response(&state.db, existing).await?));
    }

    let txn = state.db.begin().await?;
    let existing = find_movie(&txn, id).await?;

    if let Some(ref ids) = payload.genre_ids {
        let genre_ids = require_genres(&txn, ids).await?;
        movie_genre::Entity::delete_many()
            .filter(movie_genre::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        link_genres(&txn, id, &genre_ids).await?;
    }

    let mut active: movie::ActiveModel = existing.into();
    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(release_date) = payload.release_date {
        active.release_date = Set(release_date);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    let response = movie_response(&txn, model).await?;
    txn.commit().await?;

    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Movies",
    operation_id = "deleteMovie",
    summary = "Delete a movie",
    description = "Admin only. Cascade-deletes the movie's reviews, the likes on those reviews, and its genre links.",
    params(("id" = i32, Path, description = "Movie ID")),
    responses(
        (status = 204, description = "Movie deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Movie not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, actor), fields(id))]
pub async fn delete_movie(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&actor, Resource::Movie, Operation::Delete, Ownership::NotApplicable)?;

    let txn = state.db.begin().await?;
    find_movie(&txn, id).await?;

    let likes = like::Entity::delete_many()
        .filter(
            like::Column::ReviewId.in_subquery(
                SeaQuery::select()
                    .column(review::Column::Id)
                    .from(review::Entity)
                    .and_where(review::Column::MovieId.eq(id))
                    .to_owned(),
            ),
        )
        .exec(&txn)
        .await?;
    let reviews = review::Entity::delete_many()
        .filter(review::Column::MovieId.eq(id))
        .exec(&txn)
        .await?;
    movie_genre::Entity::delete_many()
        .filter(movie_genre::Column::MovieId.eq(id))
        .exec(&txn)
        .await?;
    movie::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        reviews = reviews.rows_affected,
        likes = likes.rows_affected,
        "Deleted movie"
    );
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/reviews",
    tag = "Movies",
    operation_id = "listMovieReviews",
    summary = "List the reviews of a movie",
    description = "Newest first. Open to anonymous callers.",
    params(("id" = i32, Path, description = "Movie ID")),
    responses(
        (status = 200, description = "Reviews of the movie", body = Vec<ReviewResponse>),
        (status = 404, description = "Movie not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn list_movie_reviews(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    find_movie(&state.db, id).await?;

    let reviews = review::Entity::find()
        .filter(review::Column::MovieId.eq(id))
        .order_by_desc(review::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(review_responses(&state.db, reviews).await?))
}

async fn movie_response<C: ConnectionTrait>(
    db: &C,
    model: movie::Model,
) -> Result<MovieResponse, AppError> {
    let names = genre_names(db, &[model.id])
        .await?
        .remove(&model.id)
        .unwrap_or_default();
    let ratings = rating_summary(db, model.id).await?;
    Ok(MovieResponse::new(model, names, ratings))
}

async fn link_genres<C: ConnectionTrait>(
    db: &C,
    movie_id: i32,
    genre_ids: &[i32],
) -> Result<(), AppError> {
    if genre_ids.is_empty() {
        return Ok(());
    }
    let links = genre_ids.iter().map(|&genre_id| movie_genre::ActiveModel {
        movie_id: Set(movie_id),
        genre_id: Set(genre_id),
        ..Default::default()
    });
    movie_genre::Entity::insert_many(links)
        .exec_without_returning(db)
        .await?;
    Ok(())
}
