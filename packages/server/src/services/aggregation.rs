//! Derived, read-only figures. Recomputed from the current rows on every
//! request; nothing here is cached.

use std::collections::HashMap;

use common::RatingSummary;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::Func;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter, QuerySelect};

use crate::entity::{like, review};
use crate::error::AppError;

#[derive(FromQueryResult)]
struct RatingRow {
    movie_id: i32,
    review_count: i64,
    rating_sum: Option<i64>,
}

#[derive(FromQueryResult)]
struct LikeCountRow {
    review_id: i32,
    like_count: i64,
}

/// Review count and rating total for each movie. Movies without reviews are
/// absent from the map; use `unwrap_or_default()` to get the empty summary.
pub async fn rating_summaries<C: ConnectionTrait>(
    db: &C,
    movie_ids: &[i32],
) -> Result<HashMap<i32, RatingSummary>, AppError> {
    if movie_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = review::Entity::find()
        .select_only()
        .column(review::Column::MovieId)
        .column_as(
            Expr::expr(Func::count(Expr::col(review::Column::Id))),
            "review_count",
        )
        .column_as(
            Expr::expr(Func::sum(Expr::col(review::Column::Rating))),
            "rating_sum",
        )
        .filter(review::Column::MovieId.is_in(movie_ids.iter().copied()))
        .group_by(review::Column::MovieId)
        .into_model::<RatingRow>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| {
            let summary = RatingSummary::new(
                r.review_count.max(0) as u64,
                r.rating_sum.unwrap_or(0),
            );
            (r.movie_id, summary)
        })
        .collect())
}

/// Summary for a single movie.
pub async fn rating_summary<C: ConnectionTrait>(
    db: &C,
    movie_id: i32,
) -> Result<RatingSummary, AppError> {
    Ok(rating_summaries(db, &[movie_id])
        .await?
        .remove(&movie_id)
        .unwrap_or_default())
}

/// Number of likes on each review; reviews without likes are absent.
pub async fn like_counts<C: ConnectionTrait>(
    db: &C,
    review_ids: &[i32],
) -> Result<HashMap<i32, u64>, AppError> {
    if review_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = like::Entity::find()
        .select_only()
        .column(like::Column::ReviewId)
        .column_as(
            Expr::expr(Func::count(Expr::col(like::Column::Id))),
            "like_count",
        )
        .filter(like::Column::ReviewId.is_in(review_ids.iter().copied()))
        .group_by(like::Column::ReviewId)
        .into_model::<LikeCountRow>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| (r.review_id, r.like_count.max(0) as u64))
        .collect())
}
