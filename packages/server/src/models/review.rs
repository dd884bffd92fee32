use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{Validate, double_option, validate_optional_text};
use crate::error::AppError;

pub const COMMENT_MAX: usize = 5_000;

/// Request body for creating a review. The author is always the caller.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateReviewRequest {
    /// ID of the movie being reviewed.
    #[schema(example = 1)]
    pub movie: i32,
    /// Score from 1 to 10.
    #[schema(example = 8, minimum = 1, maximum = 10)]
    pub rating: i64,
    pub comment: Option<String>,
}

impl Validate for CreateReviewRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_optional_text(self.comment.as_deref(), "Comment", COMMENT_MAX)
    }
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateReviewRequest {
    pub movie: Option<i32>,
    #[schema(minimum = 1, maximum = 10)]
    pub rating: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub comment: Option<Option<String>>,
}

impl Validate for UpdateReviewRequest {
    fn validate(&self) -> Result<(), AppError> {
        let comment = self.comment.as_ref().and_then(|c| c.as_deref());
        validate_optional_text(comment, "Comment", COMMENT_MAX)
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewListQuery {
    /// Only return reviews of this movie.
    pub movie_id: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    pub id: i32,
    /// Author's username.
    #[schema(example = "alice_wonder")]
    pub user: String,
    pub user_id: i32,
    /// ID of the reviewed movie.
    pub movie: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub like_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewResponse {
    pub fn new(m: crate::entity::review::Model, username: String, like_count: u64) -> Self {
        Self {
            id: m.id,
            user: username,
            user_id: m.user_id,
            movie: m.movie_id,
            rating: m.rating,
            comment: m.comment,
            like_count,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
