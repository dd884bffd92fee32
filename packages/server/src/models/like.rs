use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::Validate;

/// Request body for liking a review. The liker is always the caller.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateLikeRequest {
    /// ID of the review being liked.
    #[schema(example = 12)]
    pub review: i32,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateLikeRequest {
    /// Move the like to another review.
    pub review: Option<i32>,
}

impl Validate for CreateLikeRequest {}

impl Validate for UpdateLikeRequest {}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LikeResponse {
    pub id: i32,
    /// Liker's username.
    pub user: String,
    pub user_id: i32,
    /// ID of the liked review.
    pub review: i32,
    pub created_at: DateTime<Utc>,
}

impl LikeResponse {
    pub fn new(m: crate::entity::like::Model, username: String) -> Self {
        Self {
            id: m.id,
            user: username,
            user_id: m.user_id,
            review: m.review_id,
            created_at: m.created_at,
        }
    }
}
