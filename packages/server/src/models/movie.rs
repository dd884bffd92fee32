use chrono::{DateTime, NaiveDate, Utc};
use common::RatingSummary;
use serde::{Deserialize, Serialize};

use super::shared::{Validate, validate_text_len};
use crate::error::AppError;

pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 10_000;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateMovieRequest {
    #[schema(example = "Arrival")]
    pub title: String,
    pub description: String,
    #[schema(value_type = String, format = Date, example = "2016-11-11")]
    pub release_date: NaiveDate,
    /// IDs of the genres to attach.
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

impl Validate for CreateMovieRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_text_len(&self.title, "Title", TITLE_MAX)?;
        validate_description(&self.description)
    }
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub release_date: Option<NaiveDate>,
    /// Replaces the movie's genre set when present.
    pub genre_ids: Option<Vec<i32>>,
}

impl Validate for UpdateMovieRequest {
    fn validate(&self) -> Result<(), AppError> {
        if let Some(ref title) = self.title {
            validate_text_len(title, "Title", TITLE_MAX)?;
        }
        if let Some(ref description) = self.description {
            validate_description(description)?;
        }
        Ok(())
    }
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.chars().count() > DESCRIPTION_MAX {
        return Err(AppError::Validation(format!(
            "Description must be at most {DESCRIPTION_MAX} characters"
        )));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MovieResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    #[schema(value_type = String, format = Date)]
    pub release_date: NaiveDate,
    /// Genre names, alphabetical.
    pub genres: Vec<String>,
    /// Mean review rating to one decimal, `null` when unreviewed.
    #[schema(example = 7.5)]
    pub average_rating: Option<f64>,
    pub review_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MovieResponse {
    pub fn new(
        m: crate::entity::movie::Model,
        genres: Vec<String>,
        ratings: RatingSummary,
    ) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            release_date: m.release_date,
            genres,
            average_rating: ratings.average(),
            review_count: ratings.count,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
