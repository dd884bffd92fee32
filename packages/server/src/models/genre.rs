use serde::{Deserialize, Serialize};

use super::shared::{Validate, validate_text_len};
use crate::error::AppError;

pub const GENRE_NAME_MAX: usize = 100;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateGenreRequest {
    #[schema(example = "Science Fiction")]
    pub name: String,
}

impl Validate for CreateGenreRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_text_len(&self.name, "Name", GENRE_NAME_MAX)
    }
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateGenreRequest {
    pub name: Option<String>,
}

impl Validate for UpdateGenreRequest {
    fn validate(&self) -> Result<(), AppError> {
        match self.name {
            Some(ref name) => validate_text_len(name, "Name", GENRE_NAME_MAX),
            None => Ok(()),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GenreResponse {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "Science Fiction")]
    pub name: String,
}

impl From<crate::entity::genre::Model> for GenreResponse {
    fn from(m: crate::entity::genre::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}
