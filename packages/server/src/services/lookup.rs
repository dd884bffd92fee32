use std::collections::HashMap;

use common::DomainError;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entity::{genre, like, movie, movie_genre, review, user};
use crate::error::AppError;

pub async fn find_genre<C: ConnectionTrait>(db: &C, id: i32) -> Result<genre::Model, AppError> {
    genre::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Genre").into())
}

pub async fn find_movie<C: ConnectionTrait>(db: &C, id: i32) -> Result<movie::Model, AppError> {
    movie::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Movie").into())
}

pub async fn find_review<C: ConnectionTrait>(db: &C, id: i32) -> Result<review::Model, AppError> {
    review::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Review").into())
}

pub async fn find_like<C: ConnectionTrait>(db: &C, id: i32) -> Result<like::Model, AppError> {
    like::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Like").into())
}

/// Check that every genre ID exists; returns them deduplicated.
pub async fn require_genres<C: ConnectionTrait>(db: &C, ids: &[i32]) -> Result<Vec<i32>, AppError> {
    let mut wanted: Vec<i32> = ids.to_vec();
    wanted.sort_unstable();
    wanted.dedup();
    if wanted.is_empty() {
        return Ok(wanted);
    }

    let found = genre::Entity::find()
        .filter(genre::Column::Id.is_in(wanted.iter().copied()))
        .all(db)
        .await?;
    if let Some(missing) = wanted.iter().find(|id| !found.iter().any(|g| g.id == **id)) {
        return Err(DomainError::not_found(format!("Genre {missing}")).into());
    }
    Ok(wanted)
}

/// Username for each of the given user IDs.
pub async fn usernames<C: ConnectionTrait>(
    db: &C,
    user_ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, String>, AppError> {
    let mut ids: Vec<i32> = user_ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
}

/// Genre names per movie, each list sorted alphabetically.
pub async fn genre_names<C: ConnectionTrait>(
    db: &C,
    movie_ids: &[i32],
) -> Result<HashMap<i32, Vec<String>>, AppError> {
    if movie_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let links = movie_genre::Entity::find()
        .filter(movie_genre::Column::MovieId.is_in(movie_ids.iter().copied()))
        .all(db)
        .await?;
    if links.is_empty() {
        return Ok(HashMap::new());
    }

    let names: HashMap<i32, String> = genre::Entity::find()
        .filter(genre::Column::Id.is_in(links.iter().map(|l| l.genre_id)))
        .all(db)
        .await?
        .into_iter()
        .map(|g| (g.id, g.name))
        .collect();

    let mut by_movie: HashMap<i32, Vec<String>> = HashMap::new();
    for link in links {
        if let Some(name) = names.get(&link.genre_id) {
            by_movie.entry(link.movie_id).or_default().push(name.clone());
        }
    }
    for list in by_movie.values_mut() {
        list.sort();
    }
    Ok(by_movie)
}
