use anyhow::Context;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::*;
use tracing::info;

use crate::config::AuthConfig;
use crate::entity::{like, review, user};
use crate::utils::hash;

/// Ensure the composite unique indexes exist.
///
/// Schema sync only knows single-column uniqueness, so the
/// one-review-per-movie and one-like-per-review rules are created here.
/// They back the pre-insert checks when two writes race.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let review_user_movie = Index::create()
        .if_not_exists()
        .unique()
        .name("uq_review_user_movie")
        .table(review::Entity)
        .col(review::Column::UserId)
        .col(review::Column::MovieId)
        .to_owned();
    create_index(db, "uq_review_user_movie", &review_user_movie).await?;

    let like_user_review = Index::create()
        .if_not_exists()
        .unique()
        .name("uq_like_user_review")
        .table(like::Entity)
        .col(like::Column::UserId)
        .col(like::Column::ReviewId)
        .to_owned();
    create_index(db, "uq_like_user_review", &like_user_review).await?;

    Ok(())
}

async fn create_index(
    db: &DatabaseConnection,
    name: &str,
    stmt: &IndexCreateStatement,
) -> Result<(), DbErr> {
    let sql = db.get_database_backend().build(stmt);
    db.execute_raw(sql).await?;
    info!("Ensured index {} exists", name);
    Ok(())
}

/// Create or promote the bootstrap administrator.
///
/// Runs only when both `auth.admin_username` and `auth.admin_password` are
/// set. An existing account keeps its password and is only promoted.
pub async fn seed_admin(db: &DatabaseConnection, config: &AuthConfig) -> anyhow::Result<()> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(());
    };

    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(username.as_str()))
        .one(db)
        .await?;

    match existing {
        Some(u) if u.is_admin => {}
        Some(u) => {
            let mut active: user::ActiveModel = u.into();
            active.is_admin = Set(true);
            active.update(db).await?;
            info!(username = %username, "Promoted existing user to administrator");
        }
        None => {
            let hash = hash::hash_password(password)
                .map_err(|e| anyhow::anyhow!("{e}"))
                .context("Failed to hash bootstrap admin password")?;
            user::ActiveModel {
                username: Set(username.clone()),
                email: Set(String::new()),
                password: Set(hash),
                is_admin: Set(true),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            info!(username = %username, "Created bootstrap administrator");
        }
    }

    Ok(())
}
