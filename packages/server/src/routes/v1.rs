use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/genres", genre_routes())
        .nest("/movies", movie_routes())
        .nest("/reviews", review_routes())
        .nest("/likes", like_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    use crate::handlers::auth::*;

    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
        .routes(routes!(me))
}

fn genre_routes() -> OpenApiRouter<AppState> {
    use crate::handlers::genre::*;

    OpenApiRouter::new()
        .routes(routes!(list_genres, create_genre))
        .routes(routes!(get_genre, update_genre, delete_genre))
}

fn movie_routes() -> OpenApiRouter<AppState> {
    use crate::handlers::movie::*;

    OpenApiRouter::new()
        .routes(routes!(list_movies, create_movie))
        .routes(routes!(get_movie, update_movie, delete_movie))
        .routes(routes!(list_movie_reviews))
}

fn review_routes() -> OpenApiRouter<AppState> {
    use crate::handlers::review::*;

    OpenApiRouter::new()
        .routes(routes!(list_reviews, create_review))
        .routes(routes!(get_review, update_review, delete_review))
}

fn like_routes() -> OpenApiRouter<AppState> {
    use crate::handlers::like::*;

    OpenApiRouter::new()
        .routes(routes!(list_likes, create_like))
        .routes(routes!(get_like, update_like, delete_like))
}
