pub mod genre;
pub mod like;
pub mod movie;
pub mod movie_genre;
pub mod review;
pub mod user;
