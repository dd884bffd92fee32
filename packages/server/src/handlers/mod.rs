pub mod auth;
pub mod genre;
pub mod like;
pub mod movie;
pub mod review;
