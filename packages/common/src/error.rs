use thiserror::Error;

/// Validation and policy outcomes produced by the review rules.
///
/// None of these are fatal; the transport layer alone decides how they are
/// presented to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Rating must be between 1 and 10, got {0}")]
    InvalidRating(i64),

    #[error("You have already reviewed this movie")]
    DuplicateReview,

    #[error("You have already liked this review")]
    DuplicateLike,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthenticated,
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}
