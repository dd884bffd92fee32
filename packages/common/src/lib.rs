pub mod error;
pub mod policy;
pub mod rating;

pub use error::DomainError;
pub use policy::{Actor, Operation, Ownership, Resource, Role, authorize};
pub use rating::{Rating, RatingSummary};
