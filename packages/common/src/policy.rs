use serde::Serialize;

use crate::error::DomainError;

/// The identity a request acts as.
///
/// Always derived from the session, never from a request body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User { id: i32, is_admin: bool },
}

/// Coarse role an [`Actor`] plays in the decision table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Anonymous,
    Member,
    Admin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Genre,
    Movie,
    Review,
    Like,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

/// Relationship between the actor and the target entity's stored owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// The target has no owner (collections, catalogue entries, new rows).
    NotApplicable,
    Owner,
    NonOwner,
}

impl Actor {
    pub fn id(&self) -> Option<i32> {
        match self {
            Actor::Anonymous => None,
            Actor::User { id, .. } => Some(*id),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Actor::Anonymous => Role::Anonymous,
            Actor::User { is_admin: true, .. } => Role::Admin,
            Actor::User { is_admin: false, .. } => Role::Member,
        }
    }

    /// Compare the actor against an entity's stored `user_id`.
    pub fn ownership_of(&self, owner_id: i32) -> Ownership {
        match self.id() {
            Some(id) if id == owner_id => Ownership::Owner,
            _ => Ownership::NonOwner,
        }
    }
}

/// Decide whether `actor` may perform `operation` on `resource`.
///
/// Reads are open to everyone. Catalogue entries (genres, movies) are
/// admin-only for writes. Reviews and likes may be created by any
/// authenticated actor, but only their owner may change or remove them:
/// administrators get no override there.
///
/// Anonymous actors that are refused get [`DomainError::Unauthenticated`];
/// authenticated actors get [`DomainError::Forbidden`].
pub fn authorize(
    actor: &Actor,
    resource: Resource,
    operation: Operation,
    ownership: Ownership,
) -> Result<(), DomainError> {
    let role = actor.role();

    let allowed = match (resource, operation) {
        (_, Operation::Read) => true,
        (Resource::Genre | Resource::Movie, _) => role == Role::Admin,
        (Resource::Review | Resource::Like, Operation::Create) => role != Role::Anonymous,
        (Resource::Review | Resource::Like, Operation::Update | Operation::Delete) => {
            role != Role::Anonymous && ownership == Ownership::Owner
        }
    };

    if allowed {
        Ok(())
    } else if role == Role::Anonymous {
        Err(DomainError::Unauthenticated)
    } else {
        Err(DomainError::Forbidden)
    }
}
