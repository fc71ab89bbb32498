use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Role an identity acts under. Resolved once when the caller is identified
/// and carried with the id from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn buyer(id: Uuid) -> Self {
        Self { id, role: Role::Buyer }
    }

    pub fn seller(id: Uuid) -> Self {
        Self {
            id,
            role: Role::Seller,
        }
    }

    pub fn admin(id: Uuid) -> Self {
        Self { id, role: Role::Admin }
    }
}
