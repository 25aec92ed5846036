use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: String,
}

/// The authenticated caller of an operation, resolved per request from its
/// bearer token and handed explicitly to every mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl Actor {
    pub fn can_modify(&self, owner_id: i64) -> bool {
        self.is_admin || self.user_id == owner_id
    }
}

impl From<&User> for Actor {
    fn from(u: &User) -> Self {
        Self {
            user_id: u.id,
            username: u.username.clone(),
            is_admin: u.is_admin,
        }
    }
}
