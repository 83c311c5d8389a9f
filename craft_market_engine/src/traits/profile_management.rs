use cm_common::GeoPoint;
use thiserror::Error;

use crate::db_types::{NewUser, User};

/// The user/profile surface the core needs. Registration and authentication are handled
/// upstream; the engine only stores the profile fields it reads (role, coordinates, revenue).
#[allow(async_fn_in_trait)]
pub trait ProfileManagement {
    async fn insert_user(&self, user: NewUser) -> Result<User, ProfileApiError>;

    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, ProfileApiError>;

    /// Overwrites the user's profile coordinates. Orders already approved keep their snapshot.
    async fn update_user_location(&self, user_id: i64, location: GeoPoint) -> Result<User, ProfileApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum ProfileApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User {0} does not exist")]
    UserNotFound(i64),
}

impl From<sqlx::Error> for ProfileApiError {
    fn from(e: sqlx::Error) -> Self {
        ProfileApiError::DatabaseError(e.to_string())
    }
}
