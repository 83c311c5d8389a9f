use std::fmt::Debug;

use cm_common::GeoPoint;
use log::debug;

use crate::{
    db_types::User,
    traits::{ProfileApiError, ProfileManagement},
};

/// `ProfileApi` exposes the profile operations the core depends on. Registration and
/// authentication live upstream; this is only the coordinate and lookup surface.
pub struct ProfileApi<B> {
    db: B,
}

impl<B> Debug for ProfileApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProfileApi")
    }
}

impl<B> ProfileApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ProfileApi<B>
where B: ProfileManagement
{
    pub async fn profile(&self, user_id: i64) -> Result<User, ProfileApiError> {
        self.db.fetch_user(user_id).await?.ok_or(ProfileApiError::UserNotFound(user_id))
    }

    /// Overwrites the caller's profile coordinates. Orders approved before the move keep the
    /// snapshot they took.
    pub async fn update_location(&self, user_id: i64, location: GeoPoint) -> Result<User, ProfileApiError> {
        let user = self.db.update_user_location(user_id, location).await?;
        debug!("🧭️ User #{user_id} moved to {location}");
        Ok(user)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
