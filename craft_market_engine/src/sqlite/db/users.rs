use cm_common::{GeoPoint, Money};
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewUser, User};

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, sqlx::Error> {
    let user: User = sqlx::query_as(
        "INSERT INTO users (name, role, latitude, longitude) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(user.name)
    .bind(user.role.to_string())
    .bind(user.location.map(|l| l.lat))
    .bind(user.location.map(|l| l.lng))
    .fetch_one(conn)
    .await?;
    debug!("📝️ {} #{} ({}) created", user.role, user.id, user.name);
    Ok(user)
}

pub async fn fetch_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn update_location(
    user_id: i64,
    location: GeoPoint,
    conn: &mut SqliteConnection,
) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as(
        "UPDATE users SET latitude = $1, longitude = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $3 RETURNING *",
    )
    .bind(location.lat)
    .bind(location.lng)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(user)
}

/// Atomic in-place revenue increment. Correct under concurrent deliveries without any
/// read-modify-write cycle.
pub(crate) async fn incr_revenue(
    user_id: i64,
    amount: Money,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET revenue = revenue + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
        .bind(amount)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}
