//! Caller identity extraction.
//!
//! Authentication and session management are handled by an upstream gateway, which is trusted to
//! strip and re-set the identity headers on every request. By the time a request reaches this
//! server the acting user is already established:
//!
//! * `cm-user-id` — the caller's user id.
//! * `cm-user-role` — `buyer` or `artisan` (case-insensitive).
//!
//! Handlers receive the identity as an [`AuthenticatedUser`] extractor and pass it into the
//! engine explicitly; nothing reads ambient request state past this point.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use craft_market_engine::db_types::Role;

use crate::errors::ServerError;

pub const USER_ID_HEADER: &str = "cm-user-id";
pub const USER_ROLE_HEADER: &str = "cm-user-role";

#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Guard for routes restricted to one role. Ownership and participation checks still happen
    /// in the engine; this only mirrors the coarse route-level authorization of the gateway.
    pub fn require_role(&self, role: Role) -> Result<(), ServerError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ServerError::InsufficientPermissions(format!("This route is only available to {role}s")))
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_identity(req))
    }
}

fn extract_identity(req: &HttpRequest) -> Result<AuthenticatedUser, ServerError> {
    let id = header_value(req, USER_ID_HEADER)?
        .parse::<i64>()
        .map_err(|e| ServerError::UnidentifiedCaller(format!("{USER_ID_HEADER} is not a valid user id: {e}")))?;
    let role = header_value(req, USER_ROLE_HEADER)?
        .parse::<Role>()
        .map_err(|e| ServerError::UnidentifiedCaller(e.to_string()))?;
    Ok(AuthenticatedUser { id, role })
}

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Result<&'a str, ServerError> {
    req.headers()
        .get(name)
        .ok_or_else(|| ServerError::UnidentifiedCaller(format!("{name} header is missing")))?
        .to_str()
        .map_err(|_| ServerError::UnidentifiedCaller(format!("{name} header is not valid UTF-8")))
}
