use chrono::Duration;
use chrono::Local;
use hmac::{Hmac, Mac};
use jwt::SignWithKey;
use jwt::VerifyWithKey;
use serde::Deserialize;
use serde::Serialize;
use sha2::Sha256;

use crate::database::schema::{Id, User, UserRole};
use crate::AuthSettings;

use crate::error::ServiceError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtSessionData {
    pub user_id: Id,
    pub username: String,
    pub role: UserRole,
    iat: i64,
    exp: i64,
}

impl JwtSessionData {
    pub fn new(id: Id, username: String, role: UserRole, lifetime_hours: i64) -> Self {
        let now = Local::now();
        let iat = now.timestamp();
        let exp = (now + Duration::hours(lifetime_hours)).timestamp();

        Self {
            user_id: id,
            username,
            role,
            iat,
            exp,
        }
    }
}

/// The authenticated viewer of a request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: Id,
    pub username: String,
    pub role: UserRole,
    pub is_admin: bool,
}

impl From<JwtSessionData> for SessionData {
    fn from(value: JwtSessionData) -> Self {
        SessionData {
            user_id: value.user_id,
            username: value.username,
            is_admin: value.role == UserRole::Admin,
            role: value.role,
        }
    }
}

impl From<&User> for SessionData {
    fn from(user: &User) -> Self {
        SessionData {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role.clone(),
            is_admin: user.is_admin(),
        }
    }
}

fn signing_key(settings: &AuthSettings) -> Result<Hmac<Sha256>, ServiceError> {
    Hmac::new_from_slice(settings.jwt_secret.as_bytes()).map_err(|e| {
        log::error!("> Invalid session signing key: {e}");
        ServiceError::Internal(String::from("Invalid session signing key"))
    })
}

pub fn generate_jwt_session(user: &User, settings: &AuthSettings) -> Result<String, ServiceError> {
    let key = signing_key(settings)?;
    let claims = JwtSessionData::new(
        user.id,
        user.username.to_owned(),
        user.role.to_owned(),
        settings.session_hours,
    );

    claims.sign_with_key(&key).map_err(|e| {
        log::error!("> Failed to sign session: {e}");
        ServiceError::Internal(String::from("Failed to sign session"))
    })
}

pub fn verify_jwt_session(
    token: &str,
    settings: &AuthSettings,
) -> Result<JwtSessionData, ServiceError> {
    let key = signing_key(settings)?;

    let session: JwtSessionData = token
        .verify_with_key(&key)
        .map_err(|_| ServiceError::PermissionDenied)?;

    let now = Local::now().timestamp();
    if (session.exp - now).is_negative() {
        log::trace!("> Session of {} expired", session.username);
        return Err(ServiceError::PermissionDenied);
    }

    Ok(session)
}
