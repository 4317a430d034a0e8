use std::convert::Infallible;

use warp::{
    reject::{self, Rejection},
    Filter,
};

use super::session::{verify_jwt_session, SessionData};
use crate::{AuthSettings, SESSION_COOKIE};

#[derive(Debug)]
struct Unauthorized;

impl reject::Reject for Unauthorized {}

/// Viewer of the request; a missing or invalid session cookie means anonymous.
pub fn with_viewer(
    settings: AuthSettings,
) -> impl Filter<Extract = (Option<SessionData>,), Error = Infallible> + Clone {
    warp::cookie::<String>(SESSION_COOKIE)
        .map(Some)
        .or(warp::any().map(|| None))
        .unify()
        .map(move |session: Option<String>| {
            session.and_then(|token| match verify_jwt_session(&token, &settings) {
                Ok(data) => Some(SessionData::from(data)),
                Err(_) => {
                    log::trace!("> Ignoring invalid session cookie");
                    None
                }
            })
        })
}

/// Like `with_viewer`, but rejects anonymous requests.
pub fn with_session(
    settings: AuthSettings,
) -> impl Filter<Extract = (SessionData,), Error = Rejection> + Clone {
    with_viewer(settings).and_then(|viewer: Option<SessionData>| async move {
        match viewer {
            Some(session) => Ok(session),
            None => Err(warp::reject::custom(Unauthorized)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        schema::{User, UserRole},
        session::generate_jwt_session,
    };

    fn token(settings: &AuthSettings) -> String {
        let user = User {
            id: 11,
            username: String::from("baker"),
            email: String::from("baker@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            password: String::new(),
            role: UserRole::User,
        };
        generate_jwt_session(&user, settings).unwrap()
    }

    #[tokio::test]
    async fn missing_cookie_is_anonymous() {
        let viewer = warp::test::request()
            .filter(&with_viewer(AuthSettings::new("secret")))
            .await
            .unwrap();

        assert!(viewer.is_none());
    }

    #[tokio::test]
    async fn valid_cookie_yields_session() {
        let settings = AuthSettings::new("secret");
        let viewer = warp::test::request()
            .header("cookie", format!("{SESSION_COOKIE}={}", token(&settings)))
            .filter(&with_viewer(settings))
            .await
            .unwrap();

        assert_eq!(viewer.map(|s| s.user_id), Some(11));
    }

    #[tokio::test]
    async fn forged_cookie_is_anonymous() {
        let forged = token(&AuthSettings::new("other"));
        let viewer = warp::test::request()
            .header("cookie", format!("{SESSION_COOKIE}={forged}"))
            .filter(&with_viewer(AuthSettings::new("secret")))
            .await
            .unwrap();

        assert!(viewer.is_none());
    }

    #[tokio::test]
    async fn session_filter_rejects_anonymous() {
        let result = warp::test::request()
            .filter(&with_session(AuthSettings::new("secret")))
            .await;

        assert!(result.is_err());
    }
}
