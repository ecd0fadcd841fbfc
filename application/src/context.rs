//! [`Session`]-related definitions.

use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
};
use axum_extra::extract::CookieJar;
use common::DateTime;
use service::{
    command::{self, Command as _},
    domain::user::{self, session},
};

use crate::{define_error, AsError, Error, Service};

/// Name of the cookie carrying a [`session::Token`].
pub const TOKEN_COOKIE: &str = "note_token";

/// Authorized session of the [`user::User`] making the current HTTP request.
///
/// Rejects the request if it's not authorized.
#[derive(Clone, Debug)]
pub struct Session {
    /// ID of the [`user::User`] associated with this [`Session`].
    pub user_id: user::Id,

    /// [`user::Username`] of the [`user::User`] associated with this
    /// [`Session`].
    pub username: user::Username,

    /// [`DateTime`] when this [`Session`] expires.
    pub expires_at: DateTime,
}

impl From<user::Session> for Session {
    fn from(session: user::Session) -> Self {
        Self {
            user_id: session.user_id,
            username: session.username,
            expires_at: session.expires_at.coerce(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;
        let ConnectInfo(client) = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .copied()
            .ok_or_else(|| {
                Error::internal(&"missing `ConnectInfo` extension")
            })?;

        let signature = session::Signature {
            client: client.ip(),
            method: parts.method.to_string(),
            path: parts.uri.path_and_query().map_or_else(
                || parts.uri.path().to_owned(),
                |p| p.as_str().to_owned(),
            ),
        };
        let token = CookieJar::from_headers(&parts.headers)
            .get(TOKEN_COOKIE)
            .map(|c| session::Token::from(c.value()));

        service
            .execute(command::AuthorizeUserSession { signature, token })
            .await
            .map(Into::into)
            .map_err(AsError::into_error)
    }
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::TokenMissing => AuthError::AuthorizationRequired.into(),
            Self::InvalidToken(_) => AuthError::SessionExpired.into(),
        })
    }
}

define_error! {
    /// Error of authorizing an HTTP request.
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Unauthorized, please log in first."]
        AuthorizationRequired,

        #[code = "SESSION_EXPIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Your login has expired. Please log in again."]
        SessionExpired,
    }
}

#[cfg(test)]
mod spec {
    use std::{net::SocketAddr, time::Duration};

    use axum::{
        body::{to_bytes, Body},
        extract::ConnectInfo,
        routing::get,
        Router,
    };
    use tower::ServiceExt as _;

    use crate::api::spec::{self as api, token};

    use super::{Session, TOKEN_COOKIE};

    /// Responds with the name of the authorized user.
    async fn whoami(session: Session) -> String {
        session.username.to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(axum::Extension(api::service()))
    }

    fn request(cookie: Option<&str>) -> http::Request<Body> {
        let mut req = http::Request::builder().uri("/whoami");
        if let Some(c) = cookie {
            req = req
                .header(http::header::COOKIE, format!("{TOKEN_COOKIE}={c}"));
        }
        req.body(Body::empty()).unwrap()
    }

    /// Sends the provided `req` to the `app`, returning the response body as
    /// plain text.
    async fn body_text(
        app: &Router,
        mut req: http::Request<Body>,
    ) -> (http::StatusCode, String) {
        _ = req
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn authorizes_by_cookie() {
        let (status, body) =
            body_text(&app(), request(Some(&token(3600)))).await;

        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body, "alice");
    }

    #[tokio::test]
    async fn requires_cookie() {
        let (status, _, body) = api::send(&app(), request(None)).await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
        let body = body.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "AUTHORIZATION_REQUIRED");
        assert_eq!(body["message"], "Unauthorized, please log in first.");
    }

    #[tokio::test]
    async fn rejects_expired_cookie() {
        let (status, _, body) =
            api::send(&app(), request(Some(&token(-10)))).await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
        let body = body.unwrap();
        assert_eq!(body["code"], "SESSION_EXPIRED");
        assert_eq!(
            body["message"],
            "Your login has expired. Please log in again.",
        );
    }

    #[tokio::test]
    async fn rejects_forged_cookie() {
        let (status, _, body) =
            api::send(&app(), request(Some("not.a.token"))).await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
        assert_eq!(body.unwrap()["code"], "SESSION_EXPIRED");
    }

    #[tokio::test(start_paused = true)]
    async fn reuses_authorization_of_identical_request() {
        let app = app();

        let (status, _) = body_text(&app, request(Some(&token(3600)))).await;
        assert_eq!(status, http::StatusCode::OK);

        tokio::time::advance(Duration::from_millis(100)).await;
        let (status, body) = body_text(&app, request(None)).await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body, "alice");

        tokio::time::advance(Duration::from_millis(300)).await;
        let (status, _) = body_text(&app, request(None)).await;
        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    }
}
