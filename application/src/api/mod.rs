//! REST API definitions.

pub mod notes;
pub mod users;

use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::define_error;

/// Text [`health`] responds with.
pub const HEALTH_MESSAGE: &str = "Bullet Note backend is running";

/// Builds the [`Router`] of the whole REST API.
///
/// Expects the [`Service`] to be provided as an [`Extension`].
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
pub fn router() -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", post(users::login))
        .route("/api/users/logout", post(users::logout))
        .route("/api/users/info", get(users::info))
        .route("/api/notes", get(notes::list).post(notes::create))
        .route(
            "/api/notes/:id",
            get(notes::get).put(notes::update).delete(notes::delete),
        )
}

/// Health check.
#[expect(clippy::unused_async, reason = "`async` is required by `axum`")]
pub async fn health() -> &'static str {
    HEALTH_MESSAGE
}

/// Body of every JSON response.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Whether the request succeeded.
    pub success: bool,

    /// Human-readable outcome of the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Requested data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// [`Error`] code of a failed request.
    ///
    /// [`Error`]: crate::Error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl<T> Envelope<T> {
    /// Creates a successful [`Envelope`] carrying the provided `data`.
    #[must_use]
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            code: None,
        }
    }

    /// Attaches the provided `message` to this [`Envelope`].
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Envelope<()> {
    /// Creates a successful [`Envelope`] carrying the `message` only.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            code: None,
        }
    }

    /// Creates a failed [`Envelope`] with the provided [`Error`] `code` and
    /// `message`.
    ///
    /// [`Error`]: crate::Error
    #[must_use]
    pub fn failure(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            code: Some(code),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Returns the provided `input` unless it's absent or blank.
fn supplied(input: Option<String>) -> Option<String> {
    input.filter(|s| !s.trim().is_empty())
}

define_error! {
    /// Error of malformed request input.
    enum InputError {
        #[code = "CANNOT_BE_EMPTY"]
        #[status = BAD_REQUEST]
        #[message = "Cannot be empty"]
        Empty,
    }
}

#[cfg(test)]
pub(crate) mod spec {
    use std::{net::SocketAddr, time::Duration};

    use axum::{
        body::{to_bytes, Body},
        extract::ConnectInfo,
        Extension, Router,
    };
    use serde_json::Value;
    use service::domain::user::{self, session};
    use tower::ServiceExt as _;

    use crate::Service;

    /// Secret the test [`Service`] signs its tokens with.
    pub(crate) const SECRET: &[u8] = b"test secret";

    /// Creates a [`Service`] whose database is never reachable.
    ///
    /// Only the paths not touching the database can be tested with it.
    pub(crate) fn service() -> Service {
        let postgres = service::infra::Postgres::new(
            &crate::config::Postgres {
                host: "127.0.0.1".to_owned(),
                port: 1,
                ..crate::config::Postgres::default()
            }
            .into(),
        )
        .unwrap();
        let (service, _) = Service::new(
            service::Config {
                jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                    SECRET,
                ),
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                    SECRET,
                ),
                session_ttl: Duration::from_secs(60 * 60),
                auth_cache_ttl: Duration::from_millis(300),
                sweep_auth_cache: service::task::sweep_auth_cache::Config {
                    interval: Duration::from_secs(60),
                },
            },
            postgres,
        );
        service
    }

    /// Builds the [`Router`] of the whole application over the provided
    /// [`Service`].
    pub(crate) fn app(service: Service) -> Router {
        super::router().layer(Extension(service))
    }

    /// Sends the provided `request` to the `app` from `127.0.0.1`, returning
    /// the response status, headers and body parsed as JSON, if it's JSON.
    pub(crate) async fn send(
        app: &Router,
        mut request: http::Request<Body>,
    ) -> (http::StatusCode, http::HeaderMap, Option<Value>) {
        _ = request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, serde_json::from_slice(&body).ok())
    }

    /// Signs a token of a [`user::Session`] of `alice` expiring in `ttl_secs`
    /// seconds (or having expired, if negative).
    pub(crate) fn token(ttl_secs: i64) -> String {
        let expires_at = session::ExpirationDateTime::from_unix_timestamp(
            session::ExpirationDateTime::now().unix_timestamp() + ttl_secs,
        )
        .unwrap();
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &user::Session {
                user_id: user::Id::new(),
                username: user::Username::new("alice").unwrap(),
                expires_at,
            },
            &jsonwebtoken::EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    /// Builds a JSON request with the provided `method`, `uri` and `body`.
    pub(crate) fn json(
        method: http::Method,
        uri: &str,
        body: &str,
    ) -> http::Request<Body> {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_check_responds_with_text() {
        let app = app(service());

        let response = app
            .oneshot(
                http::Request::builder()
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), http::StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], super::HEALTH_MESSAGE.as_bytes());
    }

    #[test]
    fn envelope_skips_absent_fields() {
        let ok = serde_json::to_value(super::Envelope::data(1)).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "data": 1}));

        let failed = serde_json::to_value(super::Envelope::failure(
            "CANNOT_BE_EMPTY",
            "Cannot be empty",
        ))
        .unwrap();
        assert_eq!(
            failed,
            serde_json::json!({
                "success": false,
                "message": "Cannot be empty",
                "code": "CANNOT_BE_EMPTY",
            }),
        );
    }
}
