//! [`User`]-related REST API definitions.

use axum::{extract::rejection::JsonRejection, Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, user},
    query,
};

use crate::{
    api::{supplied, Envelope, InputError},
    context::{AuthError, TOKEN_COOKIE},
    define_error, AsError, Error, Service, Session,
};

/// A registered user, as returned to clients.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// ID of this [`User`].
    pub id: user::Id,

    /// Name of this [`User`].
    pub username: String,

    /// Email address of this [`User`], if any.
    pub email: Option<String>,

    /// [`DateTime`] when this [`User`] registered.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: user::CreationDateTime,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self {
            id: user.id,
            username: user.username.into(),
            email: user.email.map(Into::into),
            created_at: user.created_at,
        }
    }
}

/// Body of a [`register`] request.
#[derive(Debug, Deserialize)]
pub struct Registration {
    /// Desired name of a new [`User`].
    #[serde(default)]
    pub username: Option<String>,

    /// Password of a new [`User`].
    #[serde(default)]
    pub password: Option<String>,

    /// Email address of a new [`User`].
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of a [`login`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Name or email address of a [`User`].
    #[serde(default, alias = "username", alias = "email")]
    pub username_or_email: Option<String>,

    /// Password of a [`User`].
    #[serde(default)]
    pub password: Option<String>,
}

/// Registers a new [`User`].
///
/// # Errors
///
/// Possible error codes:
/// - `CANNOT_BE_EMPTY` - if the username or password is blank;
/// - `INVALID_USERNAME`, `INVALID_PASSWORD`, `INVALID_EMAIL` - if the
///   credentials are malformed;
/// - `USERNAME_OCCUPIED`, `EMAIL_OCCUPIED` - if another [`User`] has them.
#[tracing::instrument(skip_all)]
pub async fn register(
    Extension(service): Extension<Service>,
    body: Result<Json<Registration>, JsonRejection>,
) -> Result<(http::StatusCode, Envelope<User>), Error> {
    let Json(Registration {
        username,
        password,
        email,
    }) = body.map_err(AsError::into_error)?;

    let username = supplied(username).ok_or(InputError::Empty)?;
    let password = supplied(password).ok_or(InputError::Empty)?;
    let cmd = command::CreateUser {
        username: user::Username::new(username)
            .ok_or(UserError::InvalidUsername)?,
        password: SecretBox::new(Box::new(
            user::Password::new(password).ok_or(UserError::InvalidPassword)?,
        )),
        email: supplied(email)
            .map(|e| user::Email::new(e).ok_or(UserError::InvalidEmail))
            .transpose()?,
    };

    let user = service.execute(cmd).await.map_err(AsError::into_error)?;

    Ok((
        http::StatusCode::CREATED,
        Envelope::data(user.into()).with_message("Registration successful"),
    ))
}

/// Logs a [`User`] in, setting the session cookie.
///
/// # Errors
///
/// Possible error codes:
/// - `CANNOT_BE_EMPTY` - if the login or password is blank;
/// - `WRONG_CREDENTIALS` - if no [`User`] matches the credentials.
#[tracing::instrument(skip_all)]
pub async fn login(
    Extension(service): Extension<Service>,
    jar: CookieJar,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<(CookieJar, Envelope<User>), Error> {
    let Json(Credentials {
        username_or_email,
        password,
    }) = body.map_err(AsError::into_error)?;

    let login = supplied(username_or_email).ok_or(InputError::Empty)?;
    let password = supplied(password).ok_or(InputError::Empty)?;
    let (Some(login), Some(password)) =
        (user::Login::new(login), user::Password::new(password))
    else {
        return Err(UserError::WrongCredentials.into());
    };

    let out = service
        .execute(command::CreateUserSession {
            login,
            password: SecretBox::new(Box::new(password)),
        })
        .await
        .map_err(AsError::into_error)?;

    let max_age = time::Duration::try_from(out.expires_at.remaining())
        .unwrap_or(time::Duration::MAX);
    let cookie = Cookie::build((TOKEN_COOKIE, out.token.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age);

    Ok((
        jar.add(cookie),
        Envelope::data(out.user.into()).with_message("Login successful"),
    ))
}

/// Logs the current [`User`] out, removing the session cookie.
#[expect(clippy::unused_async, reason = "`async` is required by `axum`")]
#[tracing::instrument(skip_all, fields(user.id = %session.user_id))]
pub async fn logout(
    session: Session,
    jar: CookieJar,
) -> (CookieJar, Envelope<()>) {
    (
        jar.add(
            Cookie::build((TOKEN_COOKIE, ""))
                .http_only(true)
                .same_site(SameSite::Lax)
                .path("/")
                .max_age(time::Duration::ZERO),
        ),
        Envelope::message("Logout successful"),
    )
}

/// Returns the current [`User`].
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - if the current [`User`] doesn't exist
///   anymore.
#[tracing::instrument(skip_all, fields(user.id = %session.user_id))]
pub async fn info(
    Extension(service): Extension<Service>,
    session: Session,
) -> Result<Envelope<User>, Error> {
    let user = service
        .execute(query::user::ById::by(session.user_id))
        .await
        .map_err(AsError::into_error)?
        .ok_or(AuthError::AuthorizationRequired)?;

    Ok(Envelope::data(user.into()))
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PasswordHashing(_) | Self::Blocking(_) => None,
            Self::UsernameOccupied(_) => {
                Some(UserError::UsernameOccupied.into())
            }
            Self::EmailOccupied(_) => Some(UserError::EmailOccupied.into()),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Blocking(_)
            | Self::JsonWebTokenEncodeError(_)
            | Self::SessionTtlOverflow => None,
            Self::WrongCredentials => Some(UserError::WrongCredentials.into()),
        }
    }
}

define_error! {
    /// Error of [`User`] registration and login.
    enum UserError {
        #[code = "INVALID_USERNAME"]
        #[status = BAD_REQUEST]
        #[message = "Username must be up to 50 letters, digits, `_.-`"]
        InvalidUsername,

        #[code = "INVALID_PASSWORD"]
        #[status = BAD_REQUEST]
        #[message = "Password must be up to 128 bytes long"]
        InvalidPassword,

        #[code = "INVALID_EMAIL"]
        #[status = BAD_REQUEST]
        #[message = "Invalid email address"]
        InvalidEmail,

        #[code = "USERNAME_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Username is already taken"]
        UsernameOccupied,

        #[code = "EMAIL_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Email is already registered"]
        EmailOccupied,

        #[code = "WRONG_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid username or password"]
        WrongCredentials,
    }
}
