//! [`Command`] for creating a [`Session`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tokio::task::{self, JoinError};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::user::{Login, Password};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`] by [`User`] credentials.
#[derive(Clone, Debug)]
pub struct CreateUserSession {
    /// [`Login`] of a [`User`].
    pub login: user::Login,

    /// [`Password`] of a [`User`].
    pub password: SecretBox<user::Password>,
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`session::Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    ///
    /// [`DateTime`]: common::DateTime
    pub expires_at: session::ExpirationDateTime,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: for<'l> Database<
        Select<By<Option<User>, &'l user::Login>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUserSession { login, password } = cmd;

        let user = self
            .database()
            .execute(Select(By::new(&login)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| tracerr::new!(E::WrongCredentials))?;
        let hash = user.password_hash.clone();
        let matches = task::spawn_blocking(move || {
            hash.verify(password.expose_secret())
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> E))?;
        if !matches {
            return Err(tracerr::new!(E::WrongCredentials));
        }

        // Claims carry whole seconds only.
        let expires_at = session::ExpirationDateTime::from_unix_timestamp(
            (session::ExpirationDateTime::now() + self.config().session_ttl)
                .unix_timestamp(),
        )
        .ok_or_else(|| tracerr::new!(E::SessionTtlOverflow))?;
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: user.id,
                username: user.username.clone(),
                expires_at,
            },
            &self.config().jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .into();

        log::debug!(
            "`Session` created for `User(id: {})` until {}",
            user.id,
            expires_at.to_rfc3339(),
        );

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    #[from]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// Blocking [`Password`] verification didn't complete.
    #[display("`Password` verification task failed: {_0}")]
    #[from]
    Blocking(JoinError),

    /// Configured [`Session`] lifetime is out of range.
    #[display("`Session` lifetime is out of range")]
    SessionTtlOverflow,

    /// [`Login`] or [`Password`] doesn't match any [`User`].
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}
