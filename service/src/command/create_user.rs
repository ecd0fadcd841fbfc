//! [`Command`] for creating a new [`User`].

use argon2::password_hash;
use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tokio::task::{self, JoinError};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::user::{Email, Password, Username};
use crate::{
    domain::{user, User},
    infra::{
        database::{self, constraint},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// [`Username`] of a new [`User`].
    pub username: user::Username,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Email`] of a new [`User`].
    pub email: Option<user::Email>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Login>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            username,
            password,
            email,
        } = cmd;

        let login = user::Login::Username(username.clone());
        let occupied = self
            .database()
            .execute(Select(By::new(&login)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupied.is_some() {
            return Err(tracerr::new!(E::UsernameOccupied(username)));
        }

        if let Some(email) = &email {
            let login = user::Login::Email(email.clone());
            let occupied = self
                .database()
                .execute(Select(By::new(&login)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if occupied.is_some() {
                return Err(tracerr::new!(E::EmailOccupied(email.clone())));
            }
        }

        self.insert_user(username, password, email).await
    }
}

impl<Db> Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    /// Inserts a new [`User`] with the provided credentials, reporting
    /// concurrently occupied [`Username`] or [`Email`].
    async fn insert_user(
        &self,
        username: user::Username,
        password: SecretBox<user::Password>,
        email: Option<user::Email>,
    ) -> Result<User, Traced<ExecutionError>> {
        use ExecutionError as E;

        let password_hash = task::spawn_blocking(move || {
            user::PasswordHash::new(password.expose_secret())
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> E))?
        .map_err(tracerr::from_and_wrap!(=> E))?;
        let now = DateTime::now();
        let user = User {
            id: user::Id::new(),
            username,
            email,
            password_hash,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        let occupied = |e: Traced<database::Error>| {
            let err = e.as_ref();
            if err.is_unique_violation(Some(constraint::USERS_USERNAME)) {
                return tracerr::new!(E::UsernameOccupied(
                    user.username.clone()
                ));
            }
            if let Some(email) = &user.email {
                if err.is_unique_violation(Some(constraint::USERS_EMAIL)) {
                    return tracerr::new!(E::EmailOccupied(email.clone()));
                }
            }
            tracerr::map_from(e)
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(user.clone()))
            .await
            .map_err(occupied)
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`User(id: {})` registered as `{}`",
            user.id,
            user.username,
        );

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Password`] hashing failed.
    #[display("Failed to hash `Password`: {_0}")]
    #[from]
    PasswordHashing(password_hash::Error),

    /// Blocking [`Password`] hashing didn't complete.
    #[display("`Password` hashing task failed: {_0}")]
    #[from]
    Blocking(JoinError),

    /// [`Username`] is already occupied.
    #[display("`{_0}` username is occupied")]
    UsernameOccupied(#[error(not(source))] user::Username),

    /// [`Email`] is already occupied.
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] user::Email),
}
