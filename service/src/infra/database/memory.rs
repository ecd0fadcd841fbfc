//! In-memory [`Database`] implementation.
//!
//! Enforces the same integrity constraints as the persistent databases, but
//! provides no transaction isolation.

use std::{collections::HashMap, sync::Arc};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use derive_more::{Display, Error as StdError};
use tokio::sync::RwLock;
use tracerr::Traced;

use crate::{
    domain::{note, user, Note, User},
    infra::database::{self, constraint, Database},
};

/// In-memory [`Database`].
///
/// Clones share the same underlying storage.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<RwLock<Storage>>);

/// Storage of a [`Memory`] database.
#[derive(Debug, Default)]
struct Storage {
    /// Stored [`User`]s.
    users: HashMap<user::Id, User>,

    /// Stored [`Note`]s.
    notes: HashMap<note::Id, Note>,
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Uniqueness constraint is violated.
    #[display("duplicate key value violates unique constraint `{_0}`")]
    UniqueViolation(#[error(not(source))] &'static str),

    /// Foreign key constraint is violated.
    #[display("foreign key value violates constraint `{_0}`")]
    ForeignKeyViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks if this [`Error`] is a unique violation of the provided
    /// `constraint`.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        matches!(
            self,
            Self::UniqueViolation(c) if constraint.map_or(true, |n| n == *c),
        )
    }

    /// Checks if this [`Error`] is a foreign key violation of the provided
    /// `constraint`.
    #[must_use]
    pub fn is_foreign_key_violation(&self, constraint: Option<&str>) -> bool {
        matches!(
            self,
            Self::ForeignKeyViolation(c)
                if constraint.map_or(true, |n| n == *c),
        )
    }
}

/// Builds a [`Traced`] [`database::Error`] out of the provided [`Error`].
macro_rules! violation {
    ($err:expr) => {
        tracerr::new!(database::Error::from($err))
    };
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.users.get(&by.into_inner()).cloned())
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Login>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let login = by.into_inner();
        Ok(self
            .0
            .read()
            .await
            .users
            .values()
            .find(|u| match login {
                user::Login::Username(name) => u.username == *name,
                user::Login::Email(email) => u.email.as_ref() == Some(email),
            })
            .cloned())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut storage = self.0.write().await;
        for existing in storage.users.values() {
            if existing.username == user.username {
                return Err(violation!(Error::UniqueViolation(
                    constraint::USERS_USERNAME
                )));
            }
            if user.email.is_some() && existing.email == user.email {
                return Err(violation!(Error::UniqueViolation(
                    constraint::USERS_EMAIL
                )));
            }
        }
        drop(storage.users.insert(user.id, user));
        Ok(())
    }
}

impl Database<Select<By<Option<Note>, (user::Id, note::Id)>>> for Memory {
    type Ok = Option<Note>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Note>, (user::Id, note::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (owner, id) = by.into_inner();
        Ok(self
            .0
            .read()
            .await
            .notes
            .get(&id)
            .filter(|n| n.user_id == owner)
            .cloned())
    }
}

impl Database<Select<By<Vec<Note>, user::Id>>> for Memory {
    type Ok = Vec<Note>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Note>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner = by.into_inner();
        let mut notes = self
            .0
            .read()
            .await
            .notes
            .values()
            .filter(|n| n.user_id == owner)
            .cloned()
            .collect::<Vec<_>>();
        notes.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
        });
        Ok(notes)
    }
}

impl Database<Insert<Note>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(note): Insert<Note>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut storage = self.0.write().await;
        if !storage.users.contains_key(&note.user_id) {
            return Err(violation!(Error::ForeignKeyViolation(
                constraint::NOTES_USER_ID
            )));
        }
        drop(storage.notes.insert(note.id, note));
        Ok(())
    }
}

impl Database<Update<Note>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(note): Update<Note>,
    ) -> Result<Self::Ok, Self::Err> {
        if let Some(stored) = self.0.write().await.notes.get_mut(&note.id) {
            *stored = note;
        }
        Ok(())
    }
}

impl Database<Lock<By<Note, (user::Id, note::Id)>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Note, (user::Id, note::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Delete<By<Option<Note>, (user::Id, note::Id)>>> for Memory {
    type Ok = Option<Note>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Option<Note>, (user::Id, note::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (owner, id) = by.into_inner();
        let mut storage = self.0.write().await;
        if storage.notes.get(&id).is_some_and(|n| n.user_id == owner) {
            Ok(storage.notes.remove(&id))
        } else {
            Ok(None)
        }
    }
}
