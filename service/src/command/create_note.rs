//! [`Command`] for creating a new [`Note`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{note, user, Note},
    infra::{
        database::{self, constraint},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Note`] owned by a [`User`].
#[derive(Clone, Debug)]
pub struct CreateNote {
    /// ID of the [`User`] owning the new [`Note`].
    pub user_id: user::Id,

    /// [`note::Title`] of the new [`Note`].
    pub title: note::Title,

    /// [`note::Content`] of the new [`Note`].
    pub content: note::Content,

    /// [`note::Category`] of the new [`Note`], if not the default one.
    pub category: Option<note::Category>,
}

impl<Db> Command<CreateNote> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Note>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Note;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateNote) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateNote {
            user_id,
            title,
            content,
            category,
        } = cmd;

        let now = DateTime::now();
        let note = Note {
            id: note::Id::new(),
            user_id,
            title,
            content,
            category: category.unwrap_or_default(),
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(note.clone()))
            .await
            .map_err(|e| {
                if e.as_ref()
                    .is_foreign_key_violation(Some(constraint::NOTES_USER_ID))
                {
                    tracerr::new!(E::UserNotExists(user_id))
                } else {
                    tracerr::map_from(e)
                }
            })
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(note)
    }
}

/// Error of [`CreateNote`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] owning the [`Note`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::fixture::user,
        domain::{note, user},
        infra::Memory,
        Command as _, Service,
    };

    use super::{CreateNote, ExecutionError};

    #[tokio::test]
    async fn creates_note_in_default_category() {
        let svc = Service::for_tests(Memory::default());
        let alice = user(&svc, "alice").await;

        let note = svc
            .execute(CreateNote {
                user_id: alice,
                title: note::Title::new("t").unwrap(),
                content: note::Content::new("c").unwrap(),
                category: None,
            })
            .await
            .unwrap();

        assert_eq!(note.user_id, alice);
        assert_eq!(note.category, note::Category::default());
        assert_eq!(note.created_at.coerce::<()>(), note.updated_at.coerce());
    }

    #[tokio::test]
    async fn keeps_provided_category() {
        let svc = Service::for_tests(Memory::default());
        let alice = user(&svc, "alice").await;

        let note = svc
            .execute(CreateNote {
                user_id: alice,
                title: note::Title::new("t").unwrap(),
                content: note::Content::new("c").unwrap(),
                category: note::Category::new("work"),
            })
            .await
            .unwrap();

        assert_eq!(note.category, note::Category::new("work").unwrap());
    }

    #[tokio::test]
    async fn rejects_unknown_owner() {
        let svc = Service::for_tests(Memory::default());
        let ghost = user::Id::new();

        let err = svc
            .execute(CreateNote {
                user_id: ghost,
                title: note::Title::new("t").unwrap(),
                content: note::Content::new("c").unwrap(),
                category: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(id) if *id == ghost,
        ));
    }
}
