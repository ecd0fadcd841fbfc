//! [`Command`] for deleting a [`Note`].

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{note, user, Note},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Note`] owned by a [`User`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteNote {
    /// ID of the [`User`] owning the [`Note`].
    pub user_id: user::Id,

    /// ID of the [`Note`] to delete.
    pub note_id: note::Id,
}

impl<Db> Command<DeleteNote> for Service<Db>
where
    Db: Database<
        Delete<By<Option<Note>, (user::Id, note::Id)>>,
        Ok = Option<Note>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Note;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteNote) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteNote { user_id, note_id } = cmd;

        self.database()
            .execute(Delete(By::new((user_id, note_id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| tracerr::new!(E::NoteNotExists(note_id)))
    }
}

/// Error of [`DeleteNote`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Note`] doesn't exist or is owned by another [`User`].
    #[display("`Note(id: {_0})` does not exist")]
    NoteNotExists(#[error(not(source))] note::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::fixture::{note, user},
        infra::Memory,
        query, Command as _, Service,
    };

    use super::{DeleteNote, ExecutionError};

    #[tokio::test]
    async fn deletes_once() {
        let svc = Service::for_tests(Memory::default());
        let alice = user(&svc, "alice").await;
        let n = note(&svc, alice, "t").await;
        let cmd = DeleteNote {
            user_id: alice,
            note_id: n.id,
        };

        let deleted = svc.execute(cmd).await.unwrap();
        assert_eq!(deleted, n);
        assert!(svc
            .execute(query::note::ById::by((alice, n.id)))
            .await
            .unwrap()
            .is_none());

        let err = svc.execute(cmd).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::NoteNotExists(_)));
    }

    #[tokio::test]
    async fn keeps_foreign_notes() {
        let svc = Service::for_tests(Memory::default());
        let alice = user(&svc, "alice").await;
        let bob = user(&svc, "bob").await;
        let n = note(&svc, alice, "t").await;

        let err = svc
            .execute(DeleteNote {
                user_id: bob,
                note_id: n.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NoteNotExists(_)));
        assert_eq!(
            svc.execute(query::note::ById::by((alice, n.id)))
                .await
                .unwrap(),
            Some(n),
        );
    }
}
