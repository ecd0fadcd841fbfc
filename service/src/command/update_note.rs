//! [`Command`] for updating an existing [`Note`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
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

/// [`Command`] for updating a [`Note`] owned by a [`User`].
///
/// Only the provided fields are changed.
#[derive(Clone, Debug)]
pub struct UpdateNote {
    /// ID of the [`User`] owning the [`Note`].
    pub user_id: user::Id,

    /// ID of the [`Note`] to update.
    pub note_id: note::Id,

    /// New [`note::Title`] of the [`Note`], if any.
    pub title: Option<note::Title>,

    /// New [`note::Content`] of the [`Note`], if any.
    pub content: Option<note::Content>,

    /// New [`note::Category`] of the [`Note`], if any.
    pub category: Option<note::Category>,
}

impl<Db> Command<UpdateNote> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Note, (user::Id, note::Id)>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Note>, (user::Id, note::Id)>>,
            Ok = Option<Note>,
            Err = Traced<database::Error>,
        > + Database<Update<Note>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Note;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateNote) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateNote {
            user_id,
            note_id,
            title,
            content,
            category,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Lock(By::<Note, _>::new((user_id, note_id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut note = tx
            .execute(Select(By::<Option<Note>, _>::new((user_id, note_id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| tracerr::new!(E::NoteNotExists(note_id)))?;

        if title.is_some() || content.is_some() || category.is_some() {
            if let Some(title) = title {
                note.title = title;
            }
            if let Some(content) = content {
                note.content = content;
            }
            if let Some(category) = category {
                note.category = category;
            }
            note.updated_at = DateTime::now().coerce();

            tx.execute(Update(note.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(note)
    }
}

/// Error of [`UpdateNote`] [`Command`] execution.
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
