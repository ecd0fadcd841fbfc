//! [`Note`]-related REST API definitions.

use axum::{
    extract::{rejection::JsonRejection, Path},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, note, user},
    query,
};

use crate::{
    api::{supplied, Envelope, InputError},
    context::AuthError,
    define_error, AsError, Error, Service, Session,
};

/// A note, as returned to clients.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// ID of this [`Note`].
    pub id: note::Id,

    /// ID of the user owning this [`Note`].
    pub user_id: user::Id,

    /// Title of this [`Note`].
    pub title: String,

    /// Text of this [`Note`].
    pub content: String,

    /// Category this [`Note`] is filed under.
    pub category: String,

    /// [`DateTime`] when this [`Note`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: note::CreationDateTime,

    /// [`DateTime`] when this [`Note`] was last updated.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub updated_at: note::UpdateDateTime,
}

impl From<domain::Note> for Note {
    fn from(note: domain::Note) -> Self {
        Self {
            id: note.id,
            user_id: note.user_id,
            title: note.title.into(),
            content: note.content.into(),
            category: note.category.into(),
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

/// Body of [`create`] and [`update`] requests.
///
/// Absent and blank fields are left unchanged on [`update`].
#[derive(Debug, Deserialize)]
pub struct Fields {
    /// Title of a [`Note`].
    #[serde(default)]
    pub title: Option<String>,

    /// Text of a [`Note`].
    #[serde(default)]
    pub content: Option<String>,

    /// Category of a [`Note`].
    #[serde(default)]
    pub category: Option<String>,
}

/// Validated [`Fields`], each one absent if not supplied.
struct Parsed {
    title: Option<note::Title>,
    content: Option<note::Content>,
    category: Option<note::Category>,
}

impl Fields {
    /// Validates the supplied [`Fields`].
    fn parse(self) -> Result<Parsed, Error> {
        let Self {
            title,
            content,
            category,
        } = self;

        Ok(Parsed {
            title: supplied(title)
                .map(|t| note::Title::new(t).ok_or(NoteError::TitleTooLong))
                .transpose()?,
            content: supplied(content)
                .map(|c| note::Content::new(c).ok_or(InputError::Empty))
                .transpose()?,
            category: supplied(category)
                .map(|c| {
                    note::Category::new(c).ok_or(NoteError::CategoryTooLong)
                })
                .transpose()?,
        })
    }
}

/// Parses the provided path segment as a [`note::Id`].
///
/// A malformed ID identifies no [`Note`].
fn note_id(id: &str) -> Result<note::Id, Error> {
    id.parse().map_err(|_| NoteError::NotExists.into())
}

/// Lists [`Note`]s of the current user, the most recently created first.
#[tracing::instrument(skip_all, fields(user.id = %session.user_id))]
pub async fn list(
    Extension(service): Extension<Service>,
    session: Session,
) -> Result<Envelope<Vec<Note>>, Error> {
    let notes = service
        .execute(query::notes::ByOwner::by(session.user_id))
        .await
        .map_err(AsError::into_error)?;

    Ok(Envelope::data(notes.into_iter().map(Into::into).collect()))
}

/// Creates a new [`Note`] of the current user.
///
/// # Errors
///
/// Possible error codes:
/// - `CANNOT_BE_EMPTY` - if the title or content is blank;
/// - `TITLE_TOO_LONG`, `CATEGORY_TOO_LONG` - if the fields are too long.
#[tracing::instrument(skip_all, fields(user.id = %session.user_id))]
pub async fn create(
    Extension(service): Extension<Service>,
    session: Session,
    body: Result<Json<Fields>, JsonRejection>,
) -> Result<(http::StatusCode, Envelope<Note>), Error> {
    let Json(fields) = body.map_err(AsError::into_error)?;
    let Parsed {
        title,
        content,
        category,
    } = fields.parse()?;

    let note = service
        .execute(command::CreateNote {
            user_id: session.user_id,
            title: title.ok_or(InputError::Empty)?,
            content: content.ok_or(InputError::Empty)?,
            category,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((http::StatusCode::CREATED, Envelope::data(note.into())))
}

/// Returns a [`Note`] of the current user.
///
/// # Errors
///
/// Possible error codes:
/// - `NOTE_NOT_EXISTS` - if the current user has no such [`Note`].
#[tracing::instrument(skip_all, fields(user.id = %session.user_id))]
pub async fn get(
    Extension(service): Extension<Service>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Envelope<Note>, Error> {
    let note = service
        .execute(query::note::ById::by((session.user_id, note_id(&id)?)))
        .await
        .map_err(AsError::into_error)?
        .ok_or(NoteError::NotExists)?;

    Ok(Envelope::data(note.into()))
}

/// Updates the supplied fields of a [`Note`] of the current user.
///
/// # Errors
///
/// Possible error codes:
/// - `NOTE_NOT_EXISTS` - if the current user has no such [`Note`];
/// - `TITLE_TOO_LONG`, `CATEGORY_TOO_LONG` - if the fields are too long.
#[tracing::instrument(skip_all, fields(user.id = %session.user_id))]
pub async fn update(
    Extension(service): Extension<Service>,
    session: Session,
    Path(id): Path<String>,
    body: Result<Json<Fields>, JsonRejection>,
) -> Result<Envelope<Note>, Error> {
    let note_id = note_id(&id)?;
    let Json(fields) = body.map_err(AsError::into_error)?;
    let Parsed {
        title,
        content,
        category,
    } = fields.parse()?;

    let note = service
        .execute(command::UpdateNote {
            user_id: session.user_id,
            note_id,
            title,
            content,
            category,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Envelope::data(note.into()))
}

/// Deletes a [`Note`] of the current user.
///
/// # Errors
///
/// Possible error codes:
/// - `NOTE_NOT_EXISTS` - if the current user has no such [`Note`].
#[tracing::instrument(skip_all, fields(user.id = %session.user_id))]
pub async fn delete(
    Extension(service): Extension<Service>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Envelope<()>, Error> {
    _ = service
        .execute(command::DeleteNote {
            user_id: session.user_id,
            note_id: note_id(&id)?,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Envelope::message("Deleted note successfully"))
}

impl AsError for command::create_note::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => {
                Some(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

impl AsError for command::update_note::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NoteNotExists(_) => Some(NoteError::NotExists.into()),
        }
    }
}

impl AsError for command::delete_note::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NoteNotExists(_) => Some(NoteError::NotExists.into()),
        }
    }
}

define_error! {
    /// Error of [`Note`] management.
    enum NoteError {
        #[code = "TITLE_TOO_LONG"]
        #[status = BAD_REQUEST]
        #[message = "Title must be up to 100 characters long"]
        TitleTooLong,

        #[code = "CATEGORY_TOO_LONG"]
        #[status = BAD_REQUEST]
        #[message = "Category must be up to 50 characters long"]
        CategoryTooLong,

        #[code = "NOTE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Note does not exist"]
        NotExists,
    }
}
