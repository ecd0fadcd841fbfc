//! [`Note`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Note written by a [`User`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Note {
    /// ID of this [`Note`].
    pub id: Id,

    /// ID of the [`User`] owning this [`Note`].
    pub user_id: user::Id,

    /// [`Title`] of this [`Note`].
    pub title: Title,

    /// [`Content`] of this [`Note`].
    pub content: Content,

    /// [`Category`] of this [`Note`].
    pub category: Category,

    /// [`DateTime`] when this [`Note`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Note`] was last updated.
    pub updated_at: UpdateDateTime,
}

/// ID of a [`Note`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Checks that `s` is not blank and fits into `max_len` characters.
fn is_bounded_text(s: &str, max_len: Option<usize>) -> bool {
    !s.trim().is_empty() && max_len.map_or(true, |max| s.chars().count() <= max)
}

/// Title of a [`Note`].
#[derive(AsRef, Clone, Debug, Display, Eq, Into, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Title(String);

impl Title {
    /// Maximum length of a [`Title`] in characters.
    pub const MAX_LEN: usize = 100;

    /// Creates a new [`Title`] if the given `title` is not blank and is not
    /// longer than [`Title::MAX_LEN`].
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        is_bounded_text(&title, Some(Self::MAX_LEN)).then_some(Self(title))
    }
}

/// Text of a [`Note`].
#[derive(AsRef, Clone, Debug, Display, Eq, Into, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Content(String);

impl Content {
    /// Creates a new [`Content`] if the given `text` is not blank.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        is_bounded_text(&text, None).then_some(Self(text))
    }
}

/// Category a [`Note`] is filed under.
#[derive(AsRef, Clone, Debug, Display, Eq, Into, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Category(String);

impl Category {
    /// Maximum length of a [`Category`] in characters.
    pub const MAX_LEN: usize = 50;

    /// Name of the [`Category`] a [`Note`] is filed under when none is given.
    pub const DEFAULT: &'static str = "default";

    /// Creates a new [`Category`] if the given `name` is not blank and is not
    /// longer than [`Category::MAX_LEN`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        is_bounded_text(&name, Some(Self::MAX_LEN)).then_some(Self(name))
    }
}

impl Default for Category {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

/// [`DateTime`] when a [`Note`] was created.
pub type CreationDateTime = DateTimeOf<(Note, unit::Creation)>;

/// [`DateTime`] when a [`Note`] was last updated.
pub type UpdateDateTime = DateTimeOf<(Note, unit::Modification)>;
