//! [`Query`] collection related to a single [`Note`].

use common::operations::By;

#[cfg(doc)]
use crate::{domain::User, Query};
use crate::domain::{note, user, Note};

use super::DatabaseQuery;

/// Queries a [`Note`] by its [`note::Id`] among the ones owned by the
/// [`User`] with the provided [`user::Id`].
pub type ById = DatabaseQuery<By<Option<Note>, (user::Id, note::Id)>>;
