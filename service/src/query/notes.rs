//! [`Query`] collection related to multiple [`Note`]s.

use common::operations::By;

#[cfg(doc)]
use crate::{domain::User, Query};
use crate::domain::{user, Note};

use super::DatabaseQuery;

/// Queries all [`Note`]s owned by the [`User`] with the provided [`user::Id`],
/// the most recently created first.
pub type ByOwner = DatabaseQuery<By<Vec<Note>, user::Id>>;
