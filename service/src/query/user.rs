//! [`Query`] collection related to a single [`User`].

use common::operations::By;

use crate::domain::{user, User};
#[cfg(doc)]
use crate::{domain::user::Session, Query};

use super::DatabaseQuery;

/// Queries a [`User`] by its [`user::Id`], as carried by a [`Session`].
///
/// A [`Session`] outlives the [`User`] it was issued to, so [`None`] is
/// possible even for an authorized request.
pub type ById = DatabaseQuery<By<Option<User>, user::Id>>;
