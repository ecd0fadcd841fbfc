//! Abstract operations handled by a [`Handler`].
//!
//! Each operation is a thin wrapper giving a payload its meaning, so that
//! `Handler<Select<..>>` and `Handler<Delete<..>>` are distinct
//! implementations even when the payload type is the same.

use std::marker::PhantomData;

use crate::Handler;

/// Inserts a new value.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Overwrites an existing value.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Deletes a value.
#[derive(Clone, Copy, Debug)]
pub struct Delete<T>(pub T);

/// Selects a value.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Locks a value until the end of the current transaction.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Starts a long-running value (a background task, for example).
#[derive(Clone, Copy, Debug)]
pub struct Start<T>(pub T);

/// Performs a single iteration of a value.
#[derive(Clone, Copy, Debug)]
pub struct Perform<T>(pub T);

/// Begins a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Handler returned by [`Transact`]ing the handler `T`.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Commits a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Selector of a `W`hat by a `B`.
///
/// `W` only exists in the type, so the same key may select different things:
/// `By<Option<Note>, note::Id>` and `By<Vec<Note>, user::Id>` are different
/// selectors.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of the selected value.
    _what: PhantomData<W>,

    /// Key to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector with the provided key.
    #[must_use]
    pub const fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Returns the key of this [`By`] selector.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
