//! [`Database`]-related implementations.

#[cfg(test)]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(test)]
pub use self::memory::Memory;
#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// Names of the integrity constraints a [`Database`] enforces.
pub mod constraint {
    /// Uniqueness of a [`User`]'s [`user::Username`].
    ///
    /// [`User`]: crate::domain::User
    /// [`user::Username`]: crate::domain::user::Username
    pub const USERS_USERNAME: &str = "users_username_key";

    /// Uniqueness of a [`User`]'s [`user::Email`].
    ///
    /// [`User`]: crate::domain::User
    /// [`user::Email`]: crate::domain::user::Email
    pub const USERS_EMAIL: &str = "users_email_key";

    /// Existence of a [`Note`]'s owner.
    ///
    /// [`Note`]: crate::domain::Note
    pub const NOTES_USER_ID: &str = "notes_user_id_fkey";
}

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(test)]
    /// [`Memory`] error.
    Memory(memory::Error),

    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),
}

impl Error {
    /// Checks whether this [`Error`] is a violation of the provided uniqueness
    /// `constraint` (or of any, if [`None`]).
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            #[cfg(test)]
            Self::Memory(e) => e.is_unique_violation(constraint),
            #[cfg(feature = "postgres")]
            Self::Postgres(e) => e.is_unique_violation(constraint),
        }
    }

    /// Checks whether this [`Error`] is a violation of the provided foreign
    /// key `constraint` (or of any, if [`None`]).
    #[must_use]
    pub fn is_foreign_key_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            #[cfg(test)]
            Self::Memory(e) => e.is_foreign_key_violation(constraint),
            #[cfg(feature = "postgres")]
            Self::Postgres(e) => e.is_foreign_key_violation(constraint),
        }
    }
}
