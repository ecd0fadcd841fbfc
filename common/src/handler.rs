//! [`Handler`] abstraction.
//!
//! Commands, queries, database operations and background tasks are all
//! expressed as a [`Handler`] of some argument type, so a single value (for
//! example a `Service`) may handle many different operations, each one being
//! a separate trait implementation with its own output and error types.

use std::future::Future;

/// Asynchronous handler of `Args`.
pub trait Handler<Args = ()> {
    /// Output of a successfully handled `Args`.
    type Ok;

    /// Error of handling `Args`.
    type Err;

    /// Handles the provided `Args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
