//! [`NonTx`] client definitions.

use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Non-transactional Postgres database client.
///
/// Every statement runs on its own [`connection::Object`] from the pool.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to acquire [`connection::Object`]s from.
    pool: connection::Pool,
}

impl NonTx {
    /// Creates a new [`NonTx`] client on top of the provided
    /// [`connection::Pool`].
    #[must_use]
    pub(crate) fn new(pool: connection::Pool) -> Self {
        Self { pool }
    }
}

impl Connection for NonTx {
    type Guard<'c> = connection::Object;

    async fn acquire(
        &self,
    ) -> Result<connection::Object, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}
