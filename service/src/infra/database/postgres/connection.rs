//! [`Connection`] definitions.

use std::{future::Future, ops::Deref};

use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{self, postgres};

pub use deadpool_postgres::{
    ClientWrapper, CreatePoolError as PoolCreationError, Object, Pool,
    PoolError,
};
pub use tokio_postgres::Error;

/// Postgres client running SQL statements on a pooled [`Object`].
///
/// Only [`Connection::acquire()`] is client-specific, the statements are run
/// the same way by every client.
pub trait Connection {
    /// Guard of the [`Object`] acquired by this [`Connection`], exposing its
    /// [`ClientWrapper`].
    type Guard<'c>: Deref<Target = ClientWrapper>
    where
        Self: 'c;

    /// Acquires the [`Object`] to run the next statement on.
    ///
    /// # Errors
    ///
    /// If no [`Object`] can be acquired.
    fn acquire(
        &self,
    ) -> impl Future<Output = Result<Self::Guard<'_>, Traced<database::Error>>>;

    /// Runs the provided statement with the given parameters and returns all
    /// the resulting [`Row`]s.
    ///
    /// # Errors
    ///
    /// If failed to run the statement.
    fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized,
    {
        async move {
            self.acquire()
                .await
                .map_err(tracerr::wrap!())?
                .query(stmt, params)
                .await
                .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                .map_err(tracerr::map_from)
        }
    }

    /// Runs the provided statement with the given parameters and returns the
    /// resulting [`Row`], if any.
    ///
    /// # Errors
    ///
    /// If failed to run the statement, or it results in many [`Row`]s.
    fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized,
    {
        async move {
            self.acquire()
                .await
                .map_err(tracerr::wrap!())?
                .query_opt(stmt, params)
                .await
                .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                .map_err(tracerr::map_from)
        }
    }

    /// Runs the provided statement with the given parameters and returns the
    /// number of affected rows.
    ///
    /// # Errors
    ///
    /// If failed to run the statement.
    fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized,
    {
        async move {
            self.acquire()
                .await
                .map_err(tracerr::wrap!())?
                .execute(stmt, params)
                .await
                .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                .map_err(tracerr::map_from)
        }
    }
}
