//! [`Tx`] client definitions.

use std::sync::Arc;

use tokio::{
    runtime::Handle,
    sync::{MappedMutexGuard, Mutex, MutexGuard},
};
use tracerr::Traced;
use tracing as log;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

use super::NonTx;

/// Transactional Postgres database client.
///
/// The transaction is started lazily, on the first operation. Dropping this
/// client without committing rolls the transaction back.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`NonTx`] client to acquire the [`connection::Object`] with.
    non_tx: NonTx,

    /// Inner representation of this client.
    inner: Arc<Inner>,
}

/// Inner representation of the [`Tx`] client.
#[derive(Debug, Default)]
struct Inner {
    /// [`connection::Object`] with the started transaction, if any.
    connection: Mutex<Option<connection::Object>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let Some(conn) = self.connection.get_mut().take() else {
            return;
        };
        // An open transaction must never return to the pool.
        if let Ok(rt) = Handle::try_current() {
            drop(rt.spawn(async move {
                if let Err(e) = conn.batch_execute("ROLLBACK").await {
                    log::warn!("failed to roll back uncommitted `Tx`: {e}");
                    drop(connection::Object::take(conn));
                }
            }));
        } else {
            drop(connection::Object::take(conn));
        }
    }
}

impl Tx {
    /// Creates a new [`Tx`] client from the provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: NonTx) -> Self {
        Self {
            non_tx: client,
            inner: Arc::default(),
        }
    }

    /// Commits this [`Tx`] client.
    ///
    /// Does nothing if no operation has been performed yet.
    ///
    /// # Errors
    ///
    /// If failed to commit transaction of this [`Tx`] client.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Some(conn) = self.inner.connection.lock().await.take() else {
            return Ok(());
        };
        conn.batch_execute("COMMIT")
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl Connection for Tx {
    type Guard<'c> = MappedMutexGuard<'c, connection::ClientWrapper>;

    /// Acquires the [`connection::Object`] of this [`Tx`] client, starting a
    /// transaction on it if not started yet.
    async fn acquire(
        &self,
    ) -> Result<Self::Guard<'_>, Traced<database::Error>> {
        let mut guard = self.inner.connection.lock().await;
        if guard.is_none() {
            let conn = self.non_tx.acquire().await.map_err(tracerr::wrap!())?;
            conn.batch_execute("BEGIN")
                .await
                .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                .map_err(tracerr::map_from)?;
            *guard = Some(conn);
        }
        Ok(MutexGuard::map(guard, |conn| {
            &mut **conn.as_mut().expect("started above")
        }))
    }
}
