//! Background environment for running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
};

use derive_more::{Debug, Display};
use futures::{
    future::LocalBoxFuture,
    stream::{FuturesUnordered, TryStreamExt as _},
    FutureExt as _,
};
use tokio::task;

#[cfg(doc)]
use crate::Task;

/// Background environment for running [`Task`]s on the current thread.
///
/// Nothing runs until the [`Background`] is awaited.
#[derive(Debug, Default)]
pub struct Background {
    /// Local set the [`Task`]s are spawned onto.
    set: task::LocalSet,

    /// Names and handles of the spawned [`Task`]s.
    #[debug(skip)]
    handles: Vec<(&'static str, task::JoinHandle<Result<(), BoxError>>)>,
}

/// Type-erased error of a [`Task`].
type BoxError = Box<dyn Error + 'static>;

/// Error of a [`Task`] running in the [`Background`].
#[derive(Debug, Display)]
#[display("`{name}` task failed: {cause}")]
pub struct TaskError {
    /// Name of the failed [`Task`].
    pub name: &'static str,

    /// Cause of the failure.
    pub cause: BoxError,
}

impl Error for TaskError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.cause)
    }
}

impl Background {
    /// Spawns a new [`Task`] with the provided `name` inside this
    /// [`Background`] environment.
    pub fn spawn<F, E>(&mut self, name: &'static str, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        let handle = self
            .set
            .spawn_local(future.map(|r| r.map_err(BoxError::from)));
        self.handles.push((name, handle));
    }
}

impl IntoFuture for Background {
    type Output = Result<(), TaskError>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let Self { set, handles } = self;

        let tasks = handles
            .into_iter()
            .map(|(name, handle)| {
                handle.map(move |res| {
                    res.map_err(BoxError::from)
                        .and_then(|r| r)
                        .map_err(|cause| TaskError { name, cause })
                })
            })
            .collect::<FuturesUnordered<_>>()
            .try_collect::<Vec<()>>();

        async move { set.run_until(tasks).await.map(drop) }.boxed_local()
    }
}

#[cfg(test)]
mod spec {
    use std::{convert::Infallible, fmt, future::IntoFuture as _};

    use super::Background;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Boom {}

    #[tokio::test]
    async fn completes_when_all_tasks_complete() {
        let mut bg = Background::default();
        bg.spawn("first", async { Ok::<_, Infallible>(()) });
        bg.spawn("second", async { Ok::<_, Infallible>(()) });

        assert!(bg.into_future().await.is_ok());
    }

    #[tokio::test]
    async fn reports_failed_task_by_name() {
        let mut bg = Background::default();
        bg.spawn("ok", async { Ok::<_, Boom>(()) });
        bg.spawn("failing", async { Err(Boom) });

        let err = bg.into_future().await.unwrap_err();

        assert_eq!(err.name, "failing");
        assert_eq!(err.to_string(), "`failing` task failed: boom");
    }
}
