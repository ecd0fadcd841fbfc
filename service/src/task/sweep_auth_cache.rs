//! [`SweepAuthCache`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Start};
use tokio::time::{interval, MissedTickBehavior};
use tracing as log;

#[cfg(doc)]
use crate::command::AuthorizeUserSession;
use crate::Service;

use super::Task;

/// Configuration for [`SweepAuthCache`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between sweeps.
    ///
    /// Raised to [`Config::MIN_INTERVAL`] if shorter.
    pub interval: time::Duration,
}

impl Config {
    /// Shortest interval between sweeps.
    pub const MIN_INTERVAL: time::Duration = time::Duration::from_millis(1);
}

/// [`Task`] dropping expired entries of the cache remembering recent
/// [`AuthorizeUserSession`] results.
///
/// Expired entries are never served anyway, so this only bounds memory.
#[derive(Clone, Copy, Debug)]
pub struct SweepAuthCache<S> {
    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<SweepAuthCache<Self>, Config>>> for Service<Db>
where
    SweepAuthCache<Service<Db>>: Task<Perform<()>, Ok = usize, Err: Error>,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<SweepAuthCache<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = SweepAuthCache {
            service: self.clone(),
        };

        let period = config.interval.max(Config::MIN_INTERVAL);
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            let _ = interval.tick().await;
            match task.execute(Perform(())).await {
                Ok(0) => {}
                Ok(n) => log::debug!("swept {n} expired auth cache entries"),
                Err(e) => log::error!("`task::SweepAuthCache` failed: {e}"),
            }
        }
    }
}

impl<Db> Task<Perform<()>> for SweepAuthCache<Service<Db>> {
    type Ok = usize;
    type Err = Infallible;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        Ok(self.service.auth_cache().sweep().await)
    }
}
