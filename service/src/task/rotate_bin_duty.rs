//! [`RotateBinDuty`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::{
    operations::{By, Perform, Select, Start},
    DateTime,
};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    command::{AdvanceRotation, ResolveElapsedDuties, SendDutyReminders},
    domain::Property,
    infra::{database, Database},
    Command, Service,
};

use super::Task;

/// Configuration for [`RotateBinDuty`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between bin duty rotation passes.
    ///
    /// Expected to be daily: the pass itself is idempotent within a rotation
    /// period, so more frequent runs are harmless.
    pub interval: time::Duration,
}

/// Arguments of a single bin duty rotation pass.
#[derive(Clone, Copy, Debug)]
pub struct Run {
    /// Day the pass runs on.
    pub date: DateTime,
}

impl Run {
    /// Creates a [`Run`] for the current day.
    #[must_use]
    pub fn today() -> Self {
        Self {
            date: DateTime::now().start_of_day(),
        }
    }
}

/// [`Task`] driving the bin duty rotation engine: advances every
/// [`Property`]'s rotation, sends due-tomorrow reminders, and resolves
/// elapsed duties.
#[derive(Clone, Copy, Debug)]
pub struct RotateBinDuty<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<S> RotateBinDuty<S> {
    /// Creates a new [`RotateBinDuty`] [`Task`] running on the provided
    /// [`Service`].
    pub const fn new(config: Config, service: S) -> Self {
        Self { config, service }
    }
}

impl<Db> Task<Start<By<RotateBinDuty<Self>, Config>>> for Service<Db>
where
    RotateBinDuty<Service<Db>>:
        Task<Perform<Run>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<RotateBinDuty<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = RotateBinDuty::new(config, self.clone());

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(Run::today())).await.map_err(|e| {
                log::error!("`task::RotateBinDuty` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<Run>> for RotateBinDuty<Service<Db>>
where
    Db: Database<
        Select<By<Vec<Property>, ()>>,
        Ok = Vec<Property>,
        Err = Traced<database::Error>,
    >,
    Service<Db>: Command<AdvanceRotation, Err: Error>
        + Command<SendDutyReminders, Err: Error>
        + Command<ResolveElapsedDuties, Err: Error>,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(
        &self,
        Perform(run): Perform<Run>,
    ) -> Result<Self::Ok, Self::Err> {
        let Run { date } = run;

        let properties = self
            .service
            .database()
            .execute(Select(By::<Vec<Property>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;

        // One failing property must not stall the rest of the pass.
        for property in properties {
            let property_id = property.id;
            _ = self
                .service
                .execute(AdvanceRotation { property, date })
                .await
                .map_err(|e| {
                    log::warn!(
                        "failed to advance bin rotation for \
                         `Property(id: {property_id})`: {e}",
                    );
                });
        }

        _ = self
            .service
            .execute(SendDutyReminders { date })
            .await
            .map_err(|e| {
                log::warn!("failed to send bin duty reminders: {e}");
            });

        _ = self
            .service
            .execute(ResolveElapsedDuties { date })
            .await
            .map_err(|e| {
                log::warn!("failed to resolve elapsed bin duties: {e}");
            });

        Ok(())
    }
}

/// Error of [`RotateBinDuty`] execution.
pub type ExecutionError = Traced<database::Error>;
