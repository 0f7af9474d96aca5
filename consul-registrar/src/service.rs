//! Ordered startup and supervision of the two background tasks.

use lifecycle::{LifecycleError, TaskHandle, TerminationSource};
use tracing::{error, info, warn};

use crate::agent::RegistryAgent;
use crate::error::{HealthError, RegistrarError, ServiceError, StartError};
use crate::health;
use crate::registrar::Registrar;
use crate::shutdown::{self, ShutdownOutcome, ShutdownTask};

#[derive(Clone, Debug)]
pub struct ServiceSettings {
    pub name: String,
    pub tags: Vec<String>,
    /// Advertised to the registry and used in the health check URL.
    pub address: String,
    /// Advertised port, and the port the health endpoint binds.
    pub port: u16,
    pub bind_host: String,
}

impl ServiceSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

/// A registered service with its health endpoint and shutdown task running.
pub struct RunningService<A: RegistryAgent> {
    instance_id: String,
    health: TaskHandle<Result<(), HealthError>>,
    shutdown: ShutdownTask<A>,
}

impl<A: RegistryAgent> RunningService<A> {
    /// Registers, then binds and serves the health endpoint, then arms the shutdown task.
    ///
    /// If registration fails nothing else is started. If the health endpoint cannot
    /// bind, the fresh registration is rolled back before the error is returned.
    pub async fn start<T>(
        registrar: Registrar<A>,
        settings: &ServiceSettings,
        termination: T,
    ) -> Result<Self, StartError>
    where
        T: TerminationSource,
    {
        let instance = registrar
            .register(
                &settings.name,
                &settings.tags,
                &settings.address,
                settings.port,
            )
            .await?;

        let listener = match health::bind(&settings.bind_addr()).await {
            Ok(listener) => listener,
            Err(e) => {
                warn!(
                    instance_id = %instance.id(),
                    error = %e,
                    "health endpoint failed to start, rolling back registration"
                );
                if let Err(rollback) = instance.deregister().await {
                    error!(error = %rollback, "failed to roll back registration");
                }
                return Err(e.into());
            }
        };

        let instance_id = instance.id().to_string();
        let health = TaskHandle::spawn("health-endpoint", move |shutdown| {
            health::serve(listener, shutdown)
        });
        let shutdown = shutdown::spawn(instance, termination);

        info!(%instance_id, service = %settings.name, "service started");

        Ok(Self {
            instance_id,
            health,
            shutdown,
        })
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Runs until the shutdown task finishes or the health endpoint dies, then stops
    /// the other task. A dead health endpoint still deregisters before returning.
    pub async fn wait(self) -> Result<(), ServiceError> {
        let Self {
            mut health,
            mut shutdown,
            ..
        } = self;

        tokio::select! {
            result = &mut shutdown => {
                let deregistered = finish_shutdown(result).await;
                let stopped = health.cancel_and_join().await;
                deregistered?;
                stopped??;
                Ok(())
            }
            result = &mut health => {
                let health_error = match result {
                    Ok(Ok(())) => ServiceError::HealthStopped,
                    Ok(Err(e)) => ServiceError::Health(e),
                    Err(e) => ServiceError::Task(e),
                };
                error!(error = %health_error, "health endpoint exited, deregistering service");

                if let Err(e) = finish_shutdown(shutdown.cancel_and_join().await).await {
                    error!(error = %e, "failed to deregister service");
                }
                Err(health_error)
            }
        }
    }

    /// Deregisters and stops the health endpoint without waiting for a termination event.
    pub async fn stop(self) -> Result<(), ServiceError> {
        let deregistered = finish_shutdown(self.shutdown.cancel_and_join().await).await;
        let stopped = self.health.cancel_and_join().await;
        deregistered?;
        stopped??;
        Ok(())
    }
}

/// Deregisters if the shutdown task was cancelled before doing it itself.
async fn finish_shutdown<A: RegistryAgent>(
    result: Result<Result<ShutdownOutcome<A>, RegistrarError>, LifecycleError>,
) -> Result<(), ServiceError> {
    match result?? {
        ShutdownOutcome::Deregistered { .. } => Ok(()),
        ShutdownOutcome::Cancelled(instance) => Ok(instance.deregister().await?),
    }
}
