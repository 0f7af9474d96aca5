//! Deregistration on process termination.

use std::fmt;

use lifecycle::{TaskHandle, Termination, TerminationSource};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::agent::RegistryAgent;
use crate::error::RegistrarError;
use crate::registrar::RegisteredInstance;

pub type ShutdownTask<A> = TaskHandle<Result<ShutdownOutcome<A>, RegistrarError>>;

pub enum ShutdownOutcome<A> {
    /// A termination event arrived and the instance was deregistered.
    Deregistered { termination: Termination },
    /// The task was cancelled first. The registration is still live and handed back.
    Cancelled(RegisteredInstance<A>),
}

impl<A> fmt::Debug for ShutdownOutcome<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownOutcome::Deregistered { termination } => f
                .debug_struct("Deregistered")
                .field("termination", termination)
                .finish(),
            ShutdownOutcome::Cancelled(instance) => {
                f.debug_tuple("Cancelled").field(instance).finish()
            }
        }
    }
}

/// Waits for one termination event, then deregisters `instance` exactly once.
/// Never exits the process; a failed deregistration is returned to the caller.
pub async fn await_termination_then_deregister<A, T>(
    instance: RegisteredInstance<A>,
    mut termination: T,
    shutdown: CancellationToken,
) -> Result<ShutdownOutcome<A>, RegistrarError>
where
    A: RegistryAgent,
    T: TerminationSource,
{
    let termination = tokio::select! {
        termination = termination.terminated() => termination,
        _ = shutdown.cancelled() => {
            debug!(instance_id = %instance.id(), "shutdown task cancelled before termination");
            return Ok(ShutdownOutcome::Cancelled(instance));
        }
    };

    info!(
        %termination,
        instance_id = %instance.id(),
        "received termination signal, deregistering service"
    );

    instance.deregister().await?;

    Ok(ShutdownOutcome::Deregistered { termination })
}

pub fn spawn<A, T>(instance: RegisteredInstance<A>, termination: T) -> ShutdownTask<A>
where
    A: RegistryAgent,
    T: TerminationSource,
{
    TaskHandle::spawn("shutdown", move |shutdown| {
        await_termination_then_deregister(instance, termination, shutdown)
    })
}
