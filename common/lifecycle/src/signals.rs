//! Termination sources: the event the shutdown path waits on before cleaning up.

use std::fmt;

use async_trait::async_trait;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::sync::oneshot;

use crate::error::LifecycleError;

/// What ended the wait on a [`TerminationSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// SIGINT (Ctrl+C).
    Interrupt,
    /// SIGTERM, typically sent by process managers.
    Terminate,
    /// Fired programmatically through a [`TerminationTrigger`].
    Requested,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Interrupt => write!(f, "SIGINT"),
            Termination::Terminate => write!(f, "SIGTERM"),
            Termination::Requested => write!(f, "requested"),
        }
    }
}

/// Something a shutdown path can block on until the process is asked to stop.
#[async_trait]
pub trait TerminationSource: Send + 'static {
    /// Suspends until a termination event arrives.
    async fn terminated(&mut self) -> Termination;
}

/// SIGINT/SIGTERM subscription.
///
/// Handlers are registered by [`install`](SignalTermination::install), not on first poll:
/// a signal delivered between install and the first call to `terminated` is buffered
/// instead of hitting the default disposition and killing the process.
pub struct SignalTermination {
    interrupt: Signal,
    terminate: Signal,
}

impl SignalTermination {
    /// Must be called from within a tokio runtime.
    pub fn install() -> Result<Self, LifecycleError> {
        let interrupt = signal(SignalKind::interrupt()).map_err(|source| {
            LifecycleError::SignalInstall {
                signal: "SIGINT",
                source,
            }
        })?;
        let terminate = signal(SignalKind::terminate()).map_err(|source| {
            LifecycleError::SignalInstall {
                signal: "SIGTERM",
                source,
            }
        })?;

        Ok(Self {
            interrupt,
            terminate,
        })
    }
}

#[async_trait]
impl TerminationSource for SignalTermination {
    async fn terminated(&mut self) -> Termination {
        tokio::select! {
            _ = self.interrupt.recv() => {
                tracing::info!("received SIGINT");
                Termination::Interrupt
            }
            _ = self.terminate.recv() => {
                tracing::info!("received SIGTERM");
                Termination::Terminate
            }
        }
    }
}

/// Creates a linked trigger/source pair. The source resolves once, with whatever the
/// trigger fires. If the trigger is dropped without firing, the source never resolves.
pub fn manual_termination() -> (TerminationTrigger, ManualTermination) {
    let (tx, rx) = oneshot::channel();
    (TerminationTrigger { tx }, ManualTermination { rx: Some(rx) })
}

pub struct TerminationTrigger {
    tx: oneshot::Sender<Termination>,
}

impl TerminationTrigger {
    pub fn fire(self, termination: Termination) {
        if self.tx.send(termination).is_err() {
            tracing::debug!(%termination, "termination source already dropped");
        }
    }
}

pub struct ManualTermination {
    rx: Option<oneshot::Receiver<Termination>>,
}

#[async_trait]
impl TerminationSource for ManualTermination {
    async fn terminated(&mut self) -> Termination {
        if let Some(rx) = self.rx.as_mut() {
            let fired = rx.await;
            self.rx = None;
            if let Ok(termination) = fired {
                return termination;
            }
        }
        std::future::pending().await
    }
}
