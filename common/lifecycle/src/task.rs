//! Background task handles.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::error::LifecycleError;

/// A spawned task paired with the token it watches for cancellation.
///
/// The handle is itself a future resolving to the task's output, so it can be
/// awaited directly or raced by reference inside `tokio::select!`. Cancelling is
/// cooperative: the task decides what to do when its token fires.
pub struct TaskHandle<T> {
    name: String,
    shutdown_token: CancellationToken,
    join_handle: JoinHandle<T>,
}

impl<T: Send + 'static> TaskHandle<T> {
    /// Spawn `task` on the current runtime, handing it a fresh cancellation token.
    pub fn spawn<F, Fut>(name: impl Into<String>, task: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let name = name.into();
        let shutdown_token = CancellationToken::new();
        let join_handle = tokio::spawn(task(shutdown_token.clone()));

        tracing::debug!(task = %name, "background task spawned");

        Self {
            name,
            shutdown_token,
            join_handle,
        }
    }
}

impl<T> TaskHandle<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the task to stop. Returns immediately; await the handle to observe the outcome.
    pub fn cancel(&self) {
        self.shutdown_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }

    pub async fn join(self) -> Result<T, LifecycleError> {
        self.await
    }

    pub async fn cancel_and_join(self) -> Result<T, LifecycleError> {
        self.cancel();
        self.await
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, LifecycleError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.join_handle).poll(cx) {
            Poll::Ready(result) => Poll::Ready(result.map_err(|e| join_error(&this.name, e))),
            Poll::Pending => Poll::Pending,
        }
    }
}

fn join_error(name: &str, error: JoinError) -> LifecycleError {
    if error.is_panic() {
        LifecycleError::TaskPanicked {
            name: name.to_string(),
        }
    } else {
        LifecycleError::TaskAborted {
            name: name.to_string(),
        }
    }
}
