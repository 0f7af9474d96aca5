//! Lifecycle error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The SIGINT or SIGTERM handler could not be registered with the OS.
    #[error("failed to install {signal} handler: {source}")]
    SignalInstall {
        signal: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A background task panicked before returning.
    #[error("task '{name}' panicked")]
    TaskPanicked { name: String },

    /// A background task was aborted before returning.
    #[error("task '{name}' was aborted")]
    TaskAborted { name: String },
}
