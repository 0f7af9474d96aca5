//! Process lifecycle primitives: an injectable termination source (OS signals or a
//! manual trigger) and cancellable, awaitable handles for background tasks.

mod error;
mod signals;
mod task;

pub use error::LifecycleError;
pub use signals::{
    manual_termination, ManualTermination, SignalTermination, Termination, TerminationSource,
    TerminationTrigger,
};
pub use task::TaskHandle;
