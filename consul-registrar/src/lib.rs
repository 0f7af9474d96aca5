pub mod agent;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod health;
pub mod registrar;
pub mod service;
pub mod shutdown;

#[cfg(test)]
pub(crate) mod test_utils;

pub use agent::{ConsulAgent, RegistryAgent};
pub use config::{AgentConfig, Config};
pub use descriptor::{HealthCheckSpec, ServiceDescriptor};
pub use error::{
    AgentError, ClientInitError, HealthError, RegistrarError, ServiceError, StartError,
};
pub use registrar::{RegisteredInstance, Registrar};
pub use service::{RunningService, ServiceSettings};
pub use shutdown::ShutdownOutcome;
