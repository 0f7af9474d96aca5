use lifecycle::LifecycleError;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by a call to the registry agent.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("registry agent request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("registry agent rejected the request with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("invalid registry agent url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors constructing the registry agent client. Construction is local and never
/// contacts the agent.
#[derive(Error, Debug)]
pub enum ClientInitError {
    #[error("invalid registry agent address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build registry agent http client: {0}")]
    Http(#[source] reqwest::Error),
}

/// Enumeration of errors raised while registering or deregistering an instance.
/// None of these are retried.
#[derive(Error, Debug)]
pub enum RegistrarError {
    #[error("failed to create registry client: {0}")]
    ClientInit(#[from] ClientInitError),
    #[error("invalid service descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("failed to generate service ID: {0}")]
    IdGeneration(#[source] rand::Error),
    #[error("failed to register service: {0}")]
    Registration(#[source] AgentError),
    #[error("failed to deregister service {instance_id}: {source}")]
    Deregistration {
        instance_id: String,
        #[source]
        source: AgentError,
    },
}

#[derive(Error, Debug)]
pub enum HealthError {
    #[error("failed to bind health endpoint on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("health endpoint server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Errors from the ordered startup. A `Health` error means the fresh registration
/// has already been rolled back.
#[derive(Error, Debug)]
pub enum StartError {
    #[error(transparent)]
    Registrar(#[from] RegistrarError),
    #[error(transparent)]
    Health(#[from] HealthError),
}

/// Errors that end a running service.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Health(#[from] HealthError),
    #[error("health endpoint stopped unexpectedly")]
    HealthStopped,
    #[error(transparent)]
    Shutdown(#[from] RegistrarError),
    #[error(transparent)]
    Task(#[from] LifecycleError),
}
