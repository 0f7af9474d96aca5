use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::info;
use uuid::Builder;

use crate::agent::{ConsulAgent, RegistryAgent};
use crate::config::AgentConfig;
use crate::descriptor::ServiceDescriptor;
use crate::error::RegistrarError;

/// Registers a single service instance with the registry agent.
///
/// `register` consumes the registrar, so each registrar yields at most one
/// [`RegisteredInstance`]. The instance owns the agent client from then on and is
/// consumed again by [`RegisteredInstance::deregister`].
pub struct Registrar<A = ConsulAgent> {
    agent: A,
}

impl Registrar<ConsulAgent> {
    /// Builds the HTTP client for the agent. This is local work: the agent is first
    /// contacted by [`register`](Registrar::register).
    pub fn connect(config: &AgentConfig) -> Result<Self, RegistrarError> {
        Ok(Self::new(ConsulAgent::new(config)?))
    }
}

impl<A: RegistryAgent> Registrar<A> {
    pub fn new(agent: A) -> Self {
        Self { agent }
    }

    /// Registers `name` at `address:port` with a fresh instance id. The agent is told to
    /// probe `http://<address>:<port>/health` every 10s with a 1s timeout.
    pub async fn register(
        self,
        name: &str,
        tags: &[String],
        address: &str,
        port: u16,
    ) -> Result<RegisteredInstance<A>, RegistrarError> {
        validate(name, address, port)?;

        let instance_id = generate_instance_id()?;
        let descriptor = ServiceDescriptor::new(instance_id, name, tags, address, port);

        self.agent
            .register_service(&descriptor)
            .await
            .map_err(RegistrarError::Registration)?;

        info!(
            instance_id = %descriptor.id,
            service = %descriptor.name,
            address = %descriptor.address,
            port = descriptor.port,
            tags = ?descriptor.tags,
            "service registered"
        );

        Ok(RegisteredInstance {
            descriptor,
            agent: self.agent,
        })
    }
}

/// A live registration. Dropping it does not deregister.
pub struct RegisteredInstance<A = ConsulAgent> {
    descriptor: ServiceDescriptor,
    agent: A,
}

impl<A: RegistryAgent> RegisteredInstance<A> {
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    /// Removes this instance from the registry. Issues exactly one agent call.
    pub async fn deregister(self) -> Result<(), RegistrarError> {
        let instance_id = self.descriptor.id;

        self.agent
            .deregister_service(&instance_id)
            .await
            .map_err(|source| RegistrarError::Deregistration {
                instance_id: instance_id.clone(),
                source,
            })?;

        info!(%instance_id, service = %self.descriptor.name, "service deregistered");
        Ok(())
    }
}

impl<A> fmt::Debug for RegisteredInstance<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredInstance")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

fn validate(name: &str, address: &str, port: u16) -> Result<(), RegistrarError> {
    if name.trim().is_empty() {
        return Err(RegistrarError::InvalidDescriptor(
            "service name must not be empty".to_string(),
        ));
    }
    if address.trim().is_empty() {
        return Err(RegistrarError::InvalidDescriptor(
            "service address must not be empty".to_string(),
        ));
    }
    if port == 0 {
        return Err(RegistrarError::InvalidDescriptor(
            "service port must be between 1 and 65535".to_string(),
        ));
    }
    Ok(())
}

/// Random (version 4) UUID drawn straight from the OS entropy source, so exhaustion
/// surfaces as an error instead of a panic.
fn generate_instance_id() -> Result<String, RegistrarError> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(RegistrarError::IdGeneration)?;
    Ok(Builder::from_random_bytes(bytes).into_uuid().to_string())
}
