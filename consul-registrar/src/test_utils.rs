use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::agent::RegistryAgent;
use crate::descriptor::ServiceDescriptor;
use crate::error::AgentError;

#[derive(Clone, Debug, PartialEq)]
pub enum AgentCall {
    Register(ServiceDescriptor),
    Deregister(String),
}

/// In-memory agent that records every call. Clones share the same call log.
#[derive(Clone, Default)]
pub struct RecordingAgent {
    calls: Arc<Mutex<Vec<AgentCall>>>,
    fail_register: bool,
    fail_deregister: bool,
}

impl RecordingAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_register(mut self) -> Self {
        self.fail_register = true;
        self
    }

    pub fn failing_deregister(mut self) -> Self {
        self.fail_deregister = true;
        self
    }

    pub fn calls(&self) -> Vec<AgentCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: AgentCall, fail: bool) -> Result<(), AgentError> {
        self.calls.lock().unwrap().push(call);
        if fail {
            return Err(AgentError::Rejected {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "agent unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RegistryAgent for RecordingAgent {
    async fn register_service(&self, descriptor: &ServiceDescriptor) -> Result<(), AgentError> {
        self.record(AgentCall::Register(descriptor.clone()), self.fail_register)
    }

    async fn deregister_service(&self, instance_id: &str) -> Result<(), AgentError> {
        self.record(
            AgentCall::Deregister(instance_id.to_string()),
            self.fail_deregister,
        )
    }
}
