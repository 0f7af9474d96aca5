//! Client for the registry agent's service endpoints.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use url::Url;

use crate::config::AgentConfig;
use crate::descriptor::ServiceDescriptor;
use crate::error::{AgentError, ClientInitError};

const TOKEN_HEADER: &str = "X-Consul-Token";
const REGISTER_PATH: &str = "v1/agent/service/register";
const DEREGISTER_PATH: &str = "v1/agent/service/deregister/";

/// The two agent operations the registrar relies on.
#[async_trait]
pub trait RegistryAgent: Send + Sync + 'static {
    async fn register_service(&self, descriptor: &ServiceDescriptor) -> Result<(), AgentError>;

    async fn deregister_service(&self, instance_id: &str) -> Result<(), AgentError>;
}

/// Consul agent HTTP API client.
pub struct ConsulAgent {
    http_client: HttpClient,
    register_url: Url,
    deregister_url: Url,
    token: Option<String>,
}

impl ConsulAgent {
    pub fn new(config: &AgentConfig) -> Result<Self, ClientInitError> {
        let base_url = agent_base_url(&config.address)?;
        let register_url = base_url
            .join(REGISTER_PATH)
            .map_err(|source| invalid_address(&config.address, source))?;
        let deregister_url = base_url
            .join(DEREGISTER_PATH)
            .map_err(|source| invalid_address(&config.address, source))?;

        let http_client = HttpClient::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientInitError::Http)?;

        Ok(Self {
            http_client,
            register_url,
            deregister_url,
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    async fn put(&self, url: Url, body: Option<&ServiceDescriptor>) -> Result<(), AgentError> {
        let mut request = self.http_client.put(url);

        if let Some(ref token) = self.token {
            request = request.header(TOKEN_HEADER, token);
        }

        if let Some(descriptor) = body {
            request = request.json(descriptor);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(AgentError::Rejected { status, body })
    }
}

#[async_trait]
impl RegistryAgent for ConsulAgent {
    async fn register_service(&self, descriptor: &ServiceDescriptor) -> Result<(), AgentError> {
        self.put(self.register_url.clone(), Some(descriptor)).await
    }

    async fn deregister_service(&self, instance_id: &str) -> Result<(), AgentError> {
        let url = self.deregister_url.join(instance_id)?;
        self.put(url, None).await
    }
}

/// Accepts `host:port` or a full URL; a missing scheme means plain http.
fn agent_base_url(address: &str) -> Result<Url, ClientInitError> {
    let trimmed = address.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let mut url = Url::parse(&with_scheme).map_err(|source| invalid_address(address, source))?;

    // Keep any path prefix when joining the API paths.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn invalid_address(address: &str, source: url::ParseError) -> ClientInitError {
    ClientInitError::InvalidAddress {
        address: address.to_string(),
        source,
    }
}
