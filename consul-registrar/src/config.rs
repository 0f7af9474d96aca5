use std::convert::Infallible;
use std::str::FromStr;

use envconfig::Envconfig;

use crate::service::ServiceSettings;

#[derive(Envconfig)]
pub struct Config {
    #[envconfig(from = "SERVICE_NAME")]
    pub service_name: String,

    #[envconfig(from = "SERVICE_TAGS", default = "")]
    pub service_tags: ServiceTags,

    #[envconfig(from = "SERVICE_PORT", default = "8080")]
    pub service_port: u16,

    // Advertised to the registry; the health listener binds BIND_HOST.
    #[envconfig(from = "SERVICE_ADDRESS", default = "127.0.0.1")]
    pub service_address: String,

    #[envconfig(from = "BIND_HOST", default = "0.0.0.0")]
    pub host: String,

    #[envconfig(nested = true)]
    pub agent: AgentConfig,
}

impl Config {
    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            name: self.service_name.clone(),
            tags: self.service_tags.0.clone(),
            address: self.service_address.clone(),
            port: self.service_port,
            bind_host: self.host.clone(),
        }
    }
}

#[derive(Envconfig, Clone)]
pub struct AgentConfig {
    #[envconfig(from = "CONSUL_HTTP_ADDR", default = "127.0.0.1:8500")]
    pub address: String,

    #[envconfig(from = "CONSUL_HTTP_TOKEN")]
    pub token: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8500".to_string(),
            token: None,
        }
    }
}

/// Comma separated list of tags, e.g. "v1,prod". Blank entries are skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceTags(pub Vec<String>);

impl FromStr for ServiceTags {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(
            s.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(String::from)
                .collect(),
        ))
    }
}
