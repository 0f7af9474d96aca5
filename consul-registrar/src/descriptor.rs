use std::net::Ipv6Addr;
use std::time::Duration;

use serde::{Serialize, Serializer};

pub const HEALTH_CHECK_PATH: &str = "/health";
pub const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(10);
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(1);

/// A service instance as submitted to the agent's register endpoint. Field names follow
/// the agent's wire format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceDescriptor {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub address: String,
    pub port: u16,
    pub check: HealthCheckSpec,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthCheckSpec {
    #[serde(rename = "HTTP")]
    pub http: String,
    #[serde(serialize_with = "serialize_go_duration")]
    pub interval: Duration,
    #[serde(serialize_with = "serialize_go_duration")]
    pub timeout: Duration,
}

impl ServiceDescriptor {
    /// Builds a descriptor whose check probes `/health` on the advertised address and port.
    /// Duplicate tags are dropped, first occurrence wins.
    pub fn new(id: String, name: &str, tags: &[String], address: &str, port: u16) -> Self {
        let mut unique_tags: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            if !unique_tags.contains(tag) {
                unique_tags.push(tag.clone());
            }
        }

        Self {
            id,
            name: name.to_string(),
            tags: unique_tags,
            address: address.to_string(),
            port,
            check: HealthCheckSpec {
                http: probe_url(address, port),
                interval: HEALTH_CHECK_INTERVAL,
                timeout: HEALTH_CHECK_TIMEOUT,
            },
        }
    }
}

pub fn probe_url(address: &str, port: u16) -> String {
    let host = match address.parse::<Ipv6Addr>() {
        Ok(_) => format!("[{address}]"),
        Err(_) => address.to_string(),
    };
    format!("http://{host}:{port}{HEALTH_CHECK_PATH}")
}

/// The agent parses durations the Go way, e.g. "10s" or "1500ms".
fn format_go_duration(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

fn serialize_go_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_go_duration(*duration))
}
