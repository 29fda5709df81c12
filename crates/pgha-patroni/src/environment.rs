//! Environment of the HA agent's container
//!
//! Settings that depend on the Pod (its name, address, ports) are passed as
//! `PATRONI_<SECTION>_<SETTING>` variables rather than written to a document.

use pgha_cluster::PostgresCluster;
use pgha_postgres::data_directory;
use serde::Serialize;

use crate::document::CONFIG_DIRECTORY;
use crate::error::DocumentResult;

/// One environment variable, literal or read from a Pod field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    /// Variable name
    pub name: String,
    /// Literal value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Value read from the Pod
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_from: Option<EnvVarSource>,
}

/// Source of a non-literal variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVarSource {
    /// Pod field to read
    pub field_ref: FieldRef,
}

/// Reference to a Pod field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRef {
    /// API version of the field path
    pub api_version: String,
    /// Field path, e.g. `metadata.name`
    pub field_path: String,
}

impl EnvVar {
    /// Variable with a literal value
    #[must_use]
    pub fn value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            value_from: None,
        }
    }

    /// Variable read from a Pod field
    #[must_use]
    pub fn field(name: impl Into<String>, field_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            value_from: Some(EnvVarSource {
                field_ref: FieldRef {
                    api_version: "v1".to_string(),
                    field_path: field_path.into(),
                },
            }),
        }
    }
}

/// Port of the leader service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePort {
    /// Service port name
    pub name: String,
    /// Name of the container port it targets, if it targets one by name
    pub target_port: Option<String>,
}

/// Named port of a container in the instance Pod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerPort {
    /// Port name
    pub name: String,
    /// Port number
    pub container_port: i32,
    /// `TCP`, `UDP` or `SCTP`
    pub protocol: String,
}

/// Container of the instance Pod, reduced to its ports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    /// Container name
    pub name: String,
    /// Exposed ports
    pub ports: Vec<ContainerPort>,
}

/// Endpoint port the agent publishes for the leader service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointPort {
    /// Service port name
    pub name: String,
    /// Port number
    pub port: i32,
    /// Protocol
    pub protocol: String,
}

/// Variable name for a setting: `PATRONI_<SECTION>_<SETTING>`, upper case
#[must_use]
pub fn patroni_env_name(section: &str, setting: &str) -> String {
    format!("PATRONI_{section}_{setting}").to_uppercase()
}

/// Resolve each leader-service port that targets a container port by name
///
/// The first container port with a matching name wins.
#[must_use]
pub fn endpoint_ports(leader_ports: &[ServicePort], containers: &[Container]) -> Vec<EndpointPort> {
    leader_ports
        .iter()
        .filter_map(|service_port| {
            let target = service_port.target_port.as_deref()?;
            containers
                .iter()
                .flat_map(|container| container.ports.iter())
                .find(|port| port.name == target)
                .map(|port| EndpointPort {
                    name: service_port.name.clone(),
                    port: port.container_port,
                    protocol: port.protocol.clone(),
                })
        })
        .collect()
}

/// Environment of the HA agent in one instance Pod
///
/// `pod_service` is the headless service that gives each Pod a DNS name.
///
/// # Errors
/// Returns error if the port list cannot be serialized
pub fn instance_environment(
    cluster: &PostgresCluster,
    pod_service: &str,
    leader_ports: &[ServicePort],
    containers: &[Container],
) -> DocumentResult<Vec<EnvVar>> {
    let postgres_port = cluster.postgres_port();
    let patroni_port = cluster.patroni_port();
    let data = data_directory(cluster);
    let ports = serde_yaml::to_string(&endpoint_ports(leader_ports, containers))?;

    Ok(vec![
        EnvVar::field("PATRONI_NAME", "metadata.name"),
        EnvVar::field(patroni_env_name("kubernetes", "pod_ip"), "status.podIP"),
        EnvVar::value(patroni_env_name("kubernetes", "ports"), ports),
        EnvVar::value(
            patroni_env_name("postgresql", "connect_address"),
            format!("$(PATRONI_NAME).{pod_service}:{postgres_port}"),
        ),
        EnvVar::value(
            patroni_env_name("postgresql", "listen"),
            format!("*:{postgres_port}"),
        ),
        EnvVar::value(patroni_env_name("postgresql", "config_dir"), data.clone()),
        EnvVar::value(patroni_env_name("postgresql", "data_dir"), data),
        EnvVar::value(
            patroni_env_name("restapi", "connect_address"),
            format!("$(PATRONI_NAME).{pod_service}:{patroni_port}"),
        ),
        EnvVar::value(
            patroni_env_name("restapi", "listen"),
            format!("*:{patroni_port}"),
        ),
        EnvVar::value("PATRONICTL_CONFIG_FILE", CONFIG_DIRECTORY),
    ])
}
