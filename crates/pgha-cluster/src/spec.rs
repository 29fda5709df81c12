//! Cluster specification
//!
//! Every setting the administrator may leave out is an `Option`. Defaults are
//! applied explicitly through [`PostgresCluster::apply_defaults`] so "unset"
//! stays observable until the caller decides otherwise.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{ClusterError, ClusterResult};

/// Default time a leader's claim stays valid without renewal (Patroni "ttl")
pub const DEFAULT_LEADER_LEASE_DURATION_SECONDS: i32 = 30;

/// Default interval between leader renewals (Patroni "loop_wait")
pub const DEFAULT_SYNC_PERIOD_SECONDS: i32 = 10;

/// Default port of the HA agent REST API
pub const DEFAULT_PATRONI_PORT: i32 = 8008;

/// Default PostgreSQL port
pub const DEFAULT_POSTGRES_PORT: i32 = 5432;

/// Smallest accepted lease duration.
///
/// "loop_wait" and "retry_timeout" are both at least 1 second, which makes
/// 3 seconds the smallest sensible "ttl".
pub const MIN_LEADER_LEASE_DURATION_SECONDS: i32 = 3;

/// Smallest accepted sync period
pub const MIN_SYNC_PERIOD_SECONDS: i32 = 1;

/// Name and namespace of a cluster object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Object name
    #[serde(default)]
    pub name: String,
    /// Object namespace
    #[serde(default)]
    pub namespace: String,
}

/// A PostgreSQL cluster managed by the controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostgresCluster {
    /// Object identity
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Desired state
    #[serde(default)]
    pub spec: PostgresClusterSpec,
}

/// Desired state of a [`PostgresCluster`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostgresClusterSpec {
    /// Major PostgreSQL version, e.g. 12
    #[serde(default)]
    pub postgres_version: u32,
    /// PostgreSQL port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    /// HA agent settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patroni: Option<PatroniSpec>,
}

/// Settings for the HA agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatroniSpec {
    /// Free-form administrator overrides for the dynamic configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_configuration: Option<JsonValue>,
    /// Lease duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_lease_duration_seconds: Option<i32>,
    /// REST API port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    /// Sync period in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_period_seconds: Option<i32>,
}

impl PatroniSpec {
    /// Create spec with nothing set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill every unset field with its default
    pub fn apply_defaults(&mut self) {
        self.leader_lease_duration_seconds
            .get_or_insert(DEFAULT_LEADER_LEASE_DURATION_SECONDS);
        self.port.get_or_insert(DEFAULT_PATRONI_PORT);
        self.sync_period_seconds.get_or_insert(DEFAULT_SYNC_PERIOD_SECONDS);
    }

    /// Consuming variant of [`Self::apply_defaults`]
    #[inline]
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.apply_defaults();
        self
    }

    /// With lease duration
    #[inline]
    #[must_use]
    pub fn with_leader_lease_duration_seconds(mut self, seconds: i32) -> Self {
        self.leader_lease_duration_seconds = Some(seconds);
        self
    }

    /// With sync period
    #[inline]
    #[must_use]
    pub fn with_sync_period_seconds(mut self, seconds: i32) -> Self {
        self.sync_period_seconds = Some(seconds);
        self
    }

    /// With free-form dynamic configuration
    #[inline]
    #[must_use]
    pub fn with_dynamic_configuration(mut self, value: JsonValue) -> Self {
        self.dynamic_configuration = Some(value);
        self
    }

    /// Lease duration, falling back to the default
    #[inline]
    #[must_use]
    pub fn lease_or_default(&self) -> i32 {
        self.leader_lease_duration_seconds
            .unwrap_or(DEFAULT_LEADER_LEASE_DURATION_SECONDS)
    }

    /// Sync period, falling back to the default
    #[inline]
    #[must_use]
    pub fn sync_or_default(&self) -> i32 {
        self.sync_period_seconds.unwrap_or(DEFAULT_SYNC_PERIOD_SECONDS)
    }

    /// REST API port, falling back to the default
    #[inline]
    #[must_use]
    pub fn port_or_default(&self) -> i32 {
        self.port.unwrap_or(DEFAULT_PATRONI_PORT)
    }

    /// Check the documented minimums of the set fields
    ///
    /// # Errors
    /// Returns [`ClusterError::Validation`] naming the first offending field
    pub fn validate(&self) -> ClusterResult<()> {
        if let Some(lease) = self.leader_lease_duration_seconds {
            if lease < MIN_LEADER_LEASE_DURATION_SECONDS {
                return Err(ClusterError::validation(
                    "spec.patroni.leaderLeaseDurationSeconds",
                    format!("{lease} is less than {MIN_LEADER_LEASE_DURATION_SECONDS}"),
                ));
            }
        }
        if let Some(sync) = self.sync_period_seconds {
            if sync < MIN_SYNC_PERIOD_SECONDS {
                return Err(ClusterError::validation(
                    "spec.patroni.syncPeriodSeconds",
                    format!("{sync} is less than {MIN_SYNC_PERIOD_SECONDS}"),
                ));
            }
        }
        Ok(())
    }
}

impl PostgresCluster {
    /// Create cluster with identity and an empty spec
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta {
                name: name.into(),
                namespace: namespace.into(),
            },
            spec: PostgresClusterSpec::default(),
        }
    }

    /// Parse from YAML string
    ///
    /// # Errors
    /// Returns error if YAML is invalid or does not describe a cluster
    pub fn from_yaml(yaml: &str) -> ClusterResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse from JSON string
    ///
    /// # Errors
    /// Returns error if JSON is invalid or does not describe a cluster
    pub fn from_json(json: &str) -> ClusterResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Fill every unset field with its default, including the Patroni section
    pub fn apply_defaults(&mut self) {
        self.spec.port.get_or_insert(DEFAULT_POSTGRES_PORT);
        self.spec
            .patroni
            .get_or_insert_with(PatroniSpec::default)
            .apply_defaults();
    }

    /// Consuming variant of [`Self::apply_defaults`]
    #[inline]
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.apply_defaults();
        self
    }

    /// With PostgreSQL major version
    #[inline]
    #[must_use]
    pub fn with_postgres_version(mut self, version: u32) -> Self {
        self.spec.postgres_version = version;
        self
    }

    /// With Patroni settings
    #[inline]
    #[must_use]
    pub fn with_patroni(mut self, patroni: PatroniSpec) -> Self {
        self.spec.patroni = Some(patroni);
        self
    }

    /// Cluster name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Cluster namespace
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    /// Patroni settings, if any were given
    #[inline]
    #[must_use]
    pub fn patroni(&self) -> Option<&PatroniSpec> {
        self.spec.patroni.as_ref()
    }

    /// PostgreSQL port, falling back to the default
    #[inline]
    #[must_use]
    pub fn postgres_port(&self) -> i32 {
        self.spec.port.unwrap_or(DEFAULT_POSTGRES_PORT)
    }

    /// REST API port, falling back to the default
    #[inline]
    #[must_use]
    pub fn patroni_port(&self) -> i32 {
        self.patroni().map_or(DEFAULT_PATRONI_PORT, PatroniSpec::port_or_default)
    }

    /// Check the specification against its documented minimums
    ///
    /// # Errors
    /// Returns [`ClusterError::Validation`] naming the first offending field
    pub fn validate(&self) -> ClusterResult<()> {
        if self.metadata.name.is_empty() {
            return Err(ClusterError::validation("metadata.name", "must not be empty"));
        }
        if self.spec.postgres_version == 0 {
            return Err(ClusterError::validation(
                "spec.postgresVersion",
                "must be set",
            ));
        }
        match self.patroni() {
            Some(patroni) => patroni.validate(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn defaults_match_documented_timing() {
        let patroni = PatroniSpec::new().with_defaults();
        assert_eq!(patroni.leader_lease_duration_seconds, Some(30));
        assert_eq!(patroni.sync_period_seconds, Some(10));
        assert_eq!(patroni.port, Some(8008));
    }

    #[test]
    fn defaults_keep_explicit_values() {
        let patroni = PatroniSpec::new()
            .with_leader_lease_duration_seconds(99)
            .with_sync_period_seconds(8)
            .with_defaults();
        assert_eq!(patroni.lease_or_default(), 99);
        assert_eq!(patroni.sync_or_default(), 8);
    }

    #[test]
    fn unset_is_observable_until_defaulted() {
        let cluster = PostgresCluster::new("ns", "hippo");
        assert!(cluster.patroni().is_none());
        assert_eq!(cluster.patroni_port(), DEFAULT_PATRONI_PORT);

        let cluster = cluster.with_defaults();
        assert_eq!(cluster.spec.port, Some(DEFAULT_POSTGRES_PORT));
        assert!(cluster.patroni().is_some());
    }

    #[test]
    fn cluster_from_yaml() {
        let cluster = PostgresCluster::from_yaml(
            r"
metadata:
  name: hippo
  namespace: db
spec:
  postgresVersion: 13
  patroni:
    leaderLeaseDurationSeconds: 60
    syncPeriodSeconds: 15
    dynamicConfiguration:
      retry_timeout: 5
",
        )
        .unwrap();

        assert_eq!(cluster.name(), "hippo");
        assert_eq!(cluster.namespace(), "db");
        assert_eq!(cluster.spec.postgres_version, 13);
        let patroni = cluster.patroni().unwrap();
        assert_eq!(patroni.leader_lease_duration_seconds, Some(60));
        assert_eq!(patroni.sync_period_seconds, Some(15));
        assert_eq!(patroni.port, None);
        assert_eq!(
            patroni.dynamic_configuration,
            Some(json!({"retry_timeout": 5}))
        );
    }

    #[test]
    fn cluster_from_json() {
        let cluster =
            PostgresCluster::from_json(r#"{"metadata":{"name":"x"},"spec":{"port":5433}}"#)
                .unwrap();
        assert_eq!(cluster.postgres_port(), 5433);
    }

    #[test]
    fn cluster_invalid_yaml() {
        let result = PostgresCluster::from_yaml("spec: [unclosed");
        assert!(matches!(result, Err(ClusterError::InvalidYaml(_))));
    }

    #[test]
    fn validate_rejects_short_lease() {
        let cluster = PostgresCluster::new("ns", "hippo")
            .with_postgres_version(12)
            .with_patroni(PatroniSpec::new().with_leader_lease_duration_seconds(2));
        let err = cluster.validate().unwrap_err();
        assert!(err.to_string().contains("leaderLeaseDurationSeconds"));
    }

    #[test]
    fn validate_rejects_zero_sync() {
        let patroni = PatroniSpec::new().with_sync_period_seconds(0);
        assert!(patroni.validate().is_err());
    }

    #[test]
    fn validate_requires_version() {
        let cluster = PostgresCluster::new("ns", "hippo").with_defaults();
        assert!(cluster.validate().is_err());
        assert!(cluster.with_postgres_version(14).validate().is_ok());
    }
}
