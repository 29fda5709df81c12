//! Names and label keys shared between the controller and the HA agent
//!
//! These values end up in live objects; changing one is a compatibility break.

use crate::spec::PostgresCluster;

/// Prefix of every label the controller owns
pub const LABEL_PREFIX: &str = "postgres-operator.crunchydata.com/";

/// Label identifying the cluster an object belongs to
pub const LABEL_CLUSTER: &str = "postgres-operator.crunchydata.com/cluster";

/// Label the HA agent sets to the role of an instance
pub const LABEL_ROLE: &str = "postgres-operator.crunchydata.com/role";

/// Label the HA agent sets to its scope
pub const LABEL_PATRONI: &str = "postgres-operator.crunchydata.com/patroni";

/// Scope identifier of the HA agent. Cannot change over the cluster's lifetime.
#[must_use]
pub fn patroni_scope(cluster: &PostgresCluster) -> String {
    format!("{}-ha", cluster.name())
}
