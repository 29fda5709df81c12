//! PGHA Cluster Specification
//!
//! Typed, serde-backed description of a replicated PostgreSQL cluster as the
//! controller sees it.
//!
//! # Core Concepts
//!
//! - [`PostgresCluster`]: Named cluster with its [`PostgresClusterSpec`]
//! - [`PatroniSpec`]: HA agent settings (lease duration, sync period, overrides)
//! - [`BootstrapUser`]: Administrator-supplied database, role and password digest
//! - [`naming`]: Scope identifier and label keys shared with the HA agent
//!
//! # Example
//!
//! ```rust
//! use pgha_cluster::PostgresCluster;
//!
//! let cluster = PostgresCluster::new("some-namespace", "cluster-name").with_defaults();
//! assert_eq!(cluster.patroni_port(), 8008);
//! assert_eq!(pgha_cluster::naming::patroni_scope(&cluster), "cluster-name-ha");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
pub mod naming;
mod spec;
mod user;

pub use error::{ClusterError, ClusterResult};
pub use spec::{
    ObjectMeta, PatroniSpec, PostgresCluster, PostgresClusterSpec,
    DEFAULT_LEADER_LEASE_DURATION_SECONDS, DEFAULT_PATRONI_PORT, DEFAULT_POSTGRES_PORT,
    DEFAULT_SYNC_PERIOD_SECONDS, MIN_LEADER_LEASE_DURATION_SECONDS, MIN_SYNC_PERIOD_SECONDS,
};
pub use user::BootstrapUser;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
