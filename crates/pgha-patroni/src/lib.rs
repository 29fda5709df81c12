//! PGHA Patroni Configuration
//!
//! Synthesizes the documents that drive the Patroni HA agent from four tiers:
//! mandatory settings, values derived from the cluster specification,
//! free-form administrator input, and built-in defaults.
//!
//! # Core Concepts
//!
//! - [`ScalarMerger`]: Top-level settings, resolved per setting by precedence
//! - [`ParameterSetMerger`]: Server parameters; mandatory values always win
//! - [`RuleListComposer`]: `pg_hba` rules; mandatory rules always come first
//! - [`ProbeTiming`]: Liveness-probe thresholds from lease and sync durations
//! - [`quote_shell_word`]: Shell quoting applied at every nesting boundary
//! - [`cluster_document`] / [`instance_document`]: The assembled documents
//!
//! Every function is pure and total; only rendering to text can fail.
//!
//! # Example
//!
//! ```rust
//! use pgha_cluster::PostgresCluster;
//! use pgha_patroni::{cluster_document, probe_timing};
//! use pgha_postgres::{HBAs, Parameters};
//!
//! let cluster = PostgresCluster::new("some-namespace", "cluster-name").with_defaults();
//! let document = cluster_document(&cluster, None, &HBAs::new(), &Parameters::new());
//! assert_eq!(document.get("/scope").and_then(|v| v.as_str()), Some("cluster-name-ha"));
//!
//! let probe = probe_timing(cluster.patroni().unwrap());
//! assert_eq!(probe.failure_threshold, 3);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod document;
mod dynamic;
mod environment;
mod error;
mod merge;
mod probe;
mod quote;

pub use document::{
    cluster_document, instance_document, post_bootstrap_command, replica_create_command,
    ConfigDocument, CA_ROOTS_PATH, CERT_AND_KEY_PATH, CONFIG_DIRECTORY, GENERATED_HEADER,
    PGPASS_PATH, REPLICATION_CERT_DIRECTORY,
};
pub use dynamic::dynamic_configuration;
pub use environment::{
    endpoint_ports, instance_environment, patroni_env_name, Container, ContainerPort,
    EndpointPort, EnvVar, EnvVarSource, FieldRef, ServicePort,
};
pub use error::{DocumentError, DocumentResult};
pub use merge::{
    section, Input, JsonMap, ParameterSetMerger, RuleListComposer, ScalarMerger, Setting, Shape,
};
pub use probe::{probe_timing, ProbeTiming};
pub use quote::{bash_command, quote_shell_word, quote_shell_words, PsqlCommand};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
