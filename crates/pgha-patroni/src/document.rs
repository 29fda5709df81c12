//! HA agent configuration documents
//!
//! Two documents are produced: one shared by every member of the cluster and
//! one per instance. The controller compares them with the live copies to
//! decide whether to apply changes, so assembly is deterministic: every
//! mapping is key-ordered and every list keeps a fixed order.

use pgha_cluster::{naming, BootstrapUser, PostgresCluster};
use pgha_postgres::{wal_directory, HBAs, Parameters, REPLICATION_USER};
use serde_json::{json, Value as JsonValue};

use crate::dynamic::dynamic_configuration;
use crate::error::DocumentResult;
use crate::merge::JsonMap;
use crate::quote::{bash_command, quote_shell_words, PsqlCommand};

/// First lines of every rendered document
pub const GENERATED_HEADER: &str =
    "# Generated by postgres-operator. DO NOT EDIT.\n# Your changes will not be saved.\n";

/// Directory holding the agent's configuration files
pub const CONFIG_DIRECTORY: &str = "/etc/patroni";

/// Certificate authorities trusted by the REST API and `patronictl`
pub const CA_ROOTS_PATH: &str = "/etc/patroni/~postgres-operator/patroni.ca-roots";

/// REST API certificate followed by its private key
pub const CERT_AND_KEY_PATH: &str = "/etc/patroni/~postgres-operator/patroni.crt+key";

/// Directory of the replication client certificate
pub const REPLICATION_CERT_DIRECTORY: &str = "/tmp/replication";

/// Password file written by the agent
pub const PGPASS_PATH: &str = "/tmp/.pgpass";

/// Runs once, on the primary, after the cluster initializes
const POST_BOOTSTRAP_SQL: &str = r#"
CREATE ROLE :"user";
ALTER ROLE :"user" LOGIN PASSWORD :'password';
CREATE DATABASE :"dbname";
GRANT ALL PRIVILEGES ON DATABASE :"dbname" TO :"user";
"#;

/// Prepares the data directory before handing off to the replica-creation tool
const REPLICA_CREATE_SCRIPT: &str = r#"install --directory --mode=0700 "${PGDATA?}" && exec "$@""#;

/// An assembled configuration document
///
/// Serialization is left to the caller; [`Self::to_yaml`] and
/// [`Self::to_json`] cover the common cases.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    root: JsonValue,
}

impl ConfigDocument {
    /// Wrap an assembled mapping
    #[inline]
    #[must_use]
    pub fn new(root: JsonMap) -> Self {
        Self {
            root: JsonValue::Object(root),
        }
    }

    /// Borrow the document tree
    #[inline]
    #[must_use]
    pub fn as_value(&self) -> &JsonValue {
        &self.root
    }

    /// Take the document tree
    #[inline]
    #[must_use]
    pub fn into_value(self) -> JsonValue {
        self.root
    }

    /// Get a value by JSON pointer, e.g. `/bootstrap/dcs/ttl`
    #[inline]
    #[must_use]
    pub fn get(&self, pointer: &str) -> Option<&JsonValue> {
        self.root.pointer(pointer)
    }

    /// Render as YAML, preceded by [`GENERATED_HEADER`]
    ///
    /// # Errors
    /// Returns error if the YAML emitter fails
    pub fn to_yaml(&self) -> DocumentResult<String> {
        let body = serde_yaml::to_string(&self.root)?;
        Ok(format!("{GENERATED_HEADER}{body}"))
    }

    /// Render as pretty JSON
    ///
    /// # Errors
    /// Returns error if the JSON emitter fails
    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }
}

impl From<ConfigDocument> for JsonValue {
    fn from(document: ConfigDocument) -> Self {
        document.into_value()
    }
}

/// Command the agent runs after bootstrapping: creates the administrator's
/// role and database
///
/// Every value is quoted for `psql --set`, and the whole `psql` line is quoted
/// again as the argument of `bash -c`.
#[must_use]
pub fn post_bootstrap_command(user: &BootstrapUser) -> String {
    let psql = PsqlCommand::new(POST_BOOTSTRAP_SQL)
        .variable("dbname", user.database.as_str())
        .variable("password", user.verifier.as_str())
        .variable("user", user.user.as_str());
    bash_command(&psql.render())
}

/// Command the agent runs to create a replica with an external tool
///
/// Every word is quoted; the tool's own words follow the `-` placeholder for
/// `$0` and are passed through `"$@"`.
#[must_use]
pub fn replica_create_command<S: AsRef<str>>(command: &[S]) -> String {
    let prelude = ["bash", "-ceu", "--", REPLICA_CREATE_SCRIPT, "-"];
    quote_shell_words(
        prelude
            .iter()
            .copied()
            .chain(command.iter().map(AsRef::<str>::as_ref)),
    )
}

fn replication_authentication() -> JsonValue {
    json!({
        "sslcert": format!("{REPLICATION_CERT_DIRECTORY}/tls.crt"),
        "sslkey": format!("{REPLICATION_CERT_DIRECTORY}/tls.key"),
        "sslmode": "verify-ca",
        "sslrootcert": format!("{REPLICATION_CERT_DIRECTORY}/ca.crt"),
        "username": REPLICATION_USER,
    })
}

/// Configuration shared by every member of the cluster
///
/// `user`, when given, adds `bootstrap.post_bootstrap`. Administrator
/// overrides come from the cluster's `patroni.dynamicConfiguration`.
#[must_use]
pub fn cluster_document(
    cluster: &PostgresCluster,
    user: Option<&BootstrapUser>,
    hbas: &HBAs,
    parameters: &Parameters,
) -> ConfigDocument {
    let input = cluster
        .patroni()
        .and_then(|patroni| patroni.dynamic_configuration.as_ref());

    let mut bootstrap = JsonMap::new();
    bootstrap.insert(
        "dcs".to_string(),
        JsonValue::Object(dynamic_configuration(cluster, input, hbas, parameters)),
    );
    if let Some(user) = user {
        bootstrap.insert(
            "post_bootstrap".to_string(),
            JsonValue::String(post_bootstrap_command(user)),
        );
    }

    let scope = naming::patroni_scope(cluster);
    tracing::debug!(%scope, "assembled cluster configuration");

    let mut root = JsonMap::new();
    root.insert("bootstrap".to_string(), JsonValue::Object(bootstrap));
    root.insert(
        "ctl".to_string(),
        json!({
            "cacert": CA_ROOTS_PATH,
            "certfile": CERT_AND_KEY_PATH,
            "insecure": false,
            "keyfile": null,
        }),
    );
    root.insert(
        "kubernetes".to_string(),
        json!({
            "labels": { (naming::LABEL_CLUSTER): cluster.name() },
            "namespace": cluster.namespace(),
            "role_label": naming::LABEL_ROLE,
            "scope_label": naming::LABEL_PATRONI,
            "use_endpoints": true,
        }),
    );
    root.insert(
        "postgresql".to_string(),
        json!({
            "authentication": {
                "replication": replication_authentication(),
                "rewind": replication_authentication(),
            },
        }),
    );
    root.insert(
        "restapi".to_string(),
        json!({
            "cafile": CA_ROOTS_PATH,
            "certfile": CERT_AND_KEY_PATH,
            "keyfile": null,
            "verify_client": "optional",
        }),
    );
    root.insert("scope".to_string(), JsonValue::String(scope));
    root.insert("watchdog".to_string(), json!({ "mode": "off" }));

    ConfigDocument::new(root)
}

/// Configuration of one instance
///
/// A non-empty `replica_create` command makes the external tool the preferred
/// replica-creation method, ahead of `basebackup`.
#[must_use]
pub fn instance_document<S: AsRef<str>>(
    cluster: &PostgresCluster,
    replica_create: &[S],
) -> ConfigDocument {
    let wal = format!("waldir={}", wal_directory(cluster));

    let mut postgresql = JsonMap::new();
    postgresql.insert("basebackup".to_string(), json!([wal]));
    postgresql.insert("pgpass".to_string(), json!(PGPASS_PATH));
    postgresql.insert("use_unix_socket".to_string(), json!(true));

    let mut methods = vec!["basebackup"];
    if !replica_create.is_empty() {
        methods.insert(0, "pgbackrest");
        postgresql.insert(
            "pgbackrest".to_string(),
            json!({
                "command": replica_create_command(replica_create),
                "keep_data": true,
                "no_master": true,
                "no_params": true,
            }),
        );
    }
    postgresql.insert("create_replica_methods".to_string(), json!(methods));

    // "name", "kubernetes.pod_ip" and "kubernetes.ports" are only known once the
    // Pod exists; they arrive through the environment.
    let mut root = JsonMap::new();
    root.insert(
        "bootstrap".to_string(),
        json!({
            "initdb": ["data-checksums", "encoding=UTF8", wal],
            "method": "initdb",
        }),
    );
    root.insert("kubernetes".to_string(), json!({}));
    root.insert("postgresql".to_string(), JsonValue::Object(postgresql));
    root.insert("restapi".to_string(), json!({}));
    root.insert("tags".to_string(), json!({}));

    ConfigDocument::new(root)
}
