//! Testing utilities for PGHA workspace
//!
//! Shared fixtures, tracing setup and shell helpers.

#![allow(missing_docs)]

use std::io;
use std::process::{Command, Output};

use pgha_cluster::{BootstrapUser, PatroniSpec, PostgresCluster};
use pgha_postgres::{HostBasedAuthentication, ParameterSet};
use serde_json::Value as JsonValue;

/// Strings that exercise every quoting hazard
pub const HOSTILE_STRINGS: &[&str] = &[
    "",
    "plain",
    "choco'late",
    "''",
    r#"double "quotes""#,
    "$HOME ${PATH} $(id) `id`",
    r"back\slash \\ \n \'",
    "multi\nline\n\ttext\n",
    "glob * ? [a-z] ~",
    "; rm -rf / && | & > <",
    "digest$and==:stuff",
    r#"'"'"'"#,
    ":'password' :\"user\"",
    "trailing newline\n",
    "ünïcödé ✓",
];

/// Install a test-writer subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn defaulted_cluster() -> PostgresCluster {
    PostgresCluster::new("some-namespace", "cluster-name").with_defaults()
}

pub fn cluster_with_timing(lease: i32, sync: i32) -> PostgresCluster {
    PostgresCluster::new("some-namespace", "cluster-name").with_patroni(
        PatroniSpec::new()
            .with_leader_lease_duration_seconds(lease)
            .with_sync_period_seconds(sync),
    )
}

pub fn cluster_with_input(input: JsonValue) -> PostgresCluster {
    let mut cluster = defaulted_cluster();
    if let Some(patroni) = cluster.spec.patroni.as_mut() {
        patroni.dynamic_configuration = Some(input);
    }
    cluster
}

pub fn parameters(pairs: &[(&str, &str)]) -> ParameterSet {
    pairs.iter().copied().collect()
}

pub fn local_peer() -> HostBasedAuthentication {
    HostBasedAuthentication::new().local().method("peer")
}

pub fn bootstrap_user() -> BootstrapUser {
    BootstrapUser::new("choco'late", "johann", "digest$and==:stuff")
}

/// Whether `program` can be started
pub fn has_program(program: &str) -> bool {
    Command::new(program)
        .arg("-c")
        .arg("exit 0")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Run `script` with `<shell> -c`
pub fn run_shell(shell: &str, script: &str) -> io::Result<Output> {
    Command::new(shell).arg("-c").arg(script).output()
}

/// Split NUL-terminated output into fields
pub fn nul_fields(stdout: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(stdout);
    let mut fields: Vec<String> = text.split('\0').map(str::to_string).collect();
    if fields.last().is_some_and(String::is_empty) {
        fields.pop();
    }
    fields
}
