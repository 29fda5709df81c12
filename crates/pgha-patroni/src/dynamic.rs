//! The HA agent's dynamic configuration (`bootstrap.dcs`)
//!
//! The agent stores this section in its distributed configuration store and
//! applies it to every member.

use pgha_cluster::{
    PostgresCluster, DEFAULT_LEADER_LEASE_DURATION_SECONDS, DEFAULT_SYNC_PERIOD_SECONDS,
};
use pgha_postgres::{HBAs, Parameters};
use serde_json::Value as JsonValue;

use crate::merge::{
    section, Input, JsonMap, ParameterSetMerger, RuleListComposer, ScalarMerger, Setting, Shape,
};

/// Merge administrator `input` with the cluster specification and the
/// built-in catalogs
///
/// - `ttl` and `loop_wait` come from the specification when it sets them,
///   even over valid input. They are strongly related and kept in sync.
/// - `postgresql.use_pg_rewind` is always `true` so a former primary can
///   rejoin after a failover.
/// - `postgresql.use_slots` defaults to `false`.
/// - Unknown keys pass through.
#[must_use]
pub fn dynamic_configuration(
    cluster: &PostgresCluster,
    input: Option<&JsonValue>,
    hbas: &HBAs,
    parameters: &Parameters,
) -> JsonMap {
    let given = Input::of(input);
    let root_input = given.mapping();
    if root_input.is_none() && !given.is_absent() {
        tracing::debug!("ignoring dynamic configuration that is not a mapping");
    }

    let patroni = cluster.patroni();
    let mut root = ScalarMerger::new()
        .with(
            Setting::new("ttl", Shape::Integer)
                .derived(patroni.and_then(|p| p.leader_lease_duration_seconds))
                .fallback(DEFAULT_LEADER_LEASE_DURATION_SECONDS),
        )
        .with(
            Setting::new("loop_wait", Shape::Integer)
                .derived(patroni.and_then(|p| p.sync_period_seconds))
                .fallback(DEFAULT_SYNC_PERIOD_SECONDS),
        )
        .merge(root_input);

    let postgresql_input = section(root_input, "postgresql");
    let mut postgresql = ScalarMerger::new()
        .with(Setting::new("use_slots", Shape::Any).fallback(false))
        .with(Setting::new("use_pg_rewind", Shape::Any).mandatory(true))
        .merge(postgresql_input);

    let parameters =
        ParameterSetMerger::new(parameters).merge(postgresql_input.and_then(|m| m.get("parameters")));
    postgresql.insert("parameters".to_string(), JsonValue::Object(parameters));

    let rules = RuleListComposer::new(hbas).compose(postgresql_input.and_then(|m| m.get("pg_hba")));
    postgresql.insert(
        "pg_hba".to_string(),
        JsonValue::Array(rules.into_iter().map(JsonValue::String).collect()),
    );

    root.insert("postgresql".to_string(), JsonValue::Object(postgresql));
    root
}
