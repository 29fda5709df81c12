//! Loading, defaulting and validating cluster manifests.

use pgha_cluster::{ClusterError, PostgresCluster};
use pretty_assertions::assert_eq;
use serde_json::json;

const MANIFEST: &str = r#"
metadata:
  name: hippo
  namespace: postgres-operator
spec:
  postgresVersion: 14
  patroni:
    leaderLeaseDurationSeconds: 12
    dynamicConfiguration:
      postgresql:
        parameters:
          max_connections: 200
        pg_hba:
          - hostssl all all all md5
"#;

#[test]
fn manifest_parses() {
    let cluster = PostgresCluster::from_yaml(MANIFEST).unwrap();

    assert_eq!(cluster.name(), "hippo");
    assert_eq!(cluster.namespace(), "postgres-operator");
    assert_eq!(cluster.spec.postgres_version, 14);

    let patroni = cluster.patroni().unwrap();
    assert_eq!(patroni.leader_lease_duration_seconds, Some(12));
    assert_eq!(patroni.sync_period_seconds, None);
    assert_eq!(
        patroni.dynamic_configuration,
        Some(json!({
            "postgresql": {
                "parameters": {"max_connections": 200},
                "pg_hba": ["hostssl all all all md5"],
            },
        }))
    );
    assert!(cluster.validate().is_ok());
}

#[test]
fn defaults_fill_only_unset_fields() {
    let cluster = PostgresCluster::from_yaml(MANIFEST).unwrap().with_defaults();
    let patroni = cluster.patroni().unwrap();

    assert_eq!(patroni.leader_lease_duration_seconds, Some(12));
    assert_eq!(patroni.sync_period_seconds, Some(10));
    assert_eq!(cluster.patroni_port(), 8008);
    assert_eq!(cluster.postgres_port(), 5432);
}

#[test]
fn json_and_yaml_agree() {
    let from_yaml = PostgresCluster::from_yaml(MANIFEST).unwrap();
    let json = serde_json::to_string(&from_yaml).unwrap();
    let from_json = PostgresCluster::from_json(&json).unwrap();

    assert_eq!(from_json, from_yaml);
}

#[test]
fn lease_below_minimum_is_rejected() {
    let manifest = MANIFEST.replace("leaderLeaseDurationSeconds: 12", "leaderLeaseDurationSeconds: 2");
    let error = PostgresCluster::from_yaml(&manifest)
        .unwrap()
        .validate()
        .unwrap_err();

    assert!(matches!(
        error,
        ClusterError::Validation {
            field: "spec.patroni.leaderLeaseDurationSeconds",
            ..
        }
    ));
}

#[test]
fn wrong_field_type_is_invalid_yaml() {
    let error = PostgresCluster::from_yaml("spec:\n  postgresVersion: fourteen\n").unwrap_err();
    assert!(matches!(error, ClusterError::InvalidYaml(_)));
}
