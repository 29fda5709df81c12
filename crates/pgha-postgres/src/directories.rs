//! Filesystem layout and built-in roles

use pgha_cluster::PostgresCluster;

/// Role the HA agent uses for streaming replication and `pg_rewind`
pub const REPLICATION_USER: &str = "_crunchyrepl";

/// Data directory of an instance, e.g. `/pgdata/pg12`
#[must_use]
pub fn data_directory(cluster: &PostgresCluster) -> String {
    format!("/pgdata/pg{}", cluster.spec.postgres_version)
}

/// WAL directory of an instance, e.g. `/pgdata/pg12_wal`
#[must_use]
pub fn wal_directory(cluster: &PostgresCluster) -> String {
    format!("{}_wal", data_directory(cluster))
}
