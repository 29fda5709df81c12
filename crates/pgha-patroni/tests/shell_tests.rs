//! Commands are executed by a real shell and must read back exactly.
//!
//! Each test is skipped when the shell it needs is not installed.

use std::process::Command;

use pgha_cluster::BootstrapUser;
use pgha_patroni::{
    bash_command, cluster_document, instance_document, post_bootstrap_command, quote_shell_word,
    replica_create_command, ConfigDocument, PsqlCommand,
};
use pgha_postgres::{HBAs, Parameters};
use pgha_test_utils::{
    bootstrap_user, defaulted_cluster, has_program, nul_fields, run_shell, HOSTILE_STRINGS,
};
use serde_json::Value as JsonValue;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// Stands in for `psql`: prints every `--set` value NUL-terminated, then stdin
const FAKE_PSQL: &str = r#"psql() { for arg; do case $arg in --set=*) printf '%s\0' "${arg#--set=}";; esac; done; cat; }"#;

fn echo_word(word: &str) -> String {
    format!("printf '%s' {}", quote_shell_word(word))
}

fn sh_reads_back(word: &str) -> String {
    let output = run_shell("sh", &echo_word(word)).unwrap();
    assert!(output.status.success(), "{output:?}");
    String::from_utf8(output.stdout).unwrap()
}

fn bash_layer_reads_back(word: &str) -> String {
    let output = run_shell("sh", &bash_command(&echo_word(word))).unwrap();
    assert!(output.status.success(), "{output:?}");
    String::from_utf8(output.stdout).unwrap()
}

fn psql_fields(command: &str) -> Vec<String> {
    let output = run_shell("bash", &format!("{FAKE_PSQL}\nexport -f psql\n{command}")).unwrap();
    assert!(output.status.success(), "{output:?}");
    nul_fields(&output.stdout)
}

#[test]
fn single_layer() {
    if !has_program("sh") {
        return;
    }
    for word in HOSTILE_STRINGS {
        assert_eq!(sh_reads_back(word), *word);
    }
}

#[test]
fn bash_layer() {
    if !has_program("sh") || !has_program("bash") {
        return;
    }
    for word in HOSTILE_STRINGS {
        assert_eq!(bash_layer_reads_back(word), *word);
    }
}

#[test]
fn psql_layer() {
    if !has_program("bash") {
        return;
    }
    for word in HOSTILE_STRINGS {
        let command = PsqlCommand::new(*word).variable("value", *word).render();
        assert_eq!(
            psql_fields(&command),
            vec![
                "ON_ERROR_STOP=0".to_string(),
                format!("value={word}"),
                format!("{word}\n"),
            ]
        );
    }
}

#[test]
fn post_bootstrap_reads_back() {
    if !has_program("bash") {
        return;
    }
    let fields = psql_fields(&post_bootstrap_command(&bootstrap_user()));
    assert_eq!(
        fields,
        vec![
            "ON_ERROR_STOP=0",
            "dbname=choco'late",
            "password=digest$and==:stuff",
            "user=johann",
            concat!(
                "\n",
                "CREATE ROLE :\"user\";\n",
                "ALTER ROLE :\"user\" LOGIN PASSWORD :'password';\n",
                "CREATE DATABASE :\"dbname\";\n",
                "GRANT ALL PRIVILEGES ON DATABASE :\"dbname\" TO :\"user\";\n",
                "\n",
            ),
        ]
    );
}

#[test]
fn post_bootstrap_hostile_user() {
    if !has_program("bash") {
        return;
    }
    for word in HOSTILE_STRINGS {
        let user = BootstrapUser::new(*word, *word, *word);
        let fields = psql_fields(&post_bootstrap_command(&user));
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[1], format!("dbname={word}"));
        assert_eq!(fields[2], format!("password={word}"));
        assert_eq!(fields[3], format!("user={word}"));
    }
}

#[test]
fn replica_create_runs_tool_with_words() {
    if !has_program("sh") || !has_program("bash") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("pgdata");

    for word in HOSTILE_STRINGS {
        let output = Command::new("sh")
            .arg("-c")
            .arg(replica_create_command(&["printf", "%s", *word]))
            .env("PGDATA", &data)
            .output()
            .unwrap();
        assert!(output.status.success(), "{output:?}");
        assert_eq!(String::from_utf8(output.stdout).unwrap(), *word);
    }
    assert!(data.is_dir());
}

#[test]
fn replica_create_requires_pgdata() {
    if !has_program("sh") || !has_program("bash") {
        return;
    }
    let output = Command::new("sh")
        .arg("-c")
        .arg(replica_create_command(&["true"]))
        .env_remove("PGDATA")
        .output()
        .unwrap();
    assert!(!output.status.success());
}

/// Render to YAML, parse it back and read the string at `pointer`
fn string_through_yaml(document: &ConfigDocument, pointer: &str) -> String {
    let parsed: JsonValue = serde_yaml::from_str(&document.to_yaml().unwrap()).unwrap();
    parsed.pointer(pointer).and_then(JsonValue::as_str).unwrap().to_string()
}

#[test]
fn post_bootstrap_survives_yaml() {
    if !has_program("bash") {
        return;
    }
    let cluster = defaulted_cluster();
    for word in HOSTILE_STRINGS {
        let user = BootstrapUser::new(*word, *word, *word);
        let document = cluster_document(&cluster, Some(&user), &HBAs::new(), &Parameters::new());
        let command = string_through_yaml(&document, "/bootstrap/post_bootstrap");

        let fields = psql_fields(&command);
        assert_eq!(fields.len(), 5, "{word:?}");
        assert_eq!(fields[1], format!("dbname={word}"));
        assert_eq!(fields[2], format!("password={word}"));
        assert_eq!(fields[3], format!("user={word}"));
    }
}

#[test]
fn replica_create_survives_yaml() {
    if !has_program("sh") || !has_program("bash") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let cluster = defaulted_cluster().with_postgres_version(14);

    for word in HOSTILE_STRINGS {
        let document = instance_document(&cluster, &["printf", "%s", *word]);
        let command = string_through_yaml(&document, "/postgresql/pgbackrest/command");

        let output = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .env("PGDATA", dir.path().join("pgdata"))
            .output()
            .unwrap();
        assert!(output.status.success(), "{output:?}");
        assert_eq!(String::from_utf8(output.stdout).unwrap(), *word);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_any_word_survives_both_layers(word in "[ -~\t\n]{0,24}") {
        if !has_program("sh") || !has_program("bash") {
            return Ok(());
        }
        prop_assert_eq!(sh_reads_back(&word), word.clone());
        prop_assert_eq!(bash_layer_reads_back(&word), word);
    }
}
