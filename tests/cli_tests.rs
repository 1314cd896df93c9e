//! Integration tests for inline-replace
//!
//! These tests run the built binary end-to-end with stdin/stdout.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Get the path to the inline-replace binary
fn binary() -> &'static str {
    env!("CARGO_BIN_EXE_inline-replace")
}

/// Run inline-replace in `dir` with `input` on stdin and no Vault variables
fn run(dir: &Path, args: &[&str], input: &str) -> Output {
    let mut child = Command::new(binary())
        .args(args)
        .current_dir(dir)
        .env_remove("VAULT_HOST")
        .env_remove("VAULT_TOKEN")
        .env("TMPDIR", dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute inline-replace");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");

    child.wait_with_output().expect("Failed to wait for inline-replace")
}

fn write_descriptor(dir: &Path, contents: &str) {
    std::fs::write(dir.join("replace.yaml"), contents).unwrap();
}

#[test]
fn test_version() {
    let output = Command::new(binary()).arg("--version").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("inline-replace"));
}

#[test]
fn test_help() {
    let output = Command::new(binary()).arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("<CONFIG>"));
}

#[test]
fn test_missing_argument() {
    let output = Command::new(binary()).output().unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_reference_substitution() {
    let dir = tempfile::tempdir().unwrap();
    write_descriptor(dir.path(), "apiVersion: v1\nkind: DataReplaceInline\n");
    std::fs::write(
        dir.path().join("cluster.ini"),
        "# cluster settings\nCLUSTER_NAME=prod-1\nSUBNETS=a=10.0.1.0/24,b=10.0.2.0/24\n",
    )
    .unwrap();

    let input = "# name: ${ ref:CLUSTER_NAME }\n\
                 name: ${ ref:CLUSTER_NAME }\n\
                 subnet: ${ ref:SUBNETS | dict(b) }\n\
                 encoded: ${ ref:CLUSTER_NAME | base64 }\n\
                 plain: text\n";
    let output = run(dir.path(), &["replace.yaml"], input);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "# name: ${ ref:CLUSTER_NAME }\n\
         name: prod-1\n\
         subnet: 10.0.2.0/24\n\
         encoded: cHJvZC0x\n\
         plain: text\n"
    );
}

#[test]
fn test_configured_kv_file() {
    let dir = tempfile::tempdir().unwrap();
    write_descriptor(dir.path(), "kvFile: envs/dev.ini\n");
    std::fs::create_dir(dir.path().join("envs")).unwrap();
    std::fs::write(dir.path().join("envs/dev.ini"), "CLUSTER_NAME=dev-1\n").unwrap();

    let output = run(dir.path(), &["replace.yaml"], "name: ${ ref:CLUSTER_NAME }\n");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "name: dev-1\n");
}

#[test]
fn test_missing_vault_environment_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    write_descriptor(dir.path(), "kind: DataReplaceInline\n");

    let output = run(
        dir.path(),
        &["replace.yaml"],
        "kind: Secret\npassword: ${ secret:kv/app@pw | base64 }\n",
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("VAULT_HOST environment variable not found"));

    let log = std::fs::read_to_string(dir.path().join("inline-replace.log")).unwrap();
    assert!(log.contains("VAULT_HOST environment variable not found"));
}

#[test]
fn test_missing_kv_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_descriptor(dir.path(), "kind: DataReplaceInline\n");

    let output = run(dir.path(), &["replace.yaml"], "name: ${ ref:CLUSTER_NAME }\n");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cluster.ini"));
}

#[test]
fn test_missing_descriptor_fails() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["missing.yaml"], "plain: text\n");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}
