//! Integration tests for the command-line interface

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const SCHEMA: &str = r#"[meta]
name = "crm"
root = "Customer"

[[types]]
name = "Customer"

[[types.slots]]
name = "name"
type = "string"

[[types.slots]]
name = "email"
type = "string?"
read_only = true

[[types.slots]]
name = "visits"
type = "int"

[[types]]
name = "Archive"
read_only = true
"#;

/// Helper to create a workspace with a schema, a document and a patch
fn setup_workspace(patch: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("schema.toml"), SCHEMA).unwrap();
    fs::write(
        dir.path().join("customer.json"),
        r#"{"name": "Ada", "email": "ada@example.com", "visits": 1}"#,
    )
    .unwrap();
    fs::write(dir.path().join("patch.json"), patch).unwrap();
    dir
}

fn patch_aware(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_patch-aware"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env("CLICOLOR", "0")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_apply_writes_patched_document() {
    let dir = setup_workspace(
        r#"[
            {"op": "replace", "path": "/name", "value": "Grace"},
            {"op": "add", "path": "/email", "value": "x@example.com"},
            {"op": "replace", "path": "/visits", "value": "2"}
        ]"#,
    );

    let output = patch_aware(
        dir.path(),
        &[
            "apply",
            "--schema",
            "schema.toml",
            "--document",
            "customer.json",
            "--patch",
            "patch.json",
            "--output",
            "out.json",
        ],
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout: {stdout}");
    assert!(stdout.contains("Summary:"));
    assert!(stdout.contains("2 applied"));
    assert!(stdout.contains("1 suppressed"));
    assert!(stdout.contains("0 failed"));

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out.json")).unwrap()).unwrap();
    assert_eq!(
        written,
        serde_json::json!({"name": "Grace", "email": "ada@example.com", "visits": 2})
    );
}

#[test]
fn test_apply_failures_exit_non_zero() {
    let dir = setup_workspace(
        r#"[
            {"op": "replace", "path": "/email", "value": "x@example.com"},
            {"op": "replace", "path": "/visits", "value": "many"}
        ]"#,
    );

    let output = patch_aware(
        dir.path(),
        &[
            "apply",
            "-s",
            "schema.toml",
            "-d",
            "customer.json",
            "-p",
            "patch.json",
            "--prefix",
            "input",
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("2 failed"));
    assert!(stdout.contains("input.Customer: The property at path 'email' could not be updated."));
    assert!(stderr.contains("The value 'many' is invalid for target location."));
}

#[test]
fn test_ignore_read_only_applies_marked_slots() {
    let dir = setup_workspace(r#"[{"op": "replace", "path": "/email", "value": "x@example.com"}]"#);

    let output = patch_aware(
        dir.path(),
        &[
            "apply",
            "-s",
            "schema.toml",
            "-d",
            "customer.json",
            "-p",
            "patch.json",
            "--ignore-read-only",
        ],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("x@example.com"));
    assert!(stdout.contains("1 applied"));
}

#[test]
fn test_apply_diff() {
    let dir = setup_workspace(r#"[{"op": "replace", "path": "/visits", "value": 5}]"#);

    let output = patch_aware(
        dir.path(),
        &[
            "apply",
            "-s",
            "schema.toml",
            "-d",
            "customer.json",
            "-p",
            "patch.json",
            "--diff",
        ],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("-  \"visits\": 1"));
    assert!(stdout.contains("+  \"visits\": 5"));
}

#[test]
fn test_check_reports_bad_operations() {
    let dir = setup_workspace(
        r#"[
            {"op": "add", "path": "/name"},
            {"op": "merge", "path": "/name", "value": 1},
            {"op": "remove", "path": "/name"}
        ]"#,
    );

    let output = patch_aware(
        dir.path(),
        &["check", "--schema", "schema.toml", "--patch", "patch.json"],
    );

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("2 type(s)"));
    assert!(stderr.contains("operation 0: The 'add' operation requires a 'value'."));
    assert!(stderr.contains("operation 1: Invalid JsonPatch operation 'merge'."));
    assert!(!stderr.contains("operation 2"));
}

#[test]
fn test_check_reports_schema_issues() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("schema.toml"),
        "[[types]]\nname = \"A\"\n\n[[types.slots]]\nname = \"b\"\ntype = \"B\"\n",
    )
    .unwrap();

    let output = patch_aware(dir.path(), &["check", "--schema", "schema.toml"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("slot 'A.b' refers to unknown type 'B'"));
}

#[test]
fn test_types_lists_markers() {
    let dir = setup_workspace("[]");

    let output = patch_aware(dir.path(), &["types", "--schema", "schema.toml"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Customer (root)"));
    assert!(stdout.contains("Archive [read-only]"));
    assert!(stdout.contains("email: string? [read-only]"));
}
