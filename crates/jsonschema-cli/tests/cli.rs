use std::{fs, path::PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

fn cli() -> Command {
    Command::cargo_bin("jsonschema-cli").expect("Binary exists")
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Written");
    path
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("UTF-8 output")
}

#[test]
fn valid_instance() {
    let dir = TempDir::new().expect("Temporary directory");
    let schema = write(&dir, "schema.json", r#"{"type": "integer"}"#);
    let instance = write(&dir, "instance.json", "42");
    let output = cli()
        .arg(&schema)
        .arg("-i")
        .arg(&instance)
        .output()
        .expect("Ran");
    assert!(output.status.success());
    assert_eq!(stdout(&output), format!("{} - VALID\n", instance.display()));
}

#[test]
fn invalid_instance() {
    let dir = TempDir::new().expect("Temporary directory");
    let schema = write(
        &dir,
        "schema.json",
        r#"{"properties": {"name": {"type": "string"}}}"#,
    );
    let instance = write(&dir, "instance.json", r#"{"name": 1}"#);
    let output = cli()
        .arg(&schema)
        .arg("-i")
        .arg(&instance)
        .output()
        .expect("Ran");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        format!(
            "{} - INVALID. Errors:\n1. /name: 1 is not of type \"string\"\n",
            instance.display()
        )
    );
}

#[test]
fn flag_output_is_a_json_line() {
    let dir = TempDir::new().expect("Temporary directory");
    let schema = write(&dir, "schema.json", r#"{"minimum": 10}"#);
    let valid = write(&dir, "valid.json", "11");
    let invalid = write(&dir, "invalid.json", "9");
    let output = cli()
        .arg(&schema)
        .arg("-i")
        .arg(&valid)
        .arg("-i")
        .arg(&invalid)
        .args(["--output", "flag"])
        .output()
        .expect("Ran");
    assert_eq!(output.status.code(), Some(1));
    let lines: Vec<serde_json::Value> = stdout(&output)
        .lines()
        .map(|line| serde_json::from_str(line).expect("JSON line"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["output"], "flag");
    assert_eq!(lines[0]["payload"], serde_json::json!({"valid": true}));
    assert_eq!(lines[1]["payload"], serde_json::json!({"valid": false}));
}

#[test]
fn list_output_uses_the_base_uri() {
    let dir = TempDir::new().expect("Temporary directory");
    let schema = write(&dir, "schema.json", r#"{"required": ["id"]}"#);
    let instance = write(&dir, "instance.json", "{}");
    let output = cli()
        .arg(&schema)
        .arg("-i")
        .arg(&instance)
        .args(["--output", "list", "--base-uri", "http://example.com/s.json"])
        .output()
        .expect("Ran");
    let line: serde_json::Value =
        serde_json::from_str(stdout(&output).trim_end()).expect("JSON line");
    assert_eq!(
        line["payload"]["errors"][0]["schemaLocation"],
        "http://example.com/s.json#"
    );
    assert_eq!(line["payload"]["errors"][0]["code"], "required_missing");
}

#[test]
fn references_to_files_are_loaded() {
    let dir = TempDir::new().expect("Temporary directory");
    write(&dir, "name.json", r#"{"type": "string", "minLength": 1}"#);
    let schema = write(
        &dir,
        "schema.json",
        r#"{"properties": {"name": {"$ref": "name.json"}}}"#,
    );
    let instance = write(&dir, "instance.json", r#"{"name": ""}"#);
    let output = cli()
        .arg(&schema)
        .arg("-i")
        .arg(&instance)
        .output()
        .expect("Ran");
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("/name: \"\" is shorter than 1 characters"));
}

#[test]
fn resources_are_compiled_first() {
    let dir = TempDir::new().expect("Temporary directory");
    let resource = write(
        &dir,
        "positive.json",
        r#"{"$id": "http://example.com/positive.json", "exclusiveMinimum": 0}"#,
    );
    let schema = write(
        &dir,
        "schema.json",
        r#"{"items": {"$ref": "http://example.com/positive.json"}}"#,
    );
    let instance = write(&dir, "instance.json", "[1, 2, 3]");
    cli()
        .arg(&schema)
        .arg("-r")
        .arg(&resource)
        .arg("-i")
        .arg(&instance)
        .assert()
        .success();
}

#[test]
fn formats_are_asserted_on_request() {
    let dir = TempDir::new().expect("Temporary directory");
    let schema = write(&dir, "schema.json", r#"{"format": "email"}"#);
    let instance = write(&dir, "instance.json", r#""not an email""#);
    cli()
        .arg(&schema)
        .arg("-i")
        .arg(&instance)
        .assert()
        .success();
    cli()
        .arg(&schema)
        .arg("-i")
        .arg(&instance)
        .arg("--assert-format")
        .assert()
        .code(1);
}

#[test]
fn invalid_schema_exits_with_two() {
    let dir = TempDir::new().expect("Temporary directory");
    let schema = write(&dir, "schema.json", r#"{"minLength": -1}"#);
    let output = cli().arg(&schema).output().expect("Ran");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).expect("UTF-8 output");
    assert!(stderr.starts_with("Error: Invalid schema at '#/minLength'"), "{stderr}");
}

#[test]
fn missing_schema_file_exits_with_two() {
    let dir = TempDir::new().expect("Temporary directory");
    cli()
        .arg(dir.path().join("missing.json"))
        .assert()
        .code(2);
}
