/*
 * cli.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end tests for the mailblocks binary.
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("mailblocks")
        .join("test-fixtures")
        .join(name)
}

fn mailblocks(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mailblocks"))
        .args(args)
        .env("RUST_LOG", "mailblocks=warn")
        .output()
        .expect("Failed to run mailblocks")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_render_with_values_and_config() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let config = temp.path().join("mailblocks.toml");
    fs::write(
        &config,
        "[shell]\ncompany-name = \"Sparkle & Shine\"\nsupport-email = \"help@sparkle.example\"\n",
    )
    .unwrap();
    let out = temp.path().join("email.html");

    let template = fixture_path("payment-reminder.json");
    let output = mailblocks(&[
        "render",
        template.to_str().unwrap(),
        "--examples",
        "-V",
        "pay_url=https://x/y",
        "--config",
        config.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));

    let html = fs::read_to_string(out).unwrap();
    assert!(html.contains("Hi Jane Smith,"));
    assert!(html.contains("href=\"https://x/y\""));
    assert!(html.contains("Sparkle &amp; Shine"));
    assert!(!html.contains("{{"));
}

#[test]
fn test_render_preserve_to_stdout() {
    let template = fixture_path("payment-reminder.json");
    let output = mailblocks(&["render", template.to_str().unwrap(), "--preserve"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let html = stdout(&output);
    assert!(html.contains("Hi {{customer_name}},"));
    assert!(html.contains("href=\"{{pay_url}}\""));
}

#[test]
fn test_import_reports_errors_with_exit_code() {
    let input = fixture_path("missing-subject.ts");
    let output = mailblocks(&["import", input.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
    let err = stderr(&output);
    assert!(err.contains("M-4-1"), "{}", err);
    assert!(err.contains("Missing subject"), "{}", err);
}

#[test]
fn test_import_then_generate() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let json = temp.path().join("service-reminder.json");
    let ts = temp.path().join("service-reminder.ts");

    let input = fixture_path("service-reminder.ts");
    let output = mailblocks(&[
        "import",
        input.to_str().unwrap(),
        "-o",
        json.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("Unrecognized content skipped"));

    let output = mailblocks(&[
        "generate",
        json.to_str().unwrap(),
        "-o",
        ts.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let source = fs::read_to_string(ts).unwrap();
    assert!(source.contains("export const slug = 'service-reminder';"));
    assert!(source.contains("<!-- block: button-5 -->"));
}

#[test]
fn test_listing_commands() {
    let output = mailblocks(&["catalog"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).lines().count(), 10);

    let output = mailblocks(&["variables", "--context", "service-reminder", "--json"]);
    assert!(output.status.success());
    let defs: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let names: Vec<&str> = defs
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"technician_name"));
    assert!(!names.contains(&"pay_url"));

    let output = mailblocks(&["new-block", "spacer", "gap"]);
    assert!(output.status.success());
    let block: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(block["type"], "spacer");
    assert_eq!(block["id"], "gap");
}
