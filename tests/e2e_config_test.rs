//! E2E tests for the `config` command.

mod common;

use common::fixtures::{Workspace, envelope_data};

#[test]
fn config_command_reports_sources() {
    let ws = Workspace::new();
    ws.write_config(&kolgate::make_test_config_toml(7));

    let output = ws
        .cmd()
        .env("KOLGATE_DAILY_CREDITS", "8")
        .args(["config", "--session", "kim", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let data = envelope_data(&output.stdout);
    assert_eq!(data["configExists"], true);
    let entries = data["entries"].as_array().unwrap();
    let source_of = |key: &str| {
        entries
            .iter()
            .find(|e| e["key"] == key)
            .map(|e| e["source"].as_str().unwrap().to_string())
            .unwrap()
    };
    assert_eq!(source_of("credits.reset_hour"), "config file");
    assert_eq!(source_of("credits.daily_free_credits"), "environment variable");
    assert_eq!(source_of("session"), "CLI flag");
    assert_eq!(source_of("output.pretty"), "default");
}

#[test]
fn config_command_without_file_uses_defaults() {
    let ws = Workspace::new();
    let output = ws.cmd().args(["config", "--json"]).output().unwrap();
    assert!(output.status.success());

    let data = envelope_data(&output.stdout);
    assert_eq!(data["configExists"], false);
    let reset_hour = data["entries"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["key"] == "credits.reset_hour")
        .unwrap();
    assert_eq!(reset_hour["source"], "default");
}
