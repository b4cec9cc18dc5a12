//! E2E tests for feature access and redirects.

use predicates::prelude::*;

mod common;

use common::fixtures::{Workspace, envelope_data};

#[test]
fn kol_without_credits_cannot_open_campaigns() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["access", "check", "campaigns", "--role", "kol", "--credits", "0"])
        .assert()
        .code(5)
        .stdout(predicate::str::contains("campaigns: denied"))
        .stderr(predicate::str::contains("KOL-D002"));
}

#[test]
fn kol_can_open_contracts() {
    let ws = Workspace::new();
    let output = ws
        .cmd()
        .args(["access", "check", "contracts", "--role", "kol", "--credits", "0", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let data = envelope_data(&output.stdout);
    assert_eq!(data["allowed"], true);
    assert_eq!(data["context"]["role"], "kol");
    assert_eq!(data["accessibleFeatures"], serde_json::json!(["contracts"]));
}

#[test]
fn search_uses_session_balance_without_writing() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["access", "check", "search", "--role", "brand"])
        .assert()
        .success()
        .stdout(predicate::str::contains("search: allowed"));
    assert!(!ws.session_path("default").exists());

    ws.cmd().args(["credits", "set", "0"]).assert().success();
    ws.cmd()
        .args(["access", "check", "search", "--role", "brand"])
        .assert()
        .code(5);
}

#[test]
fn unknown_feature_is_denied() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["access", "check", "billing", "--role", "admin", "--credits", "10"])
        .assert()
        .code(5);
}

#[test]
fn anonymous_visitor_is_sent_to_login() {
    let ws = Workspace::new();
    let output = ws
        .cmd()
        .args(["access", "redirect", "--anonymous", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(envelope_data(&output.stdout)["path"], "/login");
}

#[test]
fn incomplete_onboarding_is_sent_to_role_onboarding() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["access", "redirect", "--role", "brand", "--onboarding", "incomplete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/onboarding/brand"));
}

#[test]
fn onboarded_user_lands_on_dashboard() {
    let ws = Workspace::new();
    let output = ws
        .cmd()
        .args(["access", "redirect", "--role", "kol", "--json"])
        .output()
        .unwrap();
    assert_eq!(envelope_data(&output.stdout)["path"], "/dashboard");
}

#[test]
fn anonymous_conflicts_with_role() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["access", "redirect", "--anonymous", "--role", "brand"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
