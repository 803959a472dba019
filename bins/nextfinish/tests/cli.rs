//! Offline command-line tests. Nothing here talks to a geocoder.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const CATALOG: &str = r#"[
    {"id": 1, "name": "Leipzig Marathon", "category": "Laufen", "distance": 42.195,
     "date": "2026-04-12", "location": "Leipzig", "lat": 51.34, "lng": 12.37},
    {"id": 2, "name": "Berliner Halbmarathon", "category": "Laufen", "distance": "21.1",
     "date": "2026-04-05", "lat": 52.52, "lng": 13.40},
    {"id": 3, "title": "Elbe Radtour", "category": "Radfahren", "description": "Entlang der Elbe"}
]"#;

fn catalog_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(CATALOG.as_bytes()).unwrap();
    file
}

fn nextfinish() -> Command {
    let mut cmd = Command::cargo_bin("nextfinish").unwrap();
    cmd.env("NO_COLOR", "1").arg("--no-color").arg("--quiet");
    cmd
}

#[test]
fn search_lists_events_in_date_order() {
    let catalog = catalog_file();
    nextfinish()
        .args(["search", "--catalog"])
        .arg(catalog.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("3 Events"))
        .stdout(predicate::str::contains("Berliner Halbmarathon"))
        .stdout(predicate::str::contains("Elbe Radtour"));
}

#[test]
fn search_json_applies_bucket() {
    let catalog = catalog_file();
    let output = nextfinish()
        .args(["--format", "json", "search", "--bucket", "marathon", "--catalog"])
        .arg(catalog.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let view: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(view["count"], 1);
    assert_eq!(view["events"][0]["id"], "1");
    assert_eq!(view["status"], "idle");
    assert_eq!(view["viewport"]["zoom"], 6);
}

#[test]
fn search_rejects_unknown_bucket() {
    let catalog = catalog_file();
    nextfinish()
        .args(["search", "--bucket", "ultra", "--catalog"])
        .arg(catalog.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown distance bucket"));
}

#[test]
fn show_prints_event_detail() {
    let catalog = catalog_file();
    nextfinish()
        .args(["show", "3", "--catalog"])
        .arg(catalog.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Elbe Radtour"))
        .stdout(predicate::str::contains("Datum unbekannt"))
        .stdout(predicate::str::contains("Entlang der Elbe"));
}

#[test]
fn show_unknown_event_exits_with_catalog_code() {
    let catalog = catalog_file();
    nextfinish()
        .args(["show", "99", "--catalog"])
        .arg(catalog.path())
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Event not found: 99"));
}

#[test]
fn missing_catalog_file_fails() {
    nextfinish()
        .args(["search", "--catalog", "/definitely/not/here.json"])
        .assert()
        .failure();
}

#[test]
fn explicit_missing_config_exits_with_config_code() {
    let catalog = catalog_file();
    nextfinish()
        .args(["--config", "/definitely/not/here.toml", "search", "--catalog"])
        .arg(catalog.path())
        .assert()
        .code(3);
}

#[test]
fn backfill_requires_output_unless_dry_run() {
    let catalog = catalog_file();
    nextfinish()
        .args(["backfill", "--catalog"])
        .arg(catalog.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn json_format_prints_error_report() {
    let catalog = catalog_file();
    let output = nextfinish()
        .args(["--format", "json", "show", "99", "--catalog"])
        .arg(catalog.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["code"], "E4002");
    assert_eq!(report["category"], "catalog");
}

#[test]
fn repeated_category_still_filters() {
    let catalog = catalog_file();
    nextfinish()
        .args(["search", "--category", "Laufen", "--category", "Laufen", "--catalog"])
        .arg(catalog.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 Events"))
        .stdout(predicate::str::contains("Elbe Radtour").not());
}

#[test]
fn radius_outside_slider_bounds_is_rejected() {
    // Rejected before any geocoder call
    let catalog = catalog_file();
    nextfinish()
        .args(["search", "--place", "Leipzig", "--radius", "5", "--catalog"])
        .arg(catalog.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Radius 5 km is outside the allowed range"));
}

#[test]
fn json_format_reports_config_errors_as_json() {
    let catalog = catalog_file();
    let output = nextfinish()
        .args(["--format", "json", "--config", "/definitely/not/here.toml", "search", "--catalog"])
        .arg(catalog.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["code"], "E3001");
    assert_eq!(report["category"], "configuration");
}

#[test]
fn metrics_flag_prints_snapshot() {
    let catalog = catalog_file();
    nextfinish()
        .args(["search", "--metrics", "--catalog"])
        .arg(catalog.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("\"discovery.result_count\": 3"));
}
