use std::collections::BTreeMap;

use test_support::{cmd_bin, incidents_server, read_fixture_text, BIN};

fn run_json(endpoint: &str, from: &str, to: &str) -> BTreeMap<String, i64> {
  let out = cmd_bin(BIN)
    .args(["--endpoint", endpoint, "--from", from, "--to", to, "--output", "json"])
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn fixture_month_aggregates_per_day() {
  let server = incidents_server(&read_fixture_text("incidents.json"));
  let map = run_json(&server.base_url(), "2024-03-01", "2024-03-31");

  let expected: BTreeMap<String, i64> = [
    ("2024-03-05".to_string(), 25),
    ("2024-03-12".to_string(), 90),
    ("2024-03-20".to_string(), -60),
    ("2024-03-31".to_string(), 120),
  ]
  .into_iter()
  .collect();
  assert_eq!(map, expected);
}

#[test]
fn start_boundary_excluded_end_boundary_included() {
  let body = r#"{"incidents":[
    {"created_at":"2024-03-01T00:00:00Z","resolved_at":"2024-03-01T00:30:00Z"},
    {"created_at":"2024-03-31T00:00:00Z","resolved_at":"2024-03-31T00:30:00Z"}
  ]}"#;
  let server = incidents_server(body);
  let map = run_json(&server.base_url(), "2024-03-01", "2024-03-31");
  assert!(!map.contains_key("2024-03-01"));
  assert_eq!(map.get("2024-03-31"), Some(&30));
}

#[test]
fn endpoint_trailing_slash_is_tolerated() {
  let server = incidents_server(r#"{"incidents":[]}"#);
  let map = run_json(&format!("{}/", server.base_url()), "2024-03-01", "2024-03-31");
  assert!(map.is_empty());
}

#[test]
fn single_incident_yields_its_minutes() {
  let body = r#"{"incidents":[{"created_at":"2024-03-01T10:00:00Z","resolved_at":"2024-03-01T10:30:00Z"}]}"#;
  let server = incidents_server(body);
  let map = run_json(&server.base_url(), "2024-03-01", "2024-03-31");
  assert_eq!(map.len(), 1);
  assert_eq!(map["2024-03-01"], 30);
}
