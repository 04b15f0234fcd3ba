#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::gachadex_cmd;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn run_json(tmp: &tempfile::TempDir, args: &[&str]) -> Value {
    let stdout = gachadex_cmd(tmp.path())
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&stdout).expect("stdout should be valid JSON")
}

#[test]
fn suggest_serves_bundled_snapshot_without_the_store() {
    let tmp = tempdir().unwrap();

    let payload = run_json(&tmp, &["suggest", "hilda", "--format", "json"]);

    let results = payload.as_array().expect("array of suggestions");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"]["en"], "Hilda");
    assert_eq!(results[0]["kind"], "character");
    assert!(
        results[0]["subtitle"]
            .as_str()
            .unwrap()
            .contains("Support")
    );
}

#[test]
fn suggest_honors_the_limit_flag() {
    let tmp = tempdir().unwrap();

    // "a" substring-matches many snapshot names
    let all = run_json(&tmp, &["suggest", "a", "--format", "json"]);
    assert!(all.as_array().unwrap().len() > 2);

    let capped = run_json(&tmp, &["suggest", "a", "-n", "2", "--format", "json"]);
    assert_eq!(capped.as_array().unwrap().len(), 2);
}

#[test]
fn suggest_resolves_vietnamese_names() {
    let tmp = tempdir().unwrap();

    let stdout = gachadex_cmd(tmp.path())
        .args(["suggest", "judgement", "--lang", "vi"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(stdout).unwrap();

    // The weapon "Judgement Edge" carries a Vietnamese name variant
    assert!(text.contains("[weapon]"), "missing kind tag: {text}");
    assert!(!text.contains("Judgement Edge"), "expected VI name: {text}");
}

#[test]
fn suggest_kind_filter_serves_only_that_kind() {
    let tmp = tempdir().unwrap();

    // The store is unreachable, so the per-kind lookup falls back to
    // the warmed snapshot filtered to weapons
    let payload = run_json(&tmp, &["suggest", "a", "--kind", "weapon", "--format", "json"]);

    let results = payload.as_array().expect("array of suggestions");
    assert!(!results.is_empty());
    assert!(results.iter().all(|s| s["kind"] == "weapon"));
}

#[test]
fn suggest_kind_fallback_finds_snapshot_weapons() {
    let tmp = tempdir().unwrap();

    let payload = run_json(
        &tmp,
        &["suggest", "judgement", "--kind", "weapon", "--format", "json"],
    );

    let results = payload.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"]["en"], "Judgement Edge");
}

#[test]
fn suggest_with_unreachable_store_degrades_to_no_results() {
    let tmp = tempdir().unwrap();

    // Nothing in the snapshot matches, so the fallback path runs and
    // fails against the refused endpoint; that is still a success
    gachadex_cmd(tmp.path())
        .args(["suggest", "qqqq"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No suggestions for 'qqqq'"));
}

async fn start_moonveil_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/data/production/query/combined-suggest"))
        .and(query_param("term", "moonveil"))
        .and(query_param("per_kind", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{
                "characters": [
                    {"_id": "character-moonveil",
                     "name": {"en": "Moonveil", "vi": "Màn Trăng"},
                     "slug": {"current": "moonveil"},
                     "role": "Annihilator", "element": "Shadow", "weapon": "Bow"}
                ],
                "weapons": []
            }"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/data/production/query/weapon-search"))
        .and(query_param("term", "moonveil"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[
                {"_id": "weapon-moonveil-bow",
                 "name": {"en": "Moonveil Bow", "vi": "Cung Màn Trăng"},
                 "slug": {"current": "moonveil-bow"},
                 "type": "Bow", "rarity": "SSR"}
            ]"#,
        ))
        .mount(&server)
        .await;

    server
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "network: run in CI"]
async fn suggest_falls_back_to_the_store_on_a_static_miss() {
    let tmp = tempdir().unwrap();
    let server = start_moonveil_server().await;

    let stdout = gachadex_cmd(tmp.path())
        .env("GACHADEX_STORE_ENDPOINT", server.uri())
        .args(["suggest", "moonveil", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let payload: Value = serde_json::from_slice(&stdout).unwrap();

    let results = payload.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"]["en"], "Moonveil");
    assert!(
        results[0]["subtitle"]
            .as_str()
            .unwrap()
            .contains("Annihilator")
    );
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "network: run in CI"]
async fn suggest_kind_queries_the_per_kind_endpoint() {
    let tmp = tempdir().unwrap();
    let server = start_moonveil_server().await;

    let stdout = gachadex_cmd(tmp.path())
        .env("GACHADEX_STORE_ENDPOINT", server.uri())
        .args(["suggest", "moonveil", "--kind", "weapon", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let payload: Value = serde_json::from_slice(&stdout).unwrap();

    let results = payload.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"]["en"], "Moonveil Bow");
    assert_eq!(results[0]["kind"], "weapon");
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "network: run in CI"]
async fn warm_reports_cached_suggestion_counts() {
    let tmp = tempdir().unwrap();
    let server = start_moonveil_server().await;

    gachadex_cmd(tmp.path())
        .env("GACHADEX_STORE_ENDPOINT", server.uri())
        .args(["warm", "moonveil"])
        .assert()
        .success()
        .stdout(predicate::str::contains("warmed 'moonveil' (1 suggestions)"))
        .stdout(predicate::str::contains("1 of 1 terms warmed"));
}

#[test]
fn warm_failures_do_not_fail_the_command() {
    let tmp = tempdir().unwrap();

    gachadex_cmd(tmp.path())
        .args(["warm", "qqqq"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 of 1 terms warmed"))
        .stderr(predicate::str::contains("failed to warm 'qqqq'"));
}

#[test]
fn live_answers_piped_queries_after_the_debounce() {
    let tmp = tempdir().unwrap();

    gachadex_cmd(tmp.path())
        .args(["live", "--debounce-ms", "10"])
        .write_stdin("hilda\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hilda"));
}
