//! Integration tests for the testbed harness
//!
//! These tests stand in for the real integration with small shell scripts,
//! so the whole run/results/validate pipeline is exercised without a flex
//! installation:
//! 1. Writing a fake integration binary into a temp directory
//! 2. Staging fixtures and running them through the harness
//! 3. Checking which stage passed or failed
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use flex_testbed::common::logging;
use flex_testbed::testbed::{
    run_fixture, run_suite_file, ChildFlexRunner, Fixture, FixtureSuite, FlexRunner,
    MetricValidator, RunConfiguration, ScenarioOptions, Stage, TestCase,
};
use flex_testbed::Error;
use serde_json::json;
use tempfile::TempDir;

/// A fake integration binary living in its own temp directory
struct FakeFlex {
    dir: TempDir,
    bin: PathBuf,
}

impl FakeFlex {
    /// Script body runs with `$1` = config flag and `$2` = config path
    fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let bin = dir.path().join("nri-flex");
        fs::write(&bin, format!("#!/bin/sh\n{body}\n")).expect("Failed to write fake flex");
        fs::set_permissions(&bin, fs::Permissions::from_mode(0o755))
            .expect("Failed to make fake flex executable");
        Self { dir, bin }
    }

    /// Prints a fixed payload, after checking it was invoked the way flex is
    fn printing(payload: &str) -> Self {
        let fake = Self::new(
            r#"[ "$1" = "-config_path" ] || { echo "unexpected flag $1" >&2; exit 2; }
[ -f "$2" ] || { echo "config not found: $2" >&2; exit 2; }
cat "$(dirname "$0")/payload.json""#,
        );
        fs::write(fake.dir.path().join("payload.json"), payload).expect("Failed to write payload");
        fake
    }

    /// Prints the content of the file the config's `file:` entry points at
    fn echoing_file() -> Self {
        Self::new(r#"cat "$(sed -n 's/^ *file: *//p' "$2" | head -n 1)""#)
    }

    fn options(&self) -> ScenarioOptions {
        ScenarioOptions::new(&self.bin)
    }
}

fn sample(event_type: &str, extra: serde_json::Value) -> serde_json::Value {
    let mut metric = json!({"event_type": event_type});
    if let (Some(metric), Some(extra)) = (metric.as_object_mut(), extra.as_object()) {
        metric.extend(extra.clone());
    }
    metric
}

fn status_sample(events: usize) -> serde_json::Value {
    sample(
        "flexStatusSample",
        json!({
            "flex.Hostname": "ci-runner",
            "flex.counter.ConfigsProcessed": 1,
            "flex.counter.EventCount": events,
            "flex.time.elapsedMs": 12,
        }),
    )
}

fn payload(metrics: Vec<serde_json::Value>) -> String {
    json!({
        "name": "com.newrelic.nri-flex",
        "protocol_version": "3",
        "integration_version": "Unknown-SNAPSHOT",
        "data": [{"metrics": metrics, "inventory": {}, "events": []}],
    })
    .to_string()
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn load_fixture(suite: &str, name: &str) -> Fixture {
    let suite = FixtureSuite::load(&fixtures_dir().join(suite)).expect("Failed to load suite");
    suite
        .fixtures
        .into_iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("Fixture '{name}' not found"))
}

// ============== Tests ==============

#[test]
fn test_bundled_suites_parse() {
    for file in ["command_api.yaml", "file_api.yaml", "url_api.yaml", "linux_disk.yaml"] {
        let suite = FixtureSuite::load(&fixtures_dir().join(file)).unwrap();
        assert!(!suite.fixtures.is_empty(), "{file} has no fixtures");
        for fixture in &suite.fixtures {
            MetricValidator::new(&fixture.expected_stdout, &fixture.expected_stderr)
                .unwrap_or_else(|e| panic!("{file}: '{}': {e}", fixture.name));
        }
    }
}

#[tokio::test]
async fn test_directory_listing_scenario() {
    logging::init_test();

    // Seven files, one sample each, plus the status sample
    let mut metrics: Vec<_> = [
        "apt.conf.d",
        "auth.conf.d",
        "keyrings",
        "preferences.d",
        "sources.list",
        "sources.list.d",
        "trusted.gpg.d",
    ]
    .iter()
    .map(|name| sample("LinuxFileList", json!({"FileName": name})))
    .collect();
    metrics.push(status_sample(7));

    let fake = FakeFlex::printing(&payload(metrics));
    let fixture = load_fixture(
        "linux_disk.yaml",
        "Linux file list of the /etc/apt directory",
    );

    let result = run_fixture(&fixture, &fake.options()).await;
    result.assert_passed();
    let summary = result.summary.unwrap();
    assert_eq!(summary.entities, 1);
    assert_eq!(summary.actual_metrics, 8);
}

#[tokio::test]
async fn test_directory_listing_missing_file_fails() {
    logging::init_test();

    let mut metrics: Vec<_> = (0..6)
        .map(|i| sample("LinuxFileList", json!({"FileName": format!("f{i}")})))
        .collect();
    metrics.push(status_sample(6));

    let fake = FakeFlex::printing(&payload(metrics));
    let fixture = load_fixture(
        "linux_disk.yaml",
        "Linux file list of the /etc/apt directory",
    );

    let result = run_fixture(&fixture, &fake.options()).await;
    assert_eq!(result.stage, Some(Stage::Validate));
    assert_eq!(
        result.error.unwrap().mismatches(),
        ["metric count: expected 8, got 7"]
    );
}

#[tokio::test]
async fn test_include_filter_scenario_counts() {
    logging::init_test();

    // What flex prints for `sample_include_filter: [{customerId: abc}]`
    let filtered = payload(vec![
        sample(
            "usageInfoSample",
            json!({"customerId": "abc", "quantities": 10, "env": "production"}),
        ),
        status_sample(1),
    ]);
    let fake = FakeFlex::printing(&filtered);

    let fixture = load_fixture("file_api.yaml", "Use sample_include_filter to get key");
    run_fixture(&fixture, &fake.options()).await.assert_passed();

    // The same run checked against an expectation of two matching samples
    let mut two_matches = fixture.clone();
    two_matches.expected_stdout = payload(vec![
        sample("usageInfoSample", json!({"customerId": "abc"})),
        sample("usageInfoSample", json!({"customerId": "xyz"})),
        status_sample(2),
    ]);
    let result = run_fixture(&two_matches, &fake.options()).await;
    assert!(!result.passed);
    assert_eq!(result.stage, Some(Stage::Validate));
}

#[tokio::test]
async fn test_staged_file_reaches_integration() {
    logging::init_test();

    let staged_payload = payload(vec![
        sample("readSample", json!({"brand": "honda"})),
        status_sample(1),
    ]);
    let fixture = Fixture {
        name: "file staged".to_string(),
        config: "name: read\napis:\n  - name: read\n    file: FILE_PATH\n".to_string(),
        expected_stdout: staged_payload.clone(),
        expected_stderr: String::new(),
        file_content: Some(staged_payload),
        http: None,
    };

    let fake = FakeFlex::echoing_file();
    run_fixture(&fixture, &fake.options()).await.assert_passed();
}

#[tokio::test]
async fn test_failing_integration_stops_at_run() {
    logging::init_test();

    let fake = FakeFlex::new("echo 'level=error msg=\"config invalid\"' >&2; exit 1");
    let fixture = load_fixture("file_api.yaml", "Use ignore_output");

    let result = run_fixture(&fixture, &fake.options()).await;
    assert_eq!(result.stage, Some(Stage::Run));
    match result.error {
        Some(Error::ProcessExit { stderr, .. }) => assert!(stderr.contains("config invalid")),
        other => panic!("Expected ProcessExit, got {other:?}"),
    }
}

#[tokio::test]
async fn test_garbage_output_fails_validation() {
    logging::init_test();

    let fake = FakeFlex::printing("panic: runtime error: index out of range");
    let fixture = load_fixture("file_api.yaml", "Use ignore_output");

    let result = run_fixture(&fixture, &fake.options()).await;
    assert_eq!(result.stage, Some(Stage::Validate));
    assert!(matches!(result.error, Some(Error::Parse(_))));
}

#[tokio::test]
async fn test_capture_fidelity() {
    let fake = FakeFlex::new(r#"printf 'exact\tbytes\n\n'; printf 'tail' >&2"#);
    let config = fake.dir.path().join("config.yml");
    fs::write(&config, "name: x\n").unwrap();

    let mut runner = ChildFlexRunner::new(RunConfiguration::new(&fake.bin, &config));
    runner.run().await.unwrap();

    let result = runner.results().unwrap();
    assert_eq!(result.stdout, "exact\tbytes\n\n");
    assert_eq!(result.stderr, "tail");
}

#[tokio::test]
async fn test_test_case_with_child_runner() {
    let expected = payload(vec![status_sample(0)]);
    let fake = FakeFlex::printing(&expected);
    let config = fake.dir.path().join("config.yml");
    fs::write(&config, "name: x\n").unwrap();

    let runner = ChildFlexRunner::from_paths(&fake.bin, &config);
    let validator = MetricValidator::new(&expected, "").unwrap();
    let mut tc = TestCase::new("status only", Box::new(runner), Box::new(validator));

    let result = tc.run_test().await;
    result.assert_passed();
}

#[tokio::test]
async fn test_run_suite_file_reports_each_fixture() {
    logging::init_test();

    let good = payload(vec![status_sample(0)]);
    let fake = FakeFlex::printing(&good);

    let suite_path: &Path = &fake.dir.path().join("suite.yaml");
    let suite = json!({
        "name": "Mixed",
        "fixtures": [
            {"name": "status only", "config": "name: a\n", "expected_stdout": good},
            {"name": "expects more", "config": "name: b\n",
             "expected_stdout": payload(vec![status_sample(1), sample("x", json!({}))])},
        ],
    });
    // JSON is valid YAML
    fs::write(suite_path, suite.to_string()).unwrap();

    let results = run_suite_file(suite_path, &fake.options(), None).await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].passed);
    assert!(!results[1].passed);

    let filtered = run_suite_file(suite_path, &fake.options(), Some("status"))
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
}
