// =============================================================================
// Run log plumbing. The run context is process-global (one events/trace pair
// per process), so everything lives in a single test: routing by level,
// credential redaction, and the manifest.
// =============================================================================

use pumpwatch::logging::{self, obj, v_num, v_str, Domain, Level};

#[test]
fn run_directory_carries_manifest_events_and_trace() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::env::set_var("LOG_DIR", dir.path());
    std::env::set_var("RUN_ID", "test-run");
    std::env::set_var("LOG_LEVEL", "trace");

    logging::log(
        Level::Info,
        Domain::Alert,
        "alert_triggered",
        obj(&[
            ("symbol", v_str("AAAUSDT")),
            ("change_pct", v_num(5.0)),
            ("bot_token", v_str("123:should-never-appear")),
        ]),
    );
    logging::log(
        Level::Debug,
        Domain::Market,
        "kline_fetch_failed",
        obj(&[("symbol", v_str("BBBUSDT"))]),
    );

    let run_dir = dir.path().join("test-run");

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(run_dir.join("manifest.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["run_id"], "test-run");
    assert!(manifest["pid"].as_u64().is_some());

    let events = std::fs::read_to_string(run_dir.join("events.jsonl")).unwrap();
    let event: serde_json::Value = serde_json::from_str(events.lines().next().unwrap()).unwrap();
    assert_eq!(event["event"], "alert_triggered");
    assert_eq!(event["run_id"], "test-run");
    assert_eq!(event["lvl"], "INFO");
    assert_eq!(event["symbol"], "AAAUSDT");
    assert_eq!(event["data"]["change_pct"], 5.0);
    // Credentials are redacted before anything reaches disk.
    assert_eq!(event["data"]["bot_token"], "[REDACTED]");
    assert!(!events.contains("should-never-appear"));

    // Debug and trace records go to the trace stream, not events.
    let trace = std::fs::read_to_string(run_dir.join("trace.jsonl")).unwrap();
    assert!(trace.contains("kline_fetch_failed"));
    assert!(!events.contains("kline_fetch_failed"));
}
