#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use tally_gateway::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
gateway:
  listen: "0.0.0.0:8080"
health:
  intervall_ms: 30000 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.listen, "0.0.0.0:8080");
    assert_eq!(cfg.store.max_key_length, None);
    assert!(cfg.health.enabled);
    assert_eq!(cfg.health.interval_ms, 30_000);
    assert_eq!(cfg.health.time_to_live().as_secs(), 60);
    assert_eq!(cfg.health.property, "VotingServiceHealth");
    assert_eq!(cfg.health.sub_property, "Heartbeat");
    assert!(!cfg.health.inject_error_report);
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
gateway:
  listen: "127.0.0.1:9000"
store:
  max_key_length: 10
health:
  enabled: false
  interval_ms: 5000
  sink_timeout_ms: 1000
  inject_error_report: true
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.gateway.listen_addr().unwrap().port(), 9000);
    assert_eq!(cfg.store.options().max_key_length, Some(10));
    assert!(!cfg.health.enabled);
    assert!(cfg.health.inject_error_report);
}

#[test]
fn wrong_version_rejected() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn range_checks() {
    let cases = [
        "version: 1\ngateway:\n  listen: \"not-an-addr\"\n",
        "version: 1\nstore:\n  max_key_length: 0\n",
        "version: 1\nhealth:\n  interval_ms: 10\n",
        "version: 1\nhealth:\n  interval_ms: 5000\n  sink_timeout_ms: 5000\n",
        "version: 1\nhealth:\n  property: \"\"\n",
    ];
    for c in cases {
        let err = config::load_from_str(c).expect_err(c);
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST", "case={c}");
    }
}
