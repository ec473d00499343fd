// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |var| {
        pairs
            .iter()
            .find(|(k, _)| *k == var)
            .map(|(_, v)| v.to_string())
    }
}

#[test]
fn defaults_point_at_local_coordinator() {
    let config = AgentConfig::default();
    assert_eq!(config.coordinator_addr.to_string(), "[::1]:8122");
    assert_eq!(config.heartbeat_interval, Duration::from_secs(1));
    assert_eq!(config.ack_timeout, Duration::from_secs(1));
    assert!(config.validate().is_ok());
}

#[test]
fn heartbeat_interval_comes_from_env_in_millis() {
    let mut config = AgentConfig::default();
    config
        .apply_env(env(&[
            ("FLOUT_HEARTBEAT_INTERVAL_MS", "250"),
            ("FLOUT_COORDINATOR_ADDR", "127.0.0.1:9100"),
        ]))
        .unwrap();

    assert_eq!(config.heartbeat_interval, Duration::from_millis(250));
    assert_eq!(config.coordinator_addr.to_string(), "127.0.0.1:9100");
}

#[test]
fn malformed_env_value_names_the_variable() {
    let mut config = AgentConfig::default();
    let err = config
        .apply_env(env(&[("FLOUT_ACK_TIMEOUT_MS", "soon")]))
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidEnv {
            var: "FLOUT_ACK_TIMEOUT_MS",
            ..
        }
    ));
}

#[test]
fn zero_heartbeat_interval_is_rejected() {
    let config = AgentConfig {
        heartbeat_interval: Duration::ZERO,
        ..AgentConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ZeroDuration("heartbeat_interval"))
    ));
}

#[test]
fn file_uses_human_durations() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"coordinator_addr = \"127.0.0.1:7000\"\nheartbeat_interval = \"500ms\"\n")
        .unwrap();

    let config = AgentConfig::from_file(file.path()).unwrap();
    assert_eq!(config.coordinator_addr.to_string(), "127.0.0.1:7000");
    assert_eq!(config.heartbeat_interval, Duration::from_millis(500));
    assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
}
