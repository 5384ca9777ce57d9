//! Environment-driven configuration
//!
//! Process environment is global, so every case lives in one test and the
//! variables are restored before it returns.

use launch_dash_core::dashboard::DashboardConfig;
use std::io::Write;
use std::path::PathBuf;

const VARS: [&str; 5] = [
    "LAUNCH_DASH_HOST",
    "LAUNCH_DASH_PORT",
    "LAUNCH_DASH_DATA",
    "LAUNCH_DASH_SESSION_TTL_SECS",
    "LAUNCH_DASH_CONFIG",
];

struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    fn capture() -> Self {
        let saved = VARS.iter().map(|&k| (k, std::env::var(k).ok())).collect();
        for k in VARS {
            std::env::remove_var(k);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (k, v) in &self.saved {
            match v {
                Some(v) => std::env::set_var(k, v),
                None => std::env::remove_var(k),
            }
        }
    }
}

#[test]
fn env_values_override_or_fall_back() {
    let _guard = EnvGuard::capture();

    // unset: defaults
    assert_eq!(DashboardConfig::from_env(), DashboardConfig::default());

    // empty or unparsable: defaults
    std::env::set_var("LAUNCH_DASH_HOST", "");
    std::env::set_var("LAUNCH_DASH_PORT", "eighty");
    std::env::set_var("LAUNCH_DASH_DATA", "");
    std::env::set_var("LAUNCH_DASH_SESSION_TTL_SECS", "-5");
    let config = DashboardConfig::from_env();
    assert_eq!(config, DashboardConfig::default());
    assert_eq!(config.addr(), "127.0.0.1:8050");

    // usable values are taken
    std::env::set_var("LAUNCH_DASH_HOST", "0.0.0.0");
    std::env::set_var("LAUNCH_DASH_PORT", "9050");
    std::env::set_var("LAUNCH_DASH_DATA", "data/launches.csv");
    std::env::set_var("LAUNCH_DASH_SESSION_TTL_SECS", "120");
    let config = DashboardConfig::from_env();
    assert_eq!(config.addr(), "0.0.0.0:9050");
    assert_eq!(config.data_path, PathBuf::from("data/launches.csv"));
    assert_eq!(config.session_ttl_secs, 120);

    // load(): TOML named by LAUNCH_DASH_CONFIG overlays the env values
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 9300").unwrap();
    std::env::set_var("LAUNCH_DASH_CONFIG", file.path());
    let config = DashboardConfig::load();
    assert_eq!(config.port, 9300);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.session_ttl_secs, 120);

    // load(): a broken file keeps the env values
    let mut broken = tempfile::NamedTempFile::new().unwrap();
    writeln!(broken, "port = [").unwrap();
    std::env::set_var("LAUNCH_DASH_CONFIG", broken.path());
    let config = DashboardConfig::load();
    assert_eq!(config.port, 9050);
    assert_eq!(config.data_path, PathBuf::from("data/launches.csv"));
}
