// Dashboard module - launch records web UI
//
// HTTP server with per-session selection state and SSE chart pushes.

mod api;
mod session;
mod static_assets;

pub use api::DashboardServer;
pub use session::{OutputUpdate, SessionRegistry};

use crate::{DashError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Dashboard configuration
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardConfig {
    pub port: u16,
    pub host: String,
    /// Launch records CSV, read once at startup
    pub data_path: PathBuf,
    /// Sessions without a connected stream are dropped after this long
    pub session_ttl_secs: u64,
    /// Per-session buffer of pending chart updates
    pub sse_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: 8050,
            host: "127.0.0.1".to_string(),
            data_path: PathBuf::from("spacex_launch_dash.csv"),
            session_ttl_secs: 1800,
            sse_capacity: 64,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            port: std::env::var("LAUNCH_DASH_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(default.port),
            host: std::env::var("LAUNCH_DASH_HOST")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(default.host),
            data_path: std::env::var("LAUNCH_DASH_DATA")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.data_path),
            session_ttl_secs: std::env::var("LAUNCH_DASH_SESSION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.session_ttl_secs),
            sse_capacity: default.sse_capacity,
        }
    }

    /// Env-driven defaults overlaid with an optional TOML file
    /// (path via LAUNCH_DASH_CONFIG or ./launch_dash.toml).
    pub fn load() -> Self {
        let path =
            std::env::var("LAUNCH_DASH_CONFIG").unwrap_or_else(|_| "launch_dash.toml".into());
        Self::from_env().overlay_file(Path::new(&path))
    }

    /// Overlay a TOML file; a missing or broken file leaves `self` unchanged
    pub fn overlay_file(self, path: &Path) -> Self {
        if !path.exists() {
            tracing::info!(target: "dashboard", path = %path.display(), "No TOML config found; using defaults/env");
            return self;
        }
        let fallback = self.clone();
        match fs::read_to_string(path) {
            Ok(s) => self.overlay_toml(&s).unwrap_or_else(|e| {
                tracing::warn!(target: "dashboard", error = %e, "Failed to parse TOML; keeping env/default config");
                fallback
            }),
            Err(e) => {
                tracing::warn!(target: "dashboard", error = %e, "Failed to read TOML; keeping env/default config");
                fallback
            }
        }
    }

    pub fn overlay_toml(self, source: &str) -> Result<Self> {
        let overlay: DashboardToml =
            toml::from_str(source).map_err(|e| DashError::Config(e.to_string()))?;
        Ok(overlay.apply(self))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DashboardToml {
    host: Option<String>,
    port: Option<u16>,
    data_path: Option<PathBuf>,
    session_ttl_secs: Option<u64>,
    sse_capacity: Option<usize>,
}

impl DashboardToml {
    fn apply(self, mut base: DashboardConfig) -> DashboardConfig {
        if let Some(v) = self.host {
            base.host = v;
        }
        if let Some(v) = self.port {
            base.port = v;
        }
        if let Some(v) = self.data_path {
            base.data_path = v;
        }
        if let Some(v) = self.session_ttl_secs {
            base.session_ttl_secs = v;
        }
        if let Some(v) = self.sse_capacity {
            base.sse_capacity = v.max(1);
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overlay_replaces_only_given_fields() {
        let cfg = DashboardConfig::default()
            .overlay_toml("port = 9000\ndata_path = \"data/launches.csv\"\n")
            .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.data_path, PathBuf::from("data/launches.csv"));
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.session_ttl_secs, 1800);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = DashboardConfig::default()
            .overlay_toml("port = \"not a number\"")
            .unwrap_err();
        assert!(matches!(err, DashError::Config(_)));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let cfg = DashboardConfig::default()
            .overlay_toml("sse_capacity = 0")
            .unwrap();
        assert_eq!(cfg.sse_capacity, 1);
    }
}
