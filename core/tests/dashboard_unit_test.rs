//! Dashboard Unit Tests
//!
//! Unit tests for Dashboard components:
//! - SessionRegistry: per-session selection state, stream delivery, expiry
//! - DashboardConfig: Configuration management
//! - DashboardServer: router construction

use launch_dash_core::binder::{Binder, InputValue, OutputId};
use launch_dash_core::catalog::SiteSelection;
use launch_dash_core::dashboard::{DashboardConfig, DashboardServer, SessionRegistry};
use launch_dash_core::dataset::{Dataset, LaunchRecord, Outcome};
use launch_dash_core::figure::Trace;
use launch_dash_core::scatter::PayloadRange;
use launch_dash_core::DashError;
use std::path::PathBuf;
use std::sync::Arc;

fn dataset() -> Arc<Dataset> {
    Arc::new(Dataset::from_records(vec![
        LaunchRecord::new("SiteA", 500.0, Outcome::Success, "FT"),
        LaunchRecord::new("SiteA", 1500.0, Outcome::Failure, "B4"),
        LaunchRecord::new("SiteB", 2000.0, Outcome::Success, "FT"),
    ]))
}

fn registry(ttl_secs: u64) -> SessionRegistry {
    SessionRegistry::new(dataset(), Arc::new(Binder::standard()), 16, ttl_secs)
}

// =============================================================================
// SessionRegistry Tests
// =============================================================================

#[tokio::test]
async fn sessions_get_distinct_ids() {
    let sessions = registry(60);
    let a = sessions.create();
    let b = sessions.create();
    assert_ne!(a, b);
    assert_eq!(sessions.len(), 2);
}

#[tokio::test]
async fn session_ids_carry_random_suffix() {
    let sessions = registry(60);
    let a = sessions.create();
    let b = sessions.create();

    let suffix = |id: &str| id.rsplit('-').next().unwrap().to_string();
    assert_eq!(a.split('-').count(), 4);
    assert_eq!(suffix(&a).len(), 16);
    assert!(suffix(&a).chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(suffix(&a), suffix(&b));

    // the time/sequence prefix alone does not address a session
    let prefix = a.rsplit_once('-').unwrap().0;
    assert!(sessions.selection(prefix).await.is_err());
}

#[tokio::test]
async fn new_session_starts_from_initial_selection() {
    let sessions = registry(60);
    let id = sessions.create();
    let state = sessions.selection(&id).await.unwrap();
    assert_eq!(state.site, SiteSelection::All);
    assert_eq!(state.range, PayloadRange::new(500.0, 2000.0));
}

#[tokio::test]
async fn stream_starts_with_full_render() {
    let sessions = registry(60);
    let id = sessions.create();

    let (initial, _rx) = sessions.subscribe(&id).await.unwrap();
    assert_eq!(initial.len(), 2);
    assert_eq!(initial[0].target, OutputId::SuccessPie);
    assert_eq!(
        initial[0].figure.layout.title.text,
        "Total Successful Launches by Site"
    );
    assert_eq!(initial[1].target, OutputId::PayloadScatter);
    assert!(!initial[1].empty);
}

#[tokio::test]
async fn input_pushes_replacements_to_stream() {
    let sessions = registry(60);
    let id = sessions.create();
    let (_initial, mut rx) = sessions.subscribe(&id).await.unwrap();

    let replaced = sessions
        .apply_input(&id, InputValue::Site(SiteSelection::Site("SiteB".into())))
        .await
        .unwrap();
    assert_eq!(replaced, vec![OutputId::SuccessPie, OutputId::PayloadScatter]);

    let pie = rx.try_recv().expect("pie update should be pushed");
    assert_eq!(pie.target, OutputId::SuccessPie);
    assert_eq!(pie.figure.layout.title.text, "Success vs. Failure for SiteB");
    assert_eq!(
        pie.figure.data,
        vec![Trace::Pie {
            labels: vec!["Success".into(), "Failure".into()],
            values: vec![1, 0],
        }]
    );

    let scatter = rx.try_recv().expect("scatter update should be pushed");
    assert_eq!(scatter.target, OutputId::PayloadScatter);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn empty_selection_is_flagged() {
    let sessions = registry(60);
    let id = sessions.create();
    let (_initial, mut rx) = sessions.subscribe(&id).await.unwrap();

    sessions
        .apply_input(&id, InputValue::Range(PayloadRange::new(5000.0, 6000.0)))
        .await
        .unwrap();

    let update = rx.try_recv().unwrap();
    assert_eq!(update.target, OutputId::PayloadScatter);
    assert!(update.empty);
    assert!(update.figure.data.is_empty());
}

#[tokio::test]
async fn sessions_do_not_share_selection() {
    let sessions = registry(60);
    let a = sessions.create();
    let b = sessions.create();
    let (_, mut rx_b) = sessions.subscribe(&b).await.unwrap();

    sessions
        .apply_input(&a, InputValue::Site(SiteSelection::Site("SiteA".into())))
        .await
        .unwrap();

    assert_eq!(
        sessions.selection(&a).await.unwrap().site,
        SiteSelection::Site("SiteA".into())
    );
    assert_eq!(sessions.selection(&b).await.unwrap().site, SiteSelection::All);
    assert!(rx_b.try_recv().is_err(), "session b must not see a's updates");
}

#[tokio::test]
async fn unknown_session_is_rejected() {
    let sessions = registry(60);
    let err = sessions
        .apply_input("missing", InputValue::Site(SiteSelection::All))
        .await
        .unwrap_err();
    assert!(matches!(err, DashError::UnknownSession(id) if id == "missing"));
    assert!(sessions.subscribe("missing").await.is_err());
}

#[tokio::test]
async fn idle_sessions_expire_after_ttl() {
    let sessions = registry(1);
    let idle = sessions.create();
    let streaming = sessions.create();
    let (_, _rx) = sessions.subscribe(&streaming).await.unwrap();

    let now = chrono::Utc::now().timestamp_millis() as u64;
    assert_eq!(sessions.cleanup_at(now), 0);

    // past the TTL: only the session with a connected stream survives
    assert_eq!(sessions.cleanup_at(now + 5_000), 1);
    assert!(sessions.selection(&idle).await.is_err());
    assert!(sessions.selection(&streaming).await.is_ok());
}

#[tokio::test]
async fn removed_session_is_gone() {
    let sessions = registry(60);
    let id = sessions.create();
    assert!(sessions.remove(&id));
    assert!(!sessions.remove(&id));
    assert!(sessions.is_empty());
}

// =============================================================================
// DashboardConfig Tests
// =============================================================================

#[test]
fn config_defaults_match_local_dashboard() {
    let config = DashboardConfig::default();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8050);
    assert_eq!(config.data_path, PathBuf::from("spacex_launch_dash.csv"));
    assert_eq!(config.addr(), "127.0.0.1:8050");
}

#[test]
fn config_missing_toml_keeps_values() {
    let config = DashboardConfig::default().overlay_file(std::path::Path::new(
        "definitely/not/a/launch_dash.toml",
    ));
    assert_eq!(config, DashboardConfig::default());
}

#[test]
fn config_broken_toml_file_keeps_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, b"port = \"eighty\"\n").unwrap();

    let base = DashboardConfig {
        port: 9100,
        ..DashboardConfig::default()
    };
    let config = base.clone().overlay_file(file.path());
    assert_eq!(config, base);
}

#[test]
fn config_toml_file_overlays_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, b"host = \"0.0.0.0\"\nsession_ttl_secs = 60\n").unwrap();

    let config = DashboardConfig::default().overlay_file(file.path());
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.session_ttl_secs, 60);
    assert_eq!(config.port, 8050);
}

// =============================================================================
// DashboardServer Tests
// =============================================================================

#[tokio::test]
async fn server_bind_failure_is_io_error() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let config = DashboardConfig {
        port: taken.local_addr().unwrap().port(),
        ..DashboardConfig::default()
    };

    let err = DashboardServer::new(config, dataset())
        .serve_with_shutdown(async {})
        .await
        .unwrap_err();
    assert!(matches!(err, DashError::Io(_)));
}

#[tokio::test]
async fn server_exposes_shared_session_registry() {
    let server = DashboardServer::new(DashboardConfig::default(), dataset());
    let _router = server.router();

    let sessions = server.sessions();
    let id = sessions.create();
    assert_eq!(server.sessions().len(), 1);
    assert!(server.sessions().selection(&id).await.is_ok());
}
