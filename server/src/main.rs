use std::sync::Arc;

use launch_dash_core::dashboard::{DashboardConfig, DashboardServer};
use launch_dash_core::Dataset;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Logging / tracing
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,launch_dash_core=info,launch_dash=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    // Load configuration (defaults + env + optional TOML overlay)
    let config = DashboardConfig::load();

    // The dataset is loaded exactly once; any failure aborts startup
    let dataset = match Dataset::load(&config.data_path) {
        Ok(dataset) => Arc::new(dataset),
        Err(e) => {
            error!(
                target: "launch_dash",
                path = %config.data_path.display(),
                error = %e,
                "Failed to load launch records"
            );
            return Err(e.into());
        }
    };

    info!(
        target: "launch_dash",
        "Dashboard will be available at http://{}:{}",
        config.host,
        config.port
    );

    let dashboard = DashboardServer::new(config, dataset);
    dashboard
        .serve_with_shutdown(async {
            let _ = signal::ctrl_c().await;
            info!(target: "launch_dash", "Shutdown requested");
        })
        .await?;

    Ok(())
}
