//! Headless host of the data layer: loads the configuration, then behaves
//! like a page navigation to the given route and reports what got loaded.

use warehouse_data::data::registry;
use warehouse_data::shared::config::load_config;
use warehouse_data::WarehouseData;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::Path::new("target").join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("warehouse_sync.log"))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,reqwest=warn,hyper=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    let config = load_config()?;
    let route = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());
    let data = WarehouseData::from_config(&config);

    let Some(report) = data.on_route_changed(&route).await else {
        tracing::warn!("No session id stored, sign in first");
        return Ok(());
    };

    for descriptor in registry::all() {
        let state = data.resource(descriptor.key);
        match (&state.error, state.loaded_at) {
            (Some(error), _) => {
                tracing::warn!("{:<20} {:>6} | {}", descriptor.key, state.data.len(), error)
            }
            (None, Some(_)) => tracing::info!("{:<20} {:>6}", descriptor.key, state.data.len()),
            (None, None) => tracing::debug!("{:<20} not loaded", descriptor.key),
        }
    }

    let summary = data.summary();
    tracing::info!(
        "Refresh {}: {} of {} collections loaded, {} failed",
        report.run_id,
        summary.loaded,
        summary.total,
        summary.failed
    );

    Ok(())
}
