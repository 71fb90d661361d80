//! Stint - headless running-activity tracker
//!
//! Loads configuration, marks the tracking surface visible and logs every
//! published snapshot until Ctrl-C.

use anyhow::Context;
use stint_api::utils::logging::init_tracing;
use stint_api::{current_snapshot, set_tracking_visible, AppContext};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let config = stint_infra::config::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => warn!(error = %e, "no .env file loaded"),
    }

    let ctx = AppContext::new(config).context("failed to initialise application context")?;
    let mut snapshots = ctx.tracking_service.subscribe();

    set_tracking_visible(&ctx, true).await?;
    let initial = current_snapshot(&ctx).await?;
    info!(sequence = initial.sequence, entries = initial.entries.len(), "stint running");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl-c received, shutting down");
                break;
            }
            snapshot = snapshots.recv() => match snapshot {
                Some(snapshot) => {
                    info!(
                        sequence = snapshot.sequence,
                        running = snapshot.running().count(),
                        available = snapshot.available().count(),
                        filters = snapshot.filters().count(),
                        "snapshot published"
                    );
                    if let Ok(json) = serde_json::to_string(&*snapshot) {
                        debug!(sequence = snapshot.sequence, %json, "snapshot contents");
                    }
                }
                None => break,
            },
        }
    }

    set_tracking_visible(&ctx, false).await?;
    ctx.shutdown().await?;
    Ok(())
}
