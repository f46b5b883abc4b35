//! Serve command implementation.
//!
//! Prepares the shadow tree, watches the local plugin roots and serves the
//! overlay until interrupted.

use std::sync::Arc;

use console::style;
use miette::{IntoDiagnostic, Result, miette};
use overlay_engine::{Overlay, OverlayConfig};
use tokio::sync::mpsc;

use crate::output;
use crate::server;
use crate::watcher::{self, FileChange};

/// Capacity of the watcher-to-overlay channel.
const EVENT_BUFFER: usize = 256;

/// Runs the overlay server.
pub async fn execute(config: OverlayConfig, port: u16) -> Result<()> {
    let platform = config.platform;

    // The shadow tree must be complete before the first request is served
    let spinner = output::create_spinner("Preparing shadow tree...");
    let prepared = tokio::task::spawn_blocking(move || Overlay::prepare(config))
        .await
        .into_diagnostic()?;
    spinner.finish_and_clear();

    let overlay = Arc::new(prepared.map_err(|e| miette!("Failed to prepare overlay: {}", e))?);

    output::success(&format!(
        "Overlay ready for {}: {} local plugin(s), {} rule(s)",
        style(platform).cyan().bold(),
        overlay.plugins().len(),
        overlay.rules().count()
    ));
    output::key_value("Shadow", &overlay.shadow_root().display().to_string());
    output::key_value("Assets", &overlay.asset_dir().display().to_string());

    let roots = overlay.watch_roots();
    if roots.is_empty() {
        output::warning("No local plugins found, serving packaged assets only");
    }

    println!("\n{} Watching for changes...\n", style("👁").cyan());
    for root in &roots {
        output::list_item(&style(root.display()).dim().to_string());
    }
    println!();

    let (tx, rx) = mpsc::channel::<FileChange>(EVENT_BUFFER);
    let _watcher = watcher::watch(&roots, tx)?;

    tokio::spawn(process_changes(Arc::clone(&overlay), rx));

    output::info(&format!(
        "Serving on port {}, open http://<this-machine>:{}/index.html on the device",
        port, port
    ));

    let app = server::router(overlay.shadow_root(), overlay.asset_dir());
    server::serve(app, port).await
}

/// Applies changes one at a time, in arrival order.
async fn process_changes(overlay: Arc<Overlay>, mut rx: mpsc::Receiver<FileChange>) {
    while let Some(change) = rx.recv().await {
        if !overlay.should_watch(&change.path) {
            continue;
        }

        tracing::info!(path = %change.path.display(), "change {} detected", change.kind);

        let handler = Arc::clone(&overlay);
        let path = change.path.clone();
        let outcome =
            tokio::task::spawn_blocking(move || handler.handle_change(&change.path, change.kind))
                .await;

        match outcome {
            Ok(report) => {
                for destination in &report.applied {
                    tracing::debug!(shadow = %destination.display(), "shadow copy updated");
                }
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "change handler aborted");
            }
        }
    }
}
