//! Two-tier static file server.
//!
//! A request is answered from the shadow tree when the file exists there and
//! from the packaged asset directory otherwise.

use std::net::SocketAddr;
use std::path::Path;

use axum::Router;
use miette::{Result, miette};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Builds the router serving `shadow_root` over `asset_dir`.
pub fn router(shadow_root: &Path, asset_dir: &Path) -> Router {
    let packaged = ServeDir::new(asset_dir);
    let overlay = ServeDir::new(shadow_root).fallback(packaged);

    Router::new()
        .fallback_service(overlay)
        .layer(TraceLayer::new_for_http())
}

/// Binds on every interface, so a device on the local network can connect,
/// and serves until ctrl-c.
pub async fn serve(router: Router, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| miette!("Failed to bind port {}: {}", port, e))?;

    tracing::info!(%addr, "server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| miette!("Server error: {}", e))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use std::fs;
    use tempfile::tempdir;
    use tower::ServiceExt;

    async fn get(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_shadow_tree_takes_precedence() {
        let dir = tempdir().unwrap();
        let shadow = dir.path().join("shadow");
        let assets = dir.path().join("www");
        fs::create_dir_all(shadow.join("plugins/my-plugin/www")).unwrap();
        fs::create_dir_all(assets.join("plugins/my-plugin/www")).unwrap();
        fs::write(shadow.join("plugins/my-plugin/www/module.js"), "live").unwrap();
        fs::write(assets.join("plugins/my-plugin/www/module.js"), "packaged").unwrap();
        fs::write(assets.join("index.html"), "<html></html>").unwrap();

        let app = router(&shadow, &assets);

        let (status, body) = get(app.clone(), "/plugins/my-plugin/www/module.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "live");

        let (status, body) = get(app.clone(), "/index.html").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<html></html>");

        let (status, _) = get(app, "/missing.js").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
