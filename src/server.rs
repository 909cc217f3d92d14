use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use signal_hook::consts::{SIGINT, SIGTERM};
use tokio::time::sleep;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::{cdx::CdxClient, types::SnapshotError};

pub struct AppState {
    pub cdx: CdxClient,
}

#[derive(Deserialize, Default)]
struct SnapshotsParams {
    url: Option<String>,
}

// API routes get the permissive CORS policy; the static fallback does not.
pub fn router(state: Arc<AppState>, public_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/snapshots", get(snapshots))
        .layer(cors)
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
}

pub async fn start(port: u16, public_dir: PathBuf, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state, &public_dir);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let should_terminate = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGTERM, Arc::clone(&should_terminate))?;
    signal_hook::flag::register(SIGINT, Arc::clone(&should_terminate))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("server running at http://localhost:{}/", port);
    info!("serving files from {:?}", public_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            while !should_terminate.load(Ordering::Relaxed) {
                sleep(Duration::from_millis(250)).await;
            }
            debug!("termination flag set, shutting down");
        })
        .await?;

    Ok(())
}

async fn snapshots(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SnapshotsParams>,
) -> (StatusCode, Json<Value>) {
    let target = params.url.unwrap_or_default();
    info!("fetching snapshots for: {}", target);

    match state.cdx.fetch_snapshots(&target).await {
        Ok(rows) => (StatusCode::OK, Json(json!(rows))),
        Err(e) => {
            error!("snapshot lookup failed: {}", e);
            let code = match e {
                SnapshotError::InvalidInput => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (code, Json(json!({ "error": e.to_string() })))
        }
    }
}
