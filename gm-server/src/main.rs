//! REST shell for the AI game master.
//!
//! Two endpoints: `POST /api/message` plays a turn, `POST /api/reset`
//! wipes a campaign. CORS is fully open — a development-mode choice, not
//! a security boundary. Concurrent requests for the same campaign share
//! one cached session; requests for distinct campaigns proceed
//! independently.

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{routing::post, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gm_core::{CampaignStore, SessionStore};
use gm_gateway::{gateway_from_env, ModelGateway, Vendor};

use routes::{reset_campaign, send_message};

/// Shared state handed to every request handler.
pub struct AppState {
    /// Document store rooted in the working directory.
    pub documents: CampaignStore,
    /// Bounded cache of live sessions.
    pub sessions: SessionStore,
    /// The gateway, or the initialization error to report per request.
    pub gateway: Result<Arc<dyn ModelGateway>, String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gm_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting game master server");

    // A missing credential is not fatal here; it is reported in the
    // response body of every message request instead.
    let gateway = Vendor::from_env()
        .and_then(gateway_from_env)
        .map_err(|e| e.to_string());
    if let Err(ref e) = gateway {
        tracing::warn!(error = %e, "gateway unavailable; requests will report the init error");
    }

    let state = Arc::new(AppState {
        documents: CampaignStore::new("."),
        sessions: SessionStore::default(),
        gateway,
    });

    let app = Router::new()
        .route("/api/message", post(send_message))
        .route("/api/reset", post(reset_campaign))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = std::env::var("GM_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
        .parse()?;
    tracing::info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
