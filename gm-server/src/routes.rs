//! Request handlers and wire types for the REST surface.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use gm_core::{CampaignSeed, Character, GameSession, ResetOutcome, SessionConfig};

use crate::AppState;

/// Player message request.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// The player's input.
    pub input: String,
    /// Campaign identifier.
    #[serde(default = "default_campaign_name")]
    pub campaign_name: String,
    /// When true, `input` is a one-off prompt that is not stored in
    /// history.
    #[serde(default)]
    pub initial: bool,
}

fn default_campaign_name() -> String {
    "web_campaign".to_string()
}

/// Game-master reply, or an error string in the same field.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub response: String,
}

/// Campaign reset request.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub campaign_name: String,
}

/// Campaign reset outcome.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: String,
    pub detail: String,
}

/// Process a player message and return the game master's reply.
///
/// Errors never become HTTP failures: initialization and gateway problems
/// are reported in the response body so the web client can display them.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MessageRequest>,
) -> Json<MessageResponse> {
    let gateway = match &state.gateway {
        Ok(gateway) => Arc::clone(gateway),
        Err(e) => {
            return Json(MessageResponse {
                response: format!("DM INIT ERROR: {e}"),
            });
        }
    };

    let campaign_name = req.campaign_name.clone();
    let documents = state.documents.clone();
    let session = state
        .sessions
        .get_or_open(&req.campaign_name, move || {
            GameSession::open(
                documents,
                gateway,
                SessionConfig::new(&campaign_name),
                CampaignSeed::Random,
                "Adventurer",
                || Character::random("Adventurer"),
            )
        })
        .await;

    let session = match session {
        Ok(session) => session,
        Err(e) => {
            return Json(MessageResponse {
                response: format!("DM INIT ERROR: {e}"),
            });
        }
    };

    let mut session = session.lock().await;
    let result = if req.initial {
        session.initial_turn(&req.input).await
    } else {
        session.player_turn(&req.input).await
    };

    match result {
        Ok(reply) => Json(MessageResponse { response: reply }),
        Err(e) => {
            // The staged user turn was already discarded; report and move on.
            tracing::error!(campaign = %req.campaign_name, error = %e, "turn failed");
            Json(MessageResponse {
                response: format!("API Error: {e}"),
            })
        }
    }
}

/// Fully reset a campaign: evict the cached session, then delete the
/// campaign directory.
pub async fn reset_campaign(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetRequest>,
) -> Json<ResetResponse> {
    state.sessions.remove(&req.campaign_name).await;

    match state.documents.reset_campaign(&req.campaign_name).await {
        Ok(ResetOutcome::Deleted) => Json(ResetResponse {
            status: "success".to_string(),
            detail: format!(
                "Completely reset campaign: deleted {} and all contents.",
                state.documents.campaign_dir(&req.campaign_name).display()
            ),
        }),
        Ok(ResetOutcome::NothingToDelete) => Json(ResetResponse {
            status: "success".to_string(),
            detail: format!(
                "No folder found at {}, nothing to delete.",
                state.documents.campaign_dir(&req.campaign_name).display()
            ),
        }),
        Err(e) => Json(ResetResponse {
            status: "error".to_string(),
            detail: format!("Failed to delete campaign folder: {e}"),
        }),
    }
}
