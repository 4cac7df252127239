//! HTTP bridge between the game server's packet pipeline and this service.
//!
//! The host posts each outbound chat packet and gets back the packet to send,
//! and posts join events to get the welcome message for new players.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::component::Component;
use crate::interceptor::ChatInterceptor;
use crate::onboarding::NewUserOnboarding;
use crate::packet::{ClientboundPacket, PacketEvent, Player};

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct AppState {
    pub interceptor: Arc<ChatInterceptor>,
    pub onboarding: Arc<NewUserOnboarding>,
    pub api_key: Option<Arc<str>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinResponse {
    pub welcome: Option<Component>,
}

/// Constant-time comparison, so the key cannot be probed through response timing
fn api_key_matches(expected: &str, provided: &str) -> bool {
    expected.len() == provided.len() && bool::from(expected.as_bytes().ct_eq(provided.as_bytes()))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), StatusCode> {
    let Some(expected) = &state.api_key else {
        return Ok(());
    };

    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if api_key_matches(expected, provided) {
        Ok(())
    } else {
        warn!("Rejected bridge request with missing or invalid API key");
        Err(StatusCode::UNAUTHORIZED)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/packets/outbound", post(outbound_packet))
        .route("/players/join", post(player_join))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn outbound_packet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<PacketEvent>,
) -> Result<Json<ClientboundPacket>, StatusCode> {
    authorize(&state, &headers)?;

    let action = state.interceptor.on_packet_sending(&event).await;
    Ok(Json(action.into_packet(event.packet)))
}

async fn player_join(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(player): Json<Player>,
) -> Result<Json<JoinResponse>, StatusCode> {
    authorize(&state, &headers)?;

    let welcome = match state.onboarding.on_player_join(&player).await {
        Ok(welcome) => welcome,
        Err(e) => {
            warn!("Join handling failed for {} ({}): {:#}", player.name, player.id, e);
            None
        }
    };

    Ok(Json(JoinResponse { welcome }))
}
