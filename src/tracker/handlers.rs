use super::protocol::*;
use super::service::Tracker;
use crate::error::RingError;
use crate::transport::ErrorResponse;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;

pub fn router(tracker: Arc<Tracker>) -> Router {
    Router::new()
        .route(ENDPOINT_REGISTER, post(handle_register))
        .route(ENDPOINT_RANDOM_PEER, get(handle_random_peer))
        .route(ENDPOINT_PEERS, get(handle_peers))
        .layer(Extension(tracker))
}

async fn handle_register(
    Extension(tracker): Extension<Arc<Tracker>>,
    Json(req): Json<RegisterRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match tracker.register(req.peer).await {
        Ok(()) => Ok(StatusCode::OK),
        Err(e @ RingError::AlreadyRegistered(_)) => {
            tracing::warn!("Rejected registration: {}", e);
            Err((
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
        Err(e) => {
            tracing::error!("Failed to register {}: {}", req.peer, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

async fn handle_random_peer(
    Extension(tracker): Extension<Arc<Tracker>>,
) -> Json<RandomPeerResponse> {
    Json(RandomPeerResponse {
        peer: tracker.random_peer().await,
    })
}

async fn handle_peers(Extension(tracker): Extension<Arc<Tracker>>) -> Json<PeersResponse> {
    Json(PeersResponse {
        peers: tracker.peers().await,
    })
}
