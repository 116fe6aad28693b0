use super::protocol::*;
use super::service::PeerNode;
use crate::error::RingError;
use crate::transport::ErrorResponse;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;

type Rejection = (StatusCode, Json<ErrorResponse>);
type HandlerResult<T> = Result<T, Rejection>;

pub fn router(node: Arc<PeerNode>) -> Router {
    Router::new()
        .route(ENDPOINT_CREATE, post(handle_create))
        .route(ENDPOINT_JOIN, post(handle_join))
        .route(ENDPOINT_FIND_SUCCESSOR, post(handle_find_successor))
        .route(ENDPOINT_ID, get(handle_id))
        .route(
            ENDPOINT_PREDECESSOR,
            get(handle_get_predecessor).post(handle_set_predecessor),
        )
        .route(
            ENDPOINT_SUCCESSOR,
            get(handle_get_successor).post(handle_set_successor),
        )
        .route(ENDPOINT_STABILIZE, post(handle_stabilize))
        .route(ENDPOINT_NOTIFY, post(handle_notify))
        .route(ENDPOINT_PUT, post(handle_put))
        .route(ENDPOINT_GET, post(handle_get))
        .route(ENDPOINT_DESCRIBE, get(handle_describe))
        .route(ENDPOINT_DIE, post(handle_die))
        .layer(Extension(node))
}

/// Maps a failed operation to the status seen by the caller.
///
/// Only this peer being dead answers `410`; a dead peer further down a forwarded
/// call is a `502` so the caller does not take the relay for dead.
fn reject(node: &PeerNode, err: RingError) -> Rejection {
    let status = match &err {
        RingError::PeerGone(id) if *id == node.id() => StatusCode::GONE,
        RingError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
        RingError::PeerGone(_)
        | RingError::Http(_)
        | RingError::Remote { .. }
        | RingError::RingNotClosed { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status != StatusCode::GONE {
        tracing::error!("Peer {} failed to serve call: {}", node.id(), err);
    }

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

async fn handle_create(Extension(node): Extension<Arc<PeerNode>>) -> HandlerResult<StatusCode> {
    node.create().await.map_err(|e| reject(&node, e))?;
    Ok(StatusCode::OK)
}

async fn handle_join(
    Extension(node): Extension<Arc<PeerNode>>,
    Json(req): Json<JoinRequest>,
) -> HandlerResult<StatusCode> {
    node.join(&req.landmark).await.map_err(|e| reject(&node, e))?;
    Ok(StatusCode::OK)
}

async fn handle_find_successor(
    Extension(node): Extension<Arc<PeerNode>>,
    Json(req): Json<FindSuccessorRequest>,
) -> HandlerResult<Json<PeerMessage>> {
    let peer = node
        .find_successor(req.id)
        .await
        .map_err(|e| reject(&node, e))?;
    Ok(Json(PeerMessage { peer }))
}

async fn handle_id(Extension(node): Extension<Arc<PeerNode>>) -> HandlerResult<Json<IdResponse>> {
    if !node.is_alive() {
        return Err(reject(&node, RingError::PeerGone(node.id())));
    }
    Ok(Json(IdResponse { id: node.id() }))
}

async fn handle_get_predecessor(
    Extension(node): Extension<Arc<PeerNode>>,
) -> HandlerResult<Json<PredecessorMessage>> {
    let peer = node.predecessor().await.map_err(|e| reject(&node, e))?;
    Ok(Json(PredecessorMessage { peer }))
}

async fn handle_set_predecessor(
    Extension(node): Extension<Arc<PeerNode>>,
    Json(req): Json<PredecessorMessage>,
) -> HandlerResult<StatusCode> {
    node.set_predecessor(req.peer)
        .await
        .map_err(|e| reject(&node, e))?;
    Ok(StatusCode::OK)
}

async fn handle_get_successor(
    Extension(node): Extension<Arc<PeerNode>>,
) -> HandlerResult<Json<PeerMessage>> {
    let peer = node.successor().await.map_err(|e| reject(&node, e))?;
    Ok(Json(PeerMessage { peer }))
}

async fn handle_set_successor(
    Extension(node): Extension<Arc<PeerNode>>,
    Json(req): Json<PeerMessage>,
) -> HandlerResult<StatusCode> {
    node.set_successor(req.peer)
        .await
        .map_err(|e| reject(&node, e))?;
    Ok(StatusCode::OK)
}

async fn handle_stabilize(Extension(node): Extension<Arc<PeerNode>>) -> HandlerResult<StatusCode> {
    node.stabilize().await.map_err(|e| reject(&node, e))?;
    Ok(StatusCode::OK)
}

async fn handle_notify(
    Extension(node): Extension<Arc<PeerNode>>,
    Json(req): Json<PeerMessage>,
) -> HandlerResult<StatusCode> {
    node.notify(req.peer).await.map_err(|e| reject(&node, e))?;
    Ok(StatusCode::OK)
}

async fn handle_put(
    Extension(node): Extension<Arc<PeerNode>>,
    Json(req): Json<PutRequest>,
) -> HandlerResult<StatusCode> {
    node.put(req.restaurant, req.daily_special)
        .map_err(|e| reject(&node, e))?;
    Ok(StatusCode::OK)
}

async fn handle_get(
    Extension(node): Extension<Arc<PeerNode>>,
    Json(req): Json<GetRequest>,
) -> HandlerResult<(StatusCode, Json<GetResponse>)> {
    match node.get(&req.restaurant).map_err(|e| reject(&node, e))? {
        Some(daily_special) => Ok((
            StatusCode::OK,
            Json(GetResponse {
                daily_special: Some(daily_special),
            }),
        )),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(GetResponse {
                daily_special: None,
            }),
        )),
    }
}

async fn handle_describe(
    Extension(node): Extension<Arc<PeerNode>>,
) -> HandlerResult<Json<DescribeResponse>> {
    let description = node.describe().await.map_err(|e| reject(&node, e))?;
    Ok(Json(DescribeResponse { description }))
}

async fn handle_die(Extension(node): Extension<Arc<PeerNode>>) -> HandlerResult<StatusCode> {
    if !node.is_alive() {
        return Err(reject(&node, RingError::PeerGone(node.id())));
    }
    node.die().await;
    Ok(StatusCode::OK)
}
