use crate::node::{Node, NodeError};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ledger_core::{Block, BlockError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Deserialize)]
struct MineRequest {
    #[serde(default)]
    data: Value,
}

pub(crate) fn router(node: Arc<Node>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/blocks/head", get(head))
        .route("/blocks", post(submit_block))
        .route("/mine", post(mine))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(node)
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn head(State(node): State<Arc<Node>>) -> Json<Value> {
    Json(node.head().await.serialize())
}

async fn mine(
    State(node): State<Arc<Node>>,
    Json(req): Json<MineRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let block = node.mine(req.data).await?;
    Ok((StatusCode::CREATED, Json(block.serialize())))
}

/// A block received from a peer, in its serialized form.
async fn submit_block(
    State(node): State<Arc<Node>>,
    Json(record): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let candidate = Block::from_serialized(&record)?;
    let head = node.accept(candidate).await?;
    Ok((StatusCode::ACCEPTED, Json(head.serialize())))
}

pub(crate) struct ApiError(NodeError);

impl From<NodeError> for ApiError {
    fn from(err: NodeError) -> Self {
        Self(err)
    }
}

impl From<BlockError> for ApiError {
    fn from(err: BlockError) -> Self {
        Self(NodeError::Block(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason) = match &self.0 {
            NodeError::Block(e) => (status_for(e), e.reason()),
            NodeError::Preempted(_) => (StatusCode::CONFLICT, "preempted"),
            NodeError::Task(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        let body = json!({ "error": self.0.to_string(), "reason": reason });
        (status, Json(body)).into_response()
    }
}

fn status_for(err: &BlockError) -> StatusCode {
    match err {
        e if e.is_validation_failure() => StatusCode::UNPROCESSABLE_ENTITY,
        BlockError::MalformedBlock(_) => StatusCode::BAD_REQUEST,
        BlockError::MiningCancelled { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
