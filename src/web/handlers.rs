//! Request Adaptor: thin translation between transport requests and
//! `ArtifactService` calls. Routing, JSON/query parsing, and the HTTP
//! framework itself are axum's job; everything state-machine-shaped lives
//! in `artifact::service`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::artifact::service::{GetArtifactReply, GetRequestContext};
use crate::artifact::{ArtifactJson, CreateArtifactInput, CreateArtifactReply};
use crate::error::ServiceError;

use super::state::AppState;

fn request_context(headers: &HeaderMap, remote_ip: Option<SocketAddr>) -> GetRequestContext {
    let skip_cache = headers
        .get("x-taskcluster-skip-cache")
        .and_then(|v| v.to_str().ok())
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1"))
        .unwrap_or(false);

    let forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    GetRequestContext {
        forwarded_for,
        remote_ip: remote_ip.map(|addr| addr.ip()),
        skip_cache,
    }
}

/// POST `/task/{taskId}/runs/{runId}/artifacts/{name...}`
pub async fn create_artifact(
    State(state): State<Arc<AppState>>,
    Path((task_id, run_id, name)): Path<(String, u32, String)>,
    Json(input): Json<CreateArtifactInput>,
) -> Result<Json<CreateArtifactReply>, ServiceError> {
    let reply = state
        .service
        .create_artifact(&task_id, run_id, &name, input)
        .await?;
    Ok(Json(reply))
}

/// GET `/task/{taskId}/runs/{runId}/artifacts/{name...}`
pub async fn get_artifact(
    State(state): State<Arc<AppState>>,
    Path((task_id, run_id, name)): Path<(String, u32, String)>,
    ConnectInfo(remote_ip): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Response, ServiceError> {
    let ctx = request_context(&headers, Some(remote_ip));
    let reply = state
        .service
        .get_artifact(&task_id, Some(run_id), &name, &ctx)
        .await?;
    Ok(get_reply_to_response(reply))
}

/// GET `/task/{taskId}/artifacts/{name...}`
pub async fn get_latest_artifact(
    State(state): State<Arc<AppState>>,
    Path((task_id, name)): Path<(String, String)>,
    ConnectInfo(remote_ip): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Response, ServiceError> {
    let ctx = request_context(&headers, Some(remote_ip));
    let reply = state
        .service
        .get_artifact(&task_id, None, &name, &ctx)
        .await?;
    Ok(get_reply_to_response(reply))
}

fn get_reply_to_response(reply: GetArtifactReply) -> Response {
    match reply {
        GetArtifactReply::Redirect(url) => {
            (StatusCode::SEE_OTHER, [(header::LOCATION, url)]).into_response()
        }
        GetArtifactReply::Error { message, reason } => (
            StatusCode::FORBIDDEN,
            Json(ErrorArtifactBody { reason, message }),
        )
            .into_response(),
    }
}

#[derive(Debug, Serialize)]
struct ErrorArtifactBody {
    reason: String,
    message: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "continuationToken")]
    pub continuation_token: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ListArtifactsResponse {
    pub artifacts: Vec<ArtifactJson>,
    #[serde(rename = "continuationToken", skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

/// GET `/task/{taskId}/runs/{runId}/artifacts`
pub async fn list_artifacts(
    State(state): State<Arc<AppState>>,
    Path((task_id, run_id)): Path<(String, u32)>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListArtifactsResponse>, ServiceError> {
    let reply = state
        .service
        .list_artifacts(&task_id, Some(run_id), query.continuation_token, query.limit)
        .await?;
    Ok(Json(ListArtifactsResponse {
        artifacts: reply.artifacts,
        continuation_token: reply.continuation_token,
    }))
}

/// GET `/task/{taskId}/artifacts`
pub async fn list_latest_artifacts(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListArtifactsResponse>, ServiceError> {
    let reply = state
        .service
        .list_artifacts(&task_id, None, query.continuation_token, query.limit)
        .await?;
    Ok(Json(ListArtifactsResponse {
        artifacts: reply.artifacts,
        continuation_token: reply.continuation_token,
    }))
}

/// Health check endpoint.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "artifact-core"
    }))
}
