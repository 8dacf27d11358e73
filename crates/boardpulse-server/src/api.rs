pub mod boards;
pub mod chat;

use crate::agent::AgentError;
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use boardpulse_board::BoardApiError;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Error envelope
#[derive(Serialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub err_code: i32,
    /// Error message
    pub err_msg: String,
    /// Request trace id
    pub trace_id: String,
}

/// Response envelope
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    /// 0 on success
    pub err_code: i32,
    /// "success" on success
    pub err_msg: String,
    pub trace_id: String,
    pub data: Option<T>,
}

pub fn success_response<T>(status: StatusCode, trace_id: &str, data: T) -> Response
where
    T: Serialize,
{
    (
        status,
        Json(ApiResponse {
            err_code: 0,
            err_msg: "success".to_string(),
            trace_id: trace_id.to_string(),
            data: Some(data),
        }),
    )
        .into_response()
}

pub fn success_empty_response(status: StatusCode, trace_id: &str, msg: &str) -> Response {
    (
        status,
        Json(ApiResponse::<Value> {
            err_code: 0,
            err_msg: msg.to_string(),
            trace_id: trace_id.to_string(),
            data: None,
        }),
    )
        .into_response()
}

fn to_custom_error_code(code: &str) -> i32 {
    match code {
        "bad_request" => 1001,
        "not_found" => 1004,
        "conflict" => 1005,
        "internal_error" => 1500,
        "storage_error" => 1501,
        "upstream_error" => 1502,
        _ => 1999,
    }
}

pub fn error_response(status: StatusCode, trace_id: &str, code: &str, msg: &str) -> Response {
    (
        status,
        Json(ApiResponse::<Value> {
            err_code: to_custom_error_code(code),
            err_msg: msg.to_string(),
            trace_id: trace_id.to_string(),
            data: None,
        }),
    )
        .into_response()
}

/// Map an agent failure onto the envelope.
///
/// Upstream bodies and file paths stay in the logs; clients get a generic message.
pub fn agent_error_response(trace_id: &str, err: AgentError) -> Response {
    match err {
        AgentError::AlreadyRunning | AgentError::NotRunning => {
            error_response(StatusCode::CONFLICT, trace_id, "conflict", &err.to_string())
        }
        AgentError::NotFound(_) => error_response(
            StatusCode::NOT_FOUND,
            trace_id,
            "not_found",
            "Report not found",
        ),
        AgentError::RemoteApi(BoardApiError::HttpError { status: 404, .. }) => error_response(
            StatusCode::NOT_FOUND,
            trace_id,
            "not_found",
            "Board not found",
        ),
        AgentError::RemoteApi(e) => {
            tracing::error!(trace_id = %trace_id, error = %e, "Board API request failed");
            error_response(
                StatusCode::BAD_GATEWAY,
                trace_id,
                "upstream_error",
                "Board service request failed",
            )
        }
        AgentError::Generation(e) => {
            tracing::error!(trace_id = %trace_id, error = %e, "Narrative generation failed");
            error_response(
                StatusCode::BAD_GATEWAY,
                trace_id,
                "upstream_error",
                "Narrative generation failed",
            )
        }
        AgentError::Storage(e) => {
            tracing::error!(trace_id = %trace_id, error = %e, "Report storage failure");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                trace_id,
                "storage_error",
                "Report storage failure",
            )
        }
        AgentError::Configuration(msg) => {
            tracing::error!(trace_id = %trace_id, error = %msg, "Agent misconfigured");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                trace_id,
                "internal_error",
                "Internal server error",
            )
        }
    }
}

/// Health check payload
#[derive(Serialize, ToSchema)]
struct HealthResponse {
    /// Server version
    version: String,
    /// Seconds since start
    uptime_secs: i64,
    /// Whether the scheduled agent loop is active
    agent_running: bool,
}

/// Server health.
#[utoipa::path(
    get,
    path = "/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server health", body = HealthResponse)
    )
)]
async fn health(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let uptime = (Utc::now() - state.start_time).num_seconds();
    success_response(
        StatusCode::OK,
        &trace_id,
        HealthResponse {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: uptime,
            agent_running: state.agent.is_running().await,
        },
    )
}

pub fn public_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health))
        .merge(boards::board_routes())
        .merge(chat::chat_routes())
}
