use crate::api::{agent_error_response, error_response, success_response, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Deserialize, ToSchema)]
struct ChatRequest {
    /// Free-form question for the assistant
    message: String,
}

#[derive(Serialize, ToSchema)]
struct ChatResponse {
    reply: String,
}

/// Ask the assistant a question outside of any report.
#[utoipa::path(
    post,
    path = "/v1/chat",
    tag = "Chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Empty message", body = ApiError),
        (status = 502, description = "AI provider request failed", body = ApiError)
    )
)]
async fn chat(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    if req.message.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "bad_request",
            "message must not be empty",
        );
    }

    match state.agent.chat(&req.message).await {
        Ok(reply) => success_response(StatusCode::OK, &trace_id, ChatResponse { reply }),
        Err(e) => agent_error_response(&trace_id, e),
    }
}

pub fn chat_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(chat))
}
