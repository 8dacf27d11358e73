use crate::api::{agent_error_response, success_response, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use boardpulse_common::Board;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Boards visible to the configured Trello account.
#[utoipa::path(
    get,
    path = "/v1/boards",
    tag = "Boards",
    responses(
        (status = 200, description = "Accessible boards", body = Vec<Board>),
        (status = 502, description = "Trello request failed", body = ApiError)
    )
)]
async fn list_boards(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.agent.list_boards().await {
        Ok(boards) => success_response(StatusCode::OK, &trace_id, boards),
        Err(e) => agent_error_response(&trace_id, e),
    }
}

pub fn board_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(list_boards))
}
