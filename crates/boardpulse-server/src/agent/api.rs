use axum::{
    extract::{Extension, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use boardpulse_common::{Report, ReportType};
use boardpulse_render::{pdf_file_name, PdfRenderer, ReportPageParams, ReportRenderer};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::agent::AgentStatus;
use crate::api::{
    agent_error_response, error_response, success_empty_response, success_response, ApiError,
};
use crate::logging::TraceId;
use crate::state::AppState;

pub fn report_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_reports, generate_report))
        .routes(routes!(get_report, delete_report))
        .routes(routes!(view_report_html))
        .routes(routes!(download_report_pdf))
}

pub fn agent_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(agent_status))
        .routes(routes!(start_agent))
        .routes(routes!(stop_agent))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListReportsQuery {
    /// Reports for one board
    #[param(required = false)]
    pub board_id: Option<String>,
    /// Reports of one type (weekly, monthly)
    #[param(required = false)]
    pub report_type: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateReportRequest {
    pub board_id: Option<String>,
    /// weekly or monthly
    pub report_type: Option<String>,
}

fn parse_type(raw: &str) -> Result<ReportType, String> {
    raw.parse::<ReportType>().map_err(|e| e.to_string())
}

/// List stored reports by board or by type.
/// At least one of `board_id` and `report_type` is required; both narrow the board listing by type.
#[utoipa::path(
    get,
    path = "/v1/reports",
    tag = "Reports",
    params(ListReportsQuery),
    responses(
        (status = 200, description = "Stored reports", body = Vec<Report>),
        (status = 400, description = "Missing or invalid filter", body = ApiError),
        (status = 500, description = "Report storage failure", body = ApiError)
    )
)]
async fn list_reports(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(query): Query<ListReportsQuery>,
) -> impl IntoResponse {
    let board_id = query.board_id.filter(|b| !b.trim().is_empty());
    let report_type = match query.report_type.as_deref().map(parse_type).transpose() {
        Ok(t) => t,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &trace_id, "bad_request", &msg),
    };

    let result = match (board_id, report_type) {
        (Some(board_id), kind) => state.agent.get_reports_by_board(&board_id).map(|reports| {
            reports
                .into_iter()
                .filter(|r| kind.map_or(true, |k| r.report_type == k))
                .collect::<Vec<_>>()
        }),
        (None, Some(kind)) => state.agent.get_reports_by_type(kind),
        (None, None) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &trace_id,
                "bad_request",
                "board_id or report_type is required",
            )
        }
    };

    match result {
        Ok(reports) => success_response(StatusCode::OK, &trace_id, reports),
        Err(e) => agent_error_response(&trace_id, e),
    }
}

/// Generate a report immediately, whether or not the scheduled agent is running.
#[utoipa::path(
    post,
    path = "/v1/reports",
    tag = "Reports",
    request_body = GenerateReportRequest,
    responses(
        (status = 201, description = "Generated report", body = Report),
        (status = 400, description = "Missing board id or invalid report type", body = ApiError),
        (status = 404, description = "Board not found", body = ApiError),
        (status = 502, description = "Trello or AI provider request failed", body = ApiError)
    )
)]
async fn generate_report(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<GenerateReportRequest>,
) -> impl IntoResponse {
    let Some(board_id) = req.board_id.filter(|b| !b.trim().is_empty()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "bad_request",
            "board_id is required",
        );
    };
    let report_type = match req.report_type.as_deref().map(parse_type) {
        Some(Ok(t)) => t,
        Some(Err(msg)) => {
            return error_response(StatusCode::BAD_REQUEST, &trace_id, "bad_request", &msg)
        }
        None => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &trace_id,
                "bad_request",
                "report_type is required",
            )
        }
    };

    match state.agent.generate_on_demand(&board_id, report_type).await {
        Ok(report) => success_response(StatusCode::CREATED, &trace_id, report),
        Err(e) => agent_error_response(&trace_id, e),
    }
}

#[utoipa::path(
    get,
    path = "/v1/reports/{id}",
    tag = "Reports",
    params(
        ("id" = String, Path, description = "Report id")
    ),
    responses(
        (status = 200, description = "Report", body = Report),
        (status = 404, description = "Report not found", body = ApiError)
    )
)]
async fn get_report(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.agent.get_report(&id) {
        Ok(report) => success_response(StatusCode::OK, &trace_id, report),
        Err(e) => agent_error_response(&trace_id, e),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/reports/{id}",
    tag = "Reports",
    params(
        ("id" = String, Path, description = "Report id")
    ),
    responses(
        (status = 200, description = "Report deleted"),
        (status = 404, description = "Report not found", body = ApiError)
    )
)]
async fn delete_report(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.agent.delete_report(&id) {
        Ok(()) => {
            tracing::info!(report_id = %id, "Report deleted");
            success_empty_response(StatusCode::OK, &trace_id, "Report deleted")
        }
        Err(e) => agent_error_response(&trace_id, e),
    }
}

/// Render a report as a standalone HTML page for the browser.
#[utoipa::path(
    get,
    path = "/v1/reports/{id}/view",
    tag = "Reports",
    params(
        ("id" = String, Path, description = "Report id")
    ),
    responses(
        (status = 200, description = "HTML report page", content_type = "text/html"),
        (status = 404, description = "Report not found", body = ApiError)
    )
)]
async fn view_report_html(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let report = match state.agent.get_report(&id) {
        Ok(report) => report,
        Err(e) => return agent_error_response(&trace_id, e),
    };

    let pdf_url = format!("/v1/reports/{}/pdf", report.id);
    let json_url = format!("/v1/reports/{}", report.id);
    Html(ReportRenderer::render_report(&ReportPageParams {
        report: &report,
        pdf_url: &pdf_url,
        json_url: &json_url,
    }))
    .into_response()
}

#[utoipa::path(
    get,
    path = "/v1/reports/{id}/pdf",
    tag = "Reports",
    params(
        ("id" = String, Path, description = "Report id")
    ),
    responses(
        (status = 200, description = "PDF attachment", content_type = "application/pdf"),
        (status = 404, description = "Report not found", body = ApiError)
    )
)]
async fn download_report_pdf(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let report = match state.agent.get_report(&id) {
        Ok(report) => report,
        Err(e) => return agent_error_response(&trace_id, e),
    };

    let bytes = match PdfRenderer::render(&report) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(report_id = %report.id, error = %e, "PDF rendering failed");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "internal_error",
                "Failed to render PDF",
            );
        }
    };

    let disposition = format!("attachment; filename=\"{}\"", pdf_file_name(&report));
    let mut response = (StatusCode::OK, bytes).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

#[utoipa::path(
    get,
    path = "/v1/agent",
    tag = "Agent",
    responses(
        (status = 200, description = "Agent status", body = AgentStatus)
    )
)]
async fn agent_status(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    success_response(StatusCode::OK, &trace_id, state.agent.status().await)
}

#[utoipa::path(
    post,
    path = "/v1/agent/start",
    tag = "Agent",
    responses(
        (status = 200, description = "Agent started", body = AgentStatus),
        (status = 409, description = "Agent already running", body = ApiError)
    )
)]
async fn start_agent(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.agent.start().await {
        Ok(()) => success_response(StatusCode::OK, &trace_id, state.agent.status().await),
        Err(e) => agent_error_response(&trace_id, e),
    }
}

#[utoipa::path(
    post,
    path = "/v1/agent/stop",
    tag = "Agent",
    responses(
        (status = 200, description = "Agent stopped", body = AgentStatus),
        (status = 409, description = "Agent not running", body = ApiError)
    )
)]
async fn stop_agent(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.agent.stop().await {
        Ok(()) => success_response(StatusCode::OK, &trace_id, state.agent.status().await),
        Err(e) => agent_error_response(&trace_id, e),
    }
}
