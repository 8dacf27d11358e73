mod common;

use axum::body::to_bytes;
use axum::http::{header, StatusCode};
use common::{
    assert_ok, board, build_test_context, build_test_context_with, request_json, request_raw,
    FakeBoardSource, FakeGenerator,
};
use serde_json::json;

#[tokio::test]
async fn health_reports_version_and_trace_id() {
    let ctx = build_test_context().unwrap();
    let (status, body, trace_id) = request_json(&ctx.app, "GET", "/v1/health", None).await;
    assert_ok(status, &body);
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["data"]["agent_running"], false);

    let trace_id = trace_id.expect("trace id header");
    assert_eq!(trace_id.len(), 16);
    assert_eq!(body["trace_id"], trace_id);
}

#[tokio::test]
async fn boards_are_listed() {
    let ctx = build_test_context().unwrap();
    let (status, body, _) = request_json(&ctx.app, "GET", "/v1/boards", None).await;
    assert_ok(status, &body);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Engineering", "Marketing"]);
}

#[tokio::test]
async fn board_listing_failure_is_bad_gateway() {
    let ctx = build_test_context_with(
        FakeBoardSource {
            fail_list_boards: true,
            ..Default::default()
        },
        FakeGenerator::default(),
    )
    .unwrap();
    let (status, body, _) = request_json(&ctx.app, "GET", "/v1/boards", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["err_code"], 1502);
    // Upstream body stays out of the response
    assert!(!body["err_msg"].as_str().unwrap().contains("invalid token"));
}

#[tokio::test]
async fn report_lifecycle_over_http() {
    let ctx = build_test_context().unwrap();

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/reports",
        Some(json!({ "board_id": "B1", "report_type": "weekly" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["err_code"], 0);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(id, "B1_weekly_2024-03-04");
    assert_eq!(body["data"]["type"], "weekly");
    assert_eq!(body["data"]["board_name"], "Engineering");

    let (status, body, _) =
        request_json(&ctx.app, "GET", &format!("/v1/reports/{id}"), None).await;
    assert_ok(status, &body);
    assert_eq!(body["data"]["board_id"], "B1");

    let (status, body, _) =
        request_json(&ctx.app, "GET", "/v1/reports?board_id=B1", None).await;
    assert_ok(status, &body);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body, _) =
        request_json(&ctx.app, "GET", "/v1/reports?report_type=monthly", None).await;
    assert_ok(status, &body);
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body, _) =
        request_json(&ctx.app, "DELETE", &format!("/v1/reports/{id}"), None).await;
    assert_ok(status, &body);

    let (status, body, _) =
        request_json(&ctx.app, "GET", &format!("/v1/reports/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["err_code"], 1004);

    let (status, _, _) =
        request_json(&ctx.app, "DELETE", &format!("/v1/reports/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn report_requests_are_validated() {
    let ctx = build_test_context().unwrap();

    let (status, body, _) = request_json(&ctx.app, "GET", "/v1/reports", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["err_code"], 1001);

    let (status, _, _) =
        request_json(&ctx.app, "GET", "/v1/reports?report_type=daily", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/reports",
        Some(json!({ "report_type": "weekly" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["err_msg"], "board_id is required");

    let (status, _, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/reports",
        Some(json!({ "board_id": "B1", "report_type": "yearly" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/reports",
        Some(json!({ "board_id": "nope", "report_type": "weekly" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["err_msg"], "Board not found");
    assert_eq!(ctx.generator.calls(), 0);
}

#[tokio::test]
async fn generation_failure_is_bad_gateway() {
    let ctx = build_test_context_with(
        FakeBoardSource::with_boards(vec![board("B1", "Engineering")]),
        FakeGenerator {
            fail: true,
            ..Default::default()
        },
    )
    .unwrap();
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/reports",
        Some(json!({ "board_id": "B1", "report_type": "monthly" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["err_code"], 1502);
    assert!(ctx.state.agent.get_reports_by_board("B1").unwrap().is_empty());
}

#[tokio::test]
async fn report_renders_as_html_and_pdf() {
    let ctx = build_test_context().unwrap();
    let report = ctx
        .state
        .agent
        .generate_on_demand("B1", boardpulse_common::ReportType::Weekly)
        .await
        .unwrap();

    let resp = request_raw(&ctx.app, "GET", &format!("/v1/reports/{}/view", report.id), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let html = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8_lossy(&html);
    assert!(html.contains("<h2>Executive Summary</h2>"));
    assert!(html.contains(&format!("/v1/reports/{}/pdf", report.id)));

    let resp = request_raw(&ctx.app, "GET", &format!("/v1/reports/{}/pdf", report.id), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Engineering_weekly_report_2024-03-04.pdf\""
    );
    let pdf = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    let (status, body, _) = request_json(&ctx.app, "GET", "/v1/reports/missing/pdf", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["err_code"], 1004);
}

#[tokio::test]
async fn agent_lifecycle_over_http() {
    let ctx = build_test_context().unwrap();

    let (status, body, _) = request_json(&ctx.app, "GET", "/v1/agent", None).await;
    assert_ok(status, &body);
    assert_eq!(body["data"]["running"], false);
    assert_eq!(body["data"]["provider"], "fake");
    assert_eq!(body["data"]["tick_secs"], 3600);

    let (status, body, _) = request_json(&ctx.app, "POST", "/v1/agent/stop", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["err_code"], 1005);

    let (status, body, _) = request_json(&ctx.app, "POST", "/v1/agent/start", None).await;
    assert_ok(status, &body);
    assert_eq!(body["data"]["running"], true);

    let (status, _, _) = request_json(&ctx.app, "POST", "/v1/agent/start", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body, _) = request_json(&ctx.app, "POST", "/v1/agent/stop", None).await;
    assert_ok(status, &body);
    assert_eq!(body["data"]["running"], false);
}

#[tokio::test]
async fn chat_round_trip() {
    let ctx = build_test_context().unwrap();
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/chat",
        Some(json!({ "message": "What is overdue?" })),
    )
    .await;
    assert_ok(status, &body);
    assert_eq!(body["data"]["reply"], "echo: What is overdue?");

    let (status, body, _) =
        request_json(&ctx.app, "POST", "/v1/chat", Some(json!({ "message": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["err_code"], 1001);
}

#[tokio::test]
async fn openapi_documents_every_route() {
    let ctx = build_test_context().unwrap();
    let (status, spec, _) = request_json(&ctx.app, "GET", "/v1/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    for path in [
        "/v1/health",
        "/v1/boards",
        "/v1/reports",
        "/v1/reports/{id}",
        "/v1/reports/{id}/view",
        "/v1/reports/{id}/pdf",
        "/v1/agent",
        "/v1/agent/start",
        "/v1/agent/stop",
        "/v1/chat",
    ] {
        assert!(spec["paths"].get(path).is_some(), "missing path {path}");
    }

    let resp = request_raw(&ctx.app, "GET", "/v1/openapi.yaml", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let yaml = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&yaml).contains("/v1/reports/{id}/pdf"));
}
