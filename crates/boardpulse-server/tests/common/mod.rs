#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use boardpulse_ai::{GenerationError, NarrativeGenerator};
use boardpulse_board::{BoardApiError, BoardSource};
use boardpulse_common::{
    ActivityEvent, Board, BoardList, BoardSnapshot, Card, Member, ReportSchedule, ReportType,
};
use boardpulse_server::agent::{Clock, ReportAgent};
use boardpulse_server::app;
use boardpulse_server::config::ServerConfig;
use boardpulse_server::state::AppState;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt;

/// Monday, 2024-03-04 10:30 UTC
pub fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 10, 30, 0).unwrap()
}

pub fn fixed_clock(now: DateTime<Utc>) -> Clock {
    Arc::new(move || now)
}

pub fn board(id: &str, name: &str) -> Board {
    Board {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        url: format!("https://trello.com/b/{id}"),
        short_url: String::new(),
    }
}

/// In-memory board source with per-board failure injection.
#[derive(Default)]
pub struct FakeBoardSource {
    pub boards: Vec<Board>,
    /// Boards whose list fetch fails with an HTTP 500
    pub failing_boards: HashSet<String>,
    pub fail_list_boards: bool,
    pub fail_activity: bool,
    /// Latency added to every board details fetch
    pub delay: Option<Duration>,
    /// `since` argument of every activity fetch, by board
    pub activity_calls: Mutex<Vec<(String, Option<DateTime<Utc>>)>>,
}

impl FakeBoardSource {
    pub fn with_boards(boards: Vec<Board>) -> Self {
        Self {
            boards,
            ..Default::default()
        }
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self, board_id: &str) -> Self {
        self.failing_boards.insert(board_id.to_string());
        self
    }

    pub fn since_for(&self, board_id: &str) -> Option<DateTime<Utc>> {
        self.activity_calls
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == board_id)
            .and_then(|(_, since)| *since)
    }

    fn not_found(board_id: &str) -> BoardApiError {
        BoardApiError::HttpError {
            status: 404,
            body: format!("board {board_id} not found"),
        }
    }
}

#[async_trait]
impl BoardSource for FakeBoardSource {
    async fn list_boards(&self) -> boardpulse_board::error::Result<Vec<Board>> {
        if self.fail_list_boards {
            return Err(BoardApiError::HttpError {
                status: 401,
                body: "invalid token".to_string(),
            });
        }
        Ok(self.boards.clone())
    }

    async fn get_board_details(&self, board_id: &str) -> boardpulse_board::error::Result<Board> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.boards
            .iter()
            .find(|b| b.id == board_id)
            .cloned()
            .ok_or_else(|| Self::not_found(board_id))
    }

    async fn get_lists(&self, board_id: &str) -> boardpulse_board::error::Result<Vec<BoardList>> {
        if self.failing_boards.contains(board_id) {
            return Err(BoardApiError::HttpError {
                status: 500,
                body: "upstream exploded".to_string(),
            });
        }
        Ok(vec![BoardList {
            id: format!("{board_id}-todo"),
            name: "To Do".to_string(),
            closed: false,
            board_id: board_id.to_string(),
            pos: 1.0,
        }])
    }

    async fn get_cards(&self, _board_id: &str) -> boardpulse_board::error::Result<Vec<Card>> {
        Ok(vec![])
    }

    async fn get_board_members(
        &self,
        _board_id: &str,
    ) -> boardpulse_board::error::Result<Vec<Member>> {
        Ok(vec![])
    }

    async fn get_board_activity(
        &self,
        board_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> boardpulse_board::error::Result<Vec<ActivityEvent>> {
        self.activity_calls
            .lock()
            .unwrap()
            .push((board_id.to_string(), since));
        if self.fail_activity {
            return Err(BoardApiError::HttpError {
                status: 503,
                body: "busy".to_string(),
            });
        }
        Ok(vec![])
    }
}

/// Generator returning canned Markdown and counting calls.
#[derive(Default)]
pub struct FakeGenerator {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl FakeGenerator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NarrativeGenerator for FakeGenerator {
    fn provider(&self) -> &str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }

    async fn generate_narrative(
        &self,
        snapshot: &BoardSnapshot,
        report_type: ReportType,
    ) -> boardpulse_ai::error::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GenerationError::EmptyResponse {
                provider: "fake".to_string(),
            });
        }
        Ok(format!(
            "# {} {} report\n\n## Executive Summary\n\n{} lists tracked.",
            snapshot.board.name,
            report_type,
            snapshot.lists.len()
        ))
    }

    async fn send_simple_message(&self, text: &str) -> boardpulse_ai::error::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GenerationError::EmptyResponse {
                provider: "fake".to_string(),
            });
        }
        Ok(format!("echo: {text}"))
    }
}

pub fn build_agent(
    temp_dir: &TempDir,
    boards: Arc<FakeBoardSource>,
    generator: Arc<FakeGenerator>,
    schedule: ReportSchedule,
    tick: Duration,
    now: DateTime<Utc>,
) -> Result<Arc<ReportAgent>> {
    let agent = ReportAgent::new(
        boards,
        generator,
        temp_dir.path().join("reports"),
        schedule,
        tick,
    )?
    .with_clock(fixed_clock(now));
    Ok(Arc::new(agent))
}

pub struct TestContext {
    pub temp_dir: TempDir,
    pub boards: Arc<FakeBoardSource>,
    pub generator: Arc<FakeGenerator>,
    pub state: AppState,
    pub app: axum::Router,
}

pub fn build_test_context() -> Result<TestContext> {
    build_test_context_with(
        FakeBoardSource::with_boards(vec![board("B1", "Engineering"), board("B2", "Marketing")]),
        FakeGenerator::default(),
    )
}

pub fn build_test_context_with(
    boards: FakeBoardSource,
    generator: FakeGenerator,
) -> Result<TestContext> {
    let temp_dir = tempfile::tempdir()?;
    let boards = Arc::new(boards);
    let generator = Arc::new(generator);
    let agent = build_agent(
        &temp_dir,
        boards.clone(),
        generator.clone(),
        ReportSchedule::default(),
        Duration::from_secs(3600),
        monday(),
    )?;

    let config = ServerConfig {
        data_dir: temp_dir.path().to_string_lossy().to_string(),
        ..Default::default()
    };
    let state = AppState::new(agent, config);
    let app = app::build_http_app(state.clone());

    Ok(TestContext {
        temp_dir,
        boards,
        generator,
        state,
        app,
    })
}

pub async fn request_raw(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let req_body = match body {
        Some(body) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    let req = builder.body(req_body).expect("request should build");

    app.clone()
        .oneshot(req)
        .await
        .expect("request should be handled")
}

pub async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let resp = request_raw(app, method, uri, body).await;

    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

pub fn assert_ok(status: StatusCode, body: &Value) {
    assert!(status.is_success(), "unexpected status {status}: {body}");
    assert_eq!(body["err_code"], 0, "unexpected body: {body}");
}
