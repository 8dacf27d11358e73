use crate::agent::error::AgentError;
use boardpulse_ai::NarrativeGenerator;
use boardpulse_board::BoardSource;
use boardpulse_common::{Board, Report, ReportSchedule, ReportType};
use boardpulse_storage::ReportStore;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{self, MissedTickBehavior};
use utoipa::ToSchema;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

type Result<T> = std::result::Result<T, AgentError>;

struct Worker {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

enum WorkerState {
    Idle,
    Running(Worker),
    /// `stop` is waiting for the loop to exit
    Stopping(AbortHandle),
}

impl WorkerState {
    fn is_active(&self) -> bool {
        match self {
            WorkerState::Idle => false,
            WorkerState::Running(w) => !w.handle.is_finished(),
            WorkerState::Stopping(h) => !h.is_finished(),
        }
    }
}

/// Outcome of one due-check pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DueCheckSummary {
    /// Report types due on the checked day
    pub due: Vec<ReportType>,
    /// Ids of reports written
    pub generated: Vec<String>,
    /// Boards whose pipeline failed
    pub failed: usize,
    /// A stop request cut the pass short
    pub interrupted: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AgentStatus {
    pub running: bool,
    pub schedule: ReportSchedule,
    pub tick_secs: u64,
    pub provider: String,
    pub model: String,
}

/// Generates board reports on a daily due-check and on demand.
pub struct ReportAgent {
    boards: Arc<dyn BoardSource>,
    generator: Arc<dyn NarrativeGenerator>,
    store: Arc<ReportStore>,
    schedule: ReportSchedule,
    tick_interval: Duration,
    clock: Clock,
    worker: Mutex<WorkerState>,
}

impl ReportAgent {
    /// Build an agent storing reports under `storage_dir`.
    pub fn new(
        boards: Arc<dyn BoardSource>,
        generator: Arc<dyn NarrativeGenerator>,
        storage_dir: impl Into<PathBuf>,
        schedule: ReportSchedule,
        tick_interval: Duration,
    ) -> Result<Self> {
        let store = ReportStore::new(storage_dir)
            .map_err(|e| AgentError::Configuration(format!("report storage unavailable: {e}")))?;
        if tick_interval.is_zero() {
            return Err(AgentError::Configuration(
                "tick interval must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            boards,
            generator,
            store: Arc::new(store),
            schedule,
            tick_interval,
            clock: Arc::new(Utc::now),
            worker: Mutex::new(WorkerState::Idle),
        })
    }

    /// Replace the wall clock (used by tests to pin the date).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    pub fn schedule(&self) -> ReportSchedule {
        self.schedule
    }

    /// Spawn the background loop.
    pub async fn start(self: &Arc<Self>) -> Result<()> {
        let mut state = self.worker.lock().await;
        if state.is_active() {
            return Err(AgentError::AlreadyRunning);
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let agent = Arc::clone(self);
        let handle = tokio::spawn(async move { agent.run(stop_rx).await });
        *state = WorkerState::Running(Worker { stop_tx, handle });

        tracing::info!(
            weekly = self.schedule.weekly,
            monthly = self.schedule.monthly,
            tick_secs = self.tick_interval.as_secs(),
            "Report agent started"
        );
        Ok(())
    }

    /// Signal the loop and wait for it to exit.
    ///
    /// The lock is released while waiting; the agent reports as running
    /// (and refuses `start`) until the loop has exited.
    pub async fn stop(&self) -> Result<()> {
        let worker = {
            let mut state = self.worker.lock().await;
            match std::mem::replace(&mut *state, WorkerState::Idle) {
                WorkerState::Running(w) if !w.handle.is_finished() => {
                    *state = WorkerState::Stopping(w.handle.abort_handle());
                    w
                }
                stopping @ WorkerState::Stopping(_) => {
                    *state = stopping;
                    return Err(AgentError::NotRunning);
                }
                _ => return Err(AgentError::NotRunning),
            }
        };

        let _ = worker.stop_tx.send(true);
        if let Err(e) = worker.handle.await {
            tracing::error!(error = %e, "Report agent task ended abnormally");
        }

        let mut state = self.worker.lock().await;
        if matches!(*state, WorkerState::Stopping(_)) {
            *state = WorkerState::Idle;
        }
        tracing::info!("Report agent stopped");
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.worker.lock().await.is_active()
    }

    pub async fn status(&self) -> AgentStatus {
        AgentStatus {
            running: self.is_running().await,
            schedule: self.schedule,
            tick_secs: self.tick_interval.as_secs(),
            provider: self.generator.provider().to_string(),
            model: self.generator.model_name().to_string(),
        }
    }

    async fn run(&self, mut stop_rx: watch::Receiver<bool>) {
        let mut ticker = time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                // A closed channel means the agent handle is gone; stop as well
                _ = stop_rx.changed() => break,
                _ = ticker.tick() => {
                    let now = (self.clock)();
                    let summary = self.due_check(now, Some(&stop_rx)).await;
                    if !summary.due.is_empty() {
                        tracing::info!(
                            due = ?summary.due,
                            generated = summary.generated.len(),
                            failed = summary.failed,
                            interrupted = summary.interrupted,
                            "Scheduled report run finished"
                        );
                    }
                }
            }
        }
    }

    /// Generate every report due at `now` for every board.
    pub async fn run_due_check(&self, now: DateTime<Utc>) -> DueCheckSummary {
        self.due_check(now, None).await
    }

    async fn due_check(
        &self,
        now: DateTime<Utc>,
        stop_rx: Option<&watch::Receiver<bool>>,
    ) -> DueCheckSummary {
        let stopped = || stop_rx.is_some_and(|rx| *rx.borrow());
        let mut summary = DueCheckSummary {
            due: self.schedule.due_types(now.date_naive()),
            ..Default::default()
        };
        if summary.due.is_empty() {
            tracing::debug!(date = %now.date_naive(), "No reports due");
            return summary;
        }

        let end = Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN));

        for report_type in summary.due.clone() {
            if stopped() {
                summary.interrupted = true;
                break;
            }

            let boards = match self.boards.list_boards().await {
                Ok(boards) => boards,
                Err(e) => {
                    tracing::error!(
                        report_type = %report_type,
                        error = %e,
                        "Failed to list boards, skipping scheduled reports"
                    );
                    continue;
                }
            };

            for board in boards {
                if stopped() {
                    summary.interrupted = true;
                    break;
                }
                match self.generate(&board, report_type, end, now).await {
                    Ok(report) => {
                        tracing::info!(
                            board_id = %board.id,
                            report_id = %report.id,
                            "Scheduled report generated"
                        );
                        summary.generated.push(report.id);
                    }
                    Err(e) => {
                        tracing::error!(
                            board_id = %board.id,
                            report_type = %report_type,
                            error = %e,
                            "Failed to generate scheduled report"
                        );
                        summary.failed += 1;
                    }
                }
            }
        }

        summary
    }

    /// Snapshot, generate and persist one report for a board.
    async fn generate(
        &self,
        board: &Board,
        report_type: ReportType,
        end: DateTime<Utc>,
        generated_at: DateTime<Utc>,
    ) -> Result<Report> {
        let start = report_type.period_start(end);
        let snapshot = self.boards.get_board_snapshot(&board.id, Some(start)).await?;
        let content = self
            .generator
            .generate_narrative(&snapshot, report_type)
            .await?;

        let board_name = if snapshot.board.name.is_empty() {
            board.name.clone()
        } else {
            snapshot.board.name.clone()
        };
        let report = Report {
            id: Report::derive_id(&board.id, report_type, generated_at.date_naive()),
            board_id: board.id.clone(),
            board_name,
            report_type,
            content,
            generated_at,
            start_date: start,
            end_date: end,
        };
        self.store.save(&report)?;
        Ok(report)
    }

    /// Generate a report now, regardless of the schedule or running state.
    pub async fn generate_on_demand(
        &self,
        board_id: &str,
        report_type: ReportType,
    ) -> Result<Report> {
        let now = (self.clock)();
        let board = self.boards.get_board_details(board_id).await?;
        let report = self.generate(&board, report_type, now, now).await?;
        tracing::info!(
            board_id = %board_id,
            report_id = %report.id,
            "On-demand report generated"
        );
        Ok(report)
    }

    pub fn get_report(&self, id: &str) -> Result<Report> {
        Ok(self.store.get_by_id(id)?)
    }

    pub fn get_reports_by_board(&self, board_id: &str) -> Result<Vec<Report>> {
        Ok(self.store.get_by_board(board_id)?)
    }

    pub fn get_reports_by_type(&self, report_type: ReportType) -> Result<Vec<Report>> {
        Ok(self.store.get_by_type(report_type)?)
    }

    pub fn delete_report(&self, id: &str) -> Result<()> {
        Ok(self.store.delete(id)?)
    }

    pub async fn list_boards(&self) -> Result<Vec<Board>> {
        Ok(self.boards.list_boards().await?)
    }

    pub async fn chat(&self, text: &str) -> Result<String> {
        Ok(self.generator.send_simple_message(text).await?)
    }
}
