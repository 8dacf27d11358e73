pub mod api;
pub mod error;
pub mod scheduler;

pub use error::AgentError;
pub use scheduler::{AgentStatus, Clock, DueCheckSummary, ReportAgent};
