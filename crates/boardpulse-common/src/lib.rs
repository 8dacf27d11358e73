pub mod board;
pub mod types;

pub use board::{ActivityEvent, ActivityMember, Board, BoardList, BoardSnapshot, Card, Label, Member};
pub use types::{ParseReportTypeError, Report, ReportSchedule, ReportType};

/// Upper bound on activity events carried by a [`BoardSnapshot`].
pub const MAX_SNAPSHOT_ACTIVITIES: usize = 20;
