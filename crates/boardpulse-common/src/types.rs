use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Report cadence. Picks the date window, the system prompt and the token budget.
///
/// # Examples
///
/// ```
/// use boardpulse_common::types::ReportType;
///
/// let kind: ReportType = "Weekly".parse().unwrap();
/// assert_eq!(kind, ReportType::Weekly);
/// assert_eq!(kind.to_string(), "weekly");
/// assert!("daily".parse::<ReportType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Weekly,
    Monthly,
}

impl ReportType {
    pub const ALL: [ReportType; 2] = [ReportType::Weekly, ReportType::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Start of the reporting window that ends at `end`.
    ///
    /// Weekly windows span seven days. Monthly windows go back one calendar
    /// month, clamping to the last day of a shorter month.
    pub fn period_start(&self, end: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Weekly => end - Duration::days(7),
            Self::Monthly => end
                .checked_sub_months(Months::new(1))
                .unwrap_or_else(|| end - Duration::days(30)),
        }
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid report type '{0}', expected 'weekly' or 'monthly'")]
pub struct ParseReportTypeError(pub String);

impl std::str::FromStr for ReportType {
    type Err = ParseReportTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(ParseReportTypeError(s.to_string())),
        }
    }
}

/// A generated board status report as persisted on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Report {
    /// `{board_id}_{type}_{YYYY-MM-DD}`
    pub id: String,
    pub board_id: String,
    /// Board name at generation time
    pub board_name: String,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    /// Markdown narrative
    pub content: String,
    pub generated_at: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl Report {
    /// Deterministic report identifier with whole-day granularity.
    ///
    /// # Examples
    ///
    /// ```
    /// use boardpulse_common::types::{Report, ReportType};
    /// use chrono::NaiveDate;
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    /// assert_eq!(Report::derive_id("b1", ReportType::Weekly, day), "b1_weekly_2024-03-04");
    /// ```
    pub fn derive_id(board_id: &str, report_type: ReportType, day: NaiveDate) -> String {
        format!("{}_{}_{}", board_id, report_type, day.format("%Y-%m-%d"))
    }

    /// Calendar day (UTC) the report was generated on.
    pub fn generated_day(&self) -> NaiveDate {
        self.generated_at.date_naive()
    }
}

/// Which report cadences the scheduled agent produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportSchedule {
    pub weekly: bool,
    pub monthly: bool,
}

impl Default for ReportSchedule {
    fn default() -> Self {
        Self {
            weekly: true,
            monthly: true,
        }
    }
}

impl ReportSchedule {
    /// Report types due on `day`: weekly on Mondays, monthly on the 1st.
    ///
    /// # Examples
    ///
    /// ```
    /// use boardpulse_common::types::{ReportSchedule, ReportType};
    /// use chrono::NaiveDate;
    ///
    /// let schedule = ReportSchedule { weekly: true, monthly: true };
    /// // 2024-04-01 is a Monday and the first of the month
    /// let day = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    /// assert_eq!(schedule.due_types(day), vec![ReportType::Weekly, ReportType::Monthly]);
    /// ```
    pub fn due_types(&self, day: NaiveDate) -> Vec<ReportType> {
        let mut due = Vec::new();
        if self.weekly && day.weekday() == Weekday::Mon {
            due.push(ReportType::Weekly);
        }
        if self.monthly && day.day() == 1 {
            due.push(ReportType::Monthly);
        }
        due
    }
}
