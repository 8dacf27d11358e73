pub mod pdf;
pub mod report_template;

pub use pdf::{pdf_file_name, PdfRenderer};
pub use report_template::{ReportPageParams, ReportRenderer};

/// `weekly` -> `Weekly`
pub(crate) fn type_title(kind: boardpulse_common::ReportType) -> &'static str {
    match kind {
        boardpulse_common::ReportType::Weekly => "Weekly",
        boardpulse_common::ReportType::Monthly => "Monthly",
    }
}
