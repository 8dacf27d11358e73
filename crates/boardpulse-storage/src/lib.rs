//! Flat-file report storage.
//!
//! Each report is one pretty-printed JSON file named
//! `{board_id}_{type}_{YYYY-MM-DD}.json`; the file name doubles as the index
//! for board and type listings.

pub mod error;
pub mod report_store;


pub use error::StorageError;
pub use report_store::ReportStore;
