use crate::error::{Result, StorageError};
use boardpulse_common::{Report, ReportType};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory of report JSON files.
#[derive(Debug, Clone)]
pub struct ReportStore {
    storage_path: PathBuf,
}

impl ReportStore {
    /// Open the store, creating the directory if it does not exist.
    pub fn new(storage_path: impl Into<PathBuf>) -> Result<Self> {
        let storage_path = storage_path.into();
        fs::create_dir_all(&storage_path).map_err(|source| StorageError::Io {
            path: storage_path.clone(),
            source,
        })?;
        Ok(Self { storage_path })
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// File name a report is stored under.
    pub fn file_name(report: &Report) -> String {
        format!(
            "{}_{}_{}.json",
            report.board_id,
            report.report_type,
            report.generated_day().format("%Y-%m-%d")
        )
    }

    /// Write `report`, replacing any report of the same board, type and day.
    pub fn save(&self, report: &Report) -> Result<PathBuf> {
        validate_key(&report.board_id)?;
        let path = self.storage_path.join(Self::file_name(report));
        let data = serde_json::to_vec_pretty(report)?;
        fs::write(&path, data).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(report_id = %report.id, path = %path.display(), "Report saved");
        Ok(path)
    }

    /// All reports of one board, ordered by file name.
    ///
    /// Any unreadable or malformed matching file fails the whole listing.
    pub fn get_by_board(&self, board_id: &str) -> Result<Vec<Report>> {
        let prefix = format!("{board_id}_");
        self.load_matching(|name| name.starts_with(&prefix))
    }

    /// All reports of one type, ordered by file name.
    pub fn get_by_type(&self, report_type: ReportType) -> Result<Vec<Report>> {
        let infix = format!("_{report_type}_");
        self.load_matching(|name| name.contains(&infix))
    }

    /// Find a report by its embedded id, skipping files that are not reports.
    pub fn get_by_id(&self, id: &str) -> Result<Report> {
        for path in self.entries()? {
            let Ok(data) = fs::read(&path) else {
                continue;
            };
            let Ok(report) = serde_json::from_slice::<Report>(&data) else {
                tracing::debug!(path = %path.display(), "Skipping non-report file");
                continue;
            };
            if report.id == id {
                return Ok(report);
            }
        }
        Err(StorageError::NotFound { id: id.to_string() })
    }

    /// Remove the file for `id`.
    ///
    /// An exact file-stem match wins; otherwise the first (by name) report
    /// file whose stem contains `id` is removed.
    pub fn delete(&self, id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(StorageError::NotFound { id: id.to_string() });
        }

        let candidates: Vec<PathBuf> = self
            .json_entries()?
            .into_iter()
            .filter(|p| stem(p).is_some_and(|s| s.contains(id)))
            .collect();

        let target = candidates
            .iter()
            .find(|p| stem(p) == Some(id))
            .or_else(|| candidates.first())
            .ok_or_else(|| StorageError::NotFound { id: id.to_string() })?;

        fs::remove_file(target).map_err(|source| StorageError::Io {
            path: target.clone(),
            source,
        })?;
        tracing::info!(report_id = %id, path = %target.display(), "Report deleted");
        Ok(())
    }

    fn load_matching(&self, matches: impl Fn(&str) -> bool) -> Result<Vec<Report>> {
        let mut reports = Vec::new();
        for path in self.json_entries()? {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !matches(name) {
                continue;
            }
            let data = fs::read(&path).map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
            let report = serde_json::from_slice(&data)
                .map_err(|source| StorageError::Parse { path: path.clone(), source })?;
            reports.push(report);
        }
        Ok(reports)
    }

    /// Regular files in the store, sorted by name.
    fn entries(&self) -> Result<Vec<PathBuf>> {
        let io_err = |source| StorageError::Io {
            path: self.storage_path.clone(),
            source,
        };
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.storage_path).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if entry.file_type().map_err(io_err)?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn json_entries(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|p| p.extension().is_some_and(|e| e == "json"))
            .collect())
    }
}

fn stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
