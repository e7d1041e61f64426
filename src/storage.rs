//! Record persistence: an ordered store interface plus in-memory and
//! on-disk (one JSON file per report) implementations.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::model::Report;

/// Ordered record store behind the ledger.
///
/// Every write is all-or-nothing: if `insert` or `update` returns an error,
/// reads observe exactly the state from before the call. Callers serialize
/// writers; implementations need not lock internally.
pub trait ReportStore: Send + Sync {
    /// Record with the highest id.
    fn latest(&self) -> Result<Option<Report>, StorageError>;

    fn get(&self, id: u64) -> Result<Option<Report>, StorageError>;

    /// All records, ascending by id.
    fn all(&self) -> Result<Vec<Report>, StorageError>;

    fn len(&self) -> Result<usize, StorageError>;

    /// Records as currently held by the backing medium, ascending by id.
    /// Stores that cache records override this to read past the cache.
    fn snapshot(&self) -> Result<Vec<Report>, StorageError> {
        self.all()
    }

    /// Commit a new record. Its id must exceed every stored id.
    fn insert(&mut self, report: &Report) -> Result<(), StorageError>;

    /// Replace a stored record with the same id.
    fn update(&mut self, report: &Report) -> Result<(), StorageError>;
}

/// Volatile store, used for tests and `memory` deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    reports: Vec<Report>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportStore for MemoryStore {
    fn latest(&self) -> Result<Option<Report>, StorageError> {
        Ok(self.reports.last().cloned())
    }

    fn get(&self, id: u64) -> Result<Option<Report>, StorageError> {
        Ok(find(&self.reports, id).map(|i| self.reports[i].clone()))
    }

    fn all(&self) -> Result<Vec<Report>, StorageError> {
        Ok(self.reports.clone())
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.reports.len())
    }

    fn insert(&mut self, report: &Report) -> Result<(), StorageError> {
        check_next_id(&self.reports, report.id)?;
        self.reports.push(report.clone());
        Ok(())
    }

    fn update(&mut self, report: &Report) -> Result<(), StorageError> {
        let idx = find(&self.reports, report.id).ok_or_else(|| missing(report.id))?;
        self.reports[idx] = report.clone();
        Ok(())
    }
}

/// Durable store: `report_<id>.json` per record, plus an in-memory index
/// loaded at open time. [`ReportStore::snapshot`] rereads the directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    reports: Vec<Report>,
}

impl FileStore {
    /// Open (creating if needed) a store directory and load every record.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        let reports = load_reports(&dir)?;
        Ok(FileStore { dir, reports })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, report: &Report) -> Result<(), StorageError> {
        save_report(&self.dir, report)
    }
}

impl ReportStore for FileStore {
    fn latest(&self) -> Result<Option<Report>, StorageError> {
        Ok(self.reports.last().cloned())
    }

    fn get(&self, id: u64) -> Result<Option<Report>, StorageError> {
        Ok(find(&self.reports, id).map(|i| self.reports[i].clone()))
    }

    fn all(&self) -> Result<Vec<Report>, StorageError> {
        Ok(self.reports.clone())
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.reports.len())
    }

    fn snapshot(&self) -> Result<Vec<Report>, StorageError> {
        load_reports(&self.dir)
    }

    fn insert(&mut self, report: &Report) -> Result<(), StorageError> {
        check_next_id(&self.reports, report.id)?;
        self.write(report)?;
        self.reports.push(report.clone());
        Ok(())
    }

    fn update(&mut self, report: &Report) -> Result<(), StorageError> {
        let idx = find(&self.reports, report.id).ok_or_else(|| missing(report.id))?;
        self.write(report)?;
        self.reports[idx] = report.clone();
        Ok(())
    }
}

fn find(reports: &[Report], id: u64) -> Option<usize> {
    reports.binary_search_by_key(&id, |r| r.id).ok()
}

fn check_next_id(reports: &[Report], id: u64) -> Result<(), StorageError> {
    match reports.last() {
        Some(last) if id <= last.id => Err(StorageError::Unavailable(format!(
            "id {id} is not above latest id {}",
            last.id
        ))),
        _ => Ok(()),
    }
}

fn missing(id: u64) -> StorageError {
    StorageError::Unavailable(format!("no stored report with id {id}"))
}

/// Ensure that the given directory exists (create recursively if needed).
pub fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Compute the JSON filename for a report id.
pub fn report_path(dir: &Path, id: u64) -> PathBuf {
    dir.join(format!("report_{id}.json"))
}

/// Write a report as `report_<id>.json` (pretty-printed). The file is
/// written beside its target and renamed into place, so readers never see
/// a half-written record.
pub fn save_report(dir: &Path, report: &Report) -> Result<(), StorageError> {
    ensure_dir(dir)?;
    let target = report_path(dir, report.id);
    let tmp = dir.join(format!(".report_{}.json.tmp", report.id));
    let json = serde_json::to_string_pretty(report)?;
    let written = File::create(&tmp).and_then(|mut f| {
        f.write_all(json.as_bytes())?;
        f.sync_all()
    });
    if let Err(e) = written.and_then(|()| fs::rename(&tmp, &target)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Load all `report_*.json` files from the directory, sorted by id.
pub fn load_reports(dir: &Path) -> Result<Vec<Report>, StorageError> {
    ensure_dir(dir)?;
    let mut out = vec![];
    for entry in fs::read_dir(dir)? {
        let p = entry?.path();
        let is_report = p
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| name.starts_with("report_") && name.ends_with(".json"));
        if !is_report {
            continue;
        }
        let mut buf = String::new();
        File::open(&p)?.read_to_string(&mut buf)?;
        let report =
            serde_json::from_str::<Report>(&buf).map_err(|e| StorageError::Corrupt {
                path: p.clone(),
                details: e.to_string(),
            })?;
        out.push(report);
    }
    out.sort_by_key(|r| r.id);
    if let Some(pair) = out.windows(2).find(|w| w[0].id == w[1].id) {
        return Err(StorageError::Corrupt {
            path: dir.to_path_buf(),
            details: format!("duplicate report id {}", pair[0].id),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReportContent;
    use crate::status::ReportStatus;
    use time::OffsetDateTime;

    fn report(id: u64) -> Report {
        Report {
            id,
            content: ReportContent {
                area: "Ward 3".into(),
                complaint_type: "garbage".into(),
                description: "bins not collected".into(),
                estimated_impact: "Low".into(),
                fund_misuse_estimate: None,
            },
            severity_score: 30,
            status: ReportStatus::ReportSent,
            contractor_id: None,
            budget: None,
            duration: None,
            required_skills: None,
            citizen_rating: None,
            citizen_feedback: None,
            timestamp: OffsetDateTime::UNIX_EPOCH,
            previous_hash: "0".into(),
            current_hash: format!("h{id}"),
        }
    }

    #[test]
    fn file_store_reloads_in_id_order() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileStore::open(dir.path()).unwrap();
            for id in 1..=12 {
                store.insert(&report(id)).unwrap();
            }
        }
        let store = FileStore::open(dir.path()).unwrap();
        let ids: Vec<u64> = store.all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=12).collect::<Vec<_>>());
        assert_eq!(store.latest().unwrap().unwrap().id, 12);
    }

    #[test]
    fn update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.insert(&report(1)).unwrap();
        let mut r = report(1);
        r.status = ReportStatus::Received;
        store.update(&r).unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get(1).unwrap().unwrap().status,
            ReportStatus::Received
        );
    }

    #[test]
    fn snapshot_sees_edits_made_behind_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.insert(&report(1)).unwrap();
        let mut edited = report(1);
        edited.content.description = "rewritten".into();
        save_report(dir.path(), &edited).unwrap();

        assert_eq!(store.all().unwrap()[0].content.description, "bins not collected");
        assert_eq!(store.snapshot().unwrap()[0].content.description, "rewritten");
    }

    #[test]
    fn rejects_non_increasing_ids() {
        let mut store = MemoryStore::new();
        store.insert(&report(2)).unwrap();
        assert!(store.insert(&report(2)).is_err());
        assert!(store.insert(&report(1)).is_err());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn corrupt_file_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(report_path(dir.path(), 1), "{not json").unwrap();
        assert!(matches!(
            FileStore::open(dir.path()),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn ignores_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        fs::write(dir.path().join(".report_9.json.tmp"), "{").unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.len().unwrap(), 0);
    }
}
