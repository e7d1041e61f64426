//! The report ledger: serialized, hash-chained appends over a [`ReportStore`].

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::crypto::HashEncoding;
use crate::error::{LedgerError, LedgerResult, StorageError};
use crate::model::{NewReport, Report, ReportContent, GENESIS_PREVIOUS_HASH};
use crate::severity;
use crate::status::ReportStatus;
use crate::storage::ReportStore;
use crate::verify::{verify_chain, ChainVerification};

#[derive(Debug, Clone, Copy)]
pub struct LedgerOptions {
    pub encoding: HashEncoding,
    /// Extra attempts of a whole append after a storage failure.
    pub append_retries: u32,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            encoding: HashEncoding::default(),
            append_retries: 2,
        }
    }
}

/// Shared ledger handle.
///
/// Appends and workflow updates take the write lock for their whole
/// read-latest/commit unit, so the chain can never fork. Reads and
/// verification share the read lock and never see a half-committed record.
pub struct Ledger {
    store: RwLock<Box<dyn ReportStore>>,
    options: LedgerOptions,
}

impl Ledger {
    pub fn new(store: impl ReportStore + 'static, options: LedgerOptions) -> Self {
        let store: Box<dyn ReportStore> = Box::new(store);
        Ledger {
            store: RwLock::new(store),
            options,
        }
    }

    pub fn options(&self) -> LedgerOptions {
        self.options
    }

    /// Validate, score, chain and commit a new report.
    ///
    /// Validation happens once; a storage failure retries the entire unit
    /// (including re-reading the chain tip) up to `append_retries` times.
    pub fn append(&self, input: NewReport) -> LedgerResult<Report> {
        let content = input.validate()?;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_append(&content) {
                Err(LedgerError::Storage(e)) if attempt <= self.options.append_retries => {
                    warn!(attempt, error = %e, "append failed, retrying");
                }
                result => return result,
            }
        }
    }

    fn try_append(&self, content: &ReportContent) -> LedgerResult<Report> {
        let severity_score = severity::score(
            &content.complaint_type,
            &content.description,
            &content.estimated_impact,
        );

        let mut store = self.write()?;
        let latest = store.latest()?;
        let (id, previous_hash) = match latest {
            Some(tip) => (tip.id + 1, tip.current_hash),
            None => (1, GENESIS_PREVIOUS_HASH.to_string()),
        };
        let current_hash = content.chain_hash(severity_score, &previous_hash, self.options.encoding);

        let report = Report {
            id,
            content: content.clone(),
            severity_score,
            status: ReportStatus::ReportSent,
            contractor_id: None,
            budget: None,
            duration: None,
            required_skills: None,
            citizen_rating: None,
            citizen_feedback: None,
            timestamp: OffsetDateTime::now_utc(),
            previous_hash,
            current_hash,
        };
        store.insert(&report)?;
        drop(store);

        info!(
            report_id = report.id,
            severity = report.severity_score,
            hash = %report.current_hash,
            "appended report"
        );
        Ok(report)
    }

    pub fn get(&self, id: u64) -> LedgerResult<Report> {
        self.read()?
            .get(id)?
            .ok_or(LedgerError::NotFound { id })
    }

    /// All reports, newest first.
    pub fn list(&self) -> LedgerResult<Vec<Report>> {
        let mut all = self.read()?.all()?;
        all.reverse();
        Ok(all)
    }

    /// Reports awaiting a contractor (status `Budget Allocated`), newest first.
    pub fn available_contracts(&self) -> LedgerResult<Vec<Report>> {
        let mut open: Vec<Report> = self
            .read()?
            .all()?
            .into_iter()
            .filter(|r| r.status == ReportStatus::BudgetAllocated)
            .collect();
        open.reverse();
        Ok(open)
    }

    pub fn len(&self) -> LedgerResult<usize> {
        Ok(self.read()?.len()?)
    }

    pub fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Verify the whole chain as the store's backing medium holds it now.
    /// The read lock keeps writers out while the snapshot is taken.
    pub fn verify(&self) -> LedgerResult<ChainVerification> {
        let records = self.read()?.snapshot()?;
        let result = verify_chain(&records, self.options.encoding);
        if result.is_valid {
            debug!(records = records.len(), "chain verified");
        } else {
            warn!(invalid = ?result.invalid_blocks, "chain verification failed");
        }
        Ok(result)
    }

    /// Apply `change` to a copy of report `id` and commit it as one update.
    /// Hash fields are restored from the stored record before committing.
    pub(crate) fn mutate<F>(&self, id: u64, change: F) -> LedgerResult<Report>
    where
        F: FnOnce(&mut Report) -> LedgerResult<()>,
    {
        let mut store = self.write()?;
        let stored = store.get(id)?.ok_or(LedgerError::NotFound { id })?;
        let mut updated = stored.clone();
        change(&mut updated)?;

        updated.id = stored.id;
        updated.content = stored.content;
        updated.severity_score = stored.severity_score;
        updated.timestamp = stored.timestamp;
        updated.previous_hash = stored.previous_hash;
        updated.current_hash = stored.current_hash;

        store.update(&updated)?;
        Ok(updated)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Box<dyn ReportStore>>, StorageError> {
        self.store.read().map_err(|_| StorageError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Box<dyn ReportStore>>, StorageError> {
        self.store.write().map_err(|_| StorageError::Poisoned)
    }
}
