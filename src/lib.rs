//! Tamper-evident ledger for civic complaint reports.
//!
//! Reports are scored by [`severity::score`], chained by SHA-256 in
//! [`ledger::Ledger::append`], checked by [`verify::verify_chain`] and moved
//! through their lifecycle by the operations in [`workflow`].

pub mod config;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod model;
pub mod routes;
pub mod seed;
pub mod severity;
pub mod status;
pub mod storage;
pub mod verify;
pub mod workflow;

pub use crypto::HashEncoding;
pub use error::{ConfigError, LedgerError, LedgerResult, StorageError};
pub use ledger::{Ledger, LedgerOptions};
pub use model::{
    CitizenFeedback, ContractorAssignment, NewReport, Report, ReportContent, RequestBody,
};
pub use status::ReportStatus;
pub use verify::ChainVerification;
