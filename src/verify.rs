//! Chain integrity verification.

use serde::Serialize;

use crate::crypto::HashEncoding;
use crate::model::{Report, GENESIS_PREVIOUS_HASH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    /// `previous_hash` differs from the predecessor's `current_hash`.
    BrokenLink,
    /// `current_hash` is not the digest of the record's own fields.
    HashMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainIssue {
    pub id: u64,
    pub kind: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainVerification {
    pub is_valid: bool,
    /// Offending ids, ascending, without duplicates.
    pub invalid_blocks: Vec<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ChainIssue>,
}

/// Verify `records`, which must be in ascending id order.
///
/// Checks hash linkage between neighbours (the successor is flagged) and
/// recomputes every record's own hash (the record itself is flagged). The
/// genesis record is hashed over the sentinel, so its stored
/// `previous_hash` is never held against it.
pub fn verify_chain(records: &[Report], encoding: HashEncoding) -> ChainVerification {
    let mut issues = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let linked_to = if i == 0 {
            GENESIS_PREVIOUS_HASH
        } else {
            let prev = &records[i - 1];
            if record.previous_hash != prev.current_hash {
                issues.push(ChainIssue {
                    id: record.id,
                    kind: IssueKind::BrokenLink,
                });
            }
            record.previous_hash.as_str()
        };

        let recomputed = record
            .content
            .chain_hash(record.severity_score, linked_to, encoding);
        if recomputed != record.current_hash {
            issues.push(ChainIssue {
                id: record.id,
                kind: IssueKind::HashMismatch,
            });
        }
    }

    let mut invalid_blocks: Vec<u64> = issues.iter().map(|issue| issue.id).collect();
    invalid_blocks.sort_unstable();
    invalid_blocks.dedup();

    ChainVerification {
        is_valid: invalid_blocks.is_empty(),
        invalid_blocks,
        issues,
    }
}
