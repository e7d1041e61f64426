//! Report lifecycle states and the transitions allowed between them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Workflow state of a report. Serialized with its human-readable name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    #[default]
    #[serde(rename = "Report Sent")]
    ReportSent,
    #[serde(rename = "Received")]
    Received,
    #[serde(rename = "Admin Verified")]
    AdminVerified,
    #[serde(rename = "Budget Allocated")]
    BudgetAllocated,
    #[serde(rename = "Contractor Selected")]
    ContractorSelected,
    #[serde(rename = "Work Started")]
    WorkStarted,
    #[serde(rename = "Work Completed")]
    WorkCompleted,
    #[serde(rename = "Feedback Submitted")]
    FeedbackSubmitted,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 8] = [
        ReportStatus::ReportSent,
        ReportStatus::Received,
        ReportStatus::AdminVerified,
        ReportStatus::BudgetAllocated,
        ReportStatus::ContractorSelected,
        ReportStatus::WorkStarted,
        ReportStatus::WorkCompleted,
        ReportStatus::FeedbackSubmitted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::ReportSent => "Report Sent",
            ReportStatus::Received => "Received",
            ReportStatus::AdminVerified => "Admin Verified",
            ReportStatus::BudgetAllocated => "Budget Allocated",
            ReportStatus::ContractorSelected => "Contractor Selected",
            ReportStatus::WorkStarted => "Work Started",
            ReportStatus::WorkCompleted => "Work Completed",
            ReportStatus::FeedbackSubmitted => "Feedback Submitted",
        }
    }

    /// Adjacency table: the states reachable in one step from `self`.
    /// Skipping ahead and moving backwards are not allowed.
    pub fn successors(self) -> &'static [ReportStatus] {
        use ReportStatus::*;
        match self {
            ReportSent => &[Received],
            Received => &[AdminVerified],
            AdminVerified => &[BudgetAllocated],
            BudgetAllocated => &[ContractorSelected],
            ContractorSelected => &[WorkStarted],
            WorkStarted => &[WorkCompleted],
            WorkCompleted => &[FeedbackSubmitted],
            FeedbackSubmitted => &[],
        }
    }

    pub fn can_transition_to(self, next: ReportStatus) -> bool {
        self.successors().contains(&next)
    }

    /// States that carry data of their own and are entered only through the
    /// dedicated assign / feedback operations.
    pub fn requires_payload(self) -> bool {
        matches!(
            self,
            ReportStatus::ContractorSelected | ReportStatus::FeedbackSubmitted
        )
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status {:?}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for ReportStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ReportStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
