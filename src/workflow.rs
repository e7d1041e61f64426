//! Status workflow: the mutable side of a report.
//!
//! Transitions must follow [`ReportStatus::successors`]. These operations
//! never touch content or hash fields, so they cannot affect verification.

use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::model::{CitizenFeedback, ContractorAssignment, Report};
use crate::status::{ReportStatus, UnknownStatus};

const MIN_RATING: i64 = 1;
const MAX_RATING: i64 = 5;

impl Ledger {
    /// Move report `id` to `target`, given by its display name.
    ///
    /// `Contractor Selected` and `Feedback Submitted` are refused here; they
    /// are reached through [`Ledger::assign_contractor`] and
    /// [`Ledger::submit_feedback`].
    pub fn set_status(&self, id: u64, target: &str) -> LedgerResult<Report> {
        let target: ReportStatus = target
            .parse()
            .map_err(|e: UnknownStatus| LedgerError::validation("status", e.to_string()))?;
        let updated = self.mutate(id, |report| {
            if target.requires_payload() {
                return Err(LedgerError::state(
                    id,
                    format!("`{target}` can only be set by its dedicated operation"),
                ));
            }
            advance(report, target)
        })?;
        info!(report_id = id, status = %updated.status, "status updated");
        Ok(updated)
    }

    /// Record the winning contractor and move to `Contractor Selected`.
    pub fn assign_contractor(
        &self,
        id: u64,
        assignment: ContractorAssignment,
    ) -> LedgerResult<Report> {
        let contractor_id = match assignment.contractor_id {
            Some(c) if !c.trim().is_empty() => c,
            Some(_) => return Err(LedgerError::validation("contractorId", "must not be empty")),
            None => return Err(LedgerError::validation("contractorId", "is required")),
        };
        let budget = assignment
            .budget
            .map(u64::try_from)
            .transpose()
            .map_err(|_| LedgerError::validation("budget", "must not be negative"))?;
        let updated = self.mutate(id, |report| {
            advance(report, ReportStatus::ContractorSelected)?;
            report.contractor_id = Some(contractor_id);
            report.budget = budget;
            report.duration = assignment.duration;
            report.required_skills = assignment.required_skills;
            Ok(())
        })?;
        info!(
            report_id = id,
            contractor = updated.contractor_id.as_deref().unwrap_or_default(),
            "contractor assigned"
        );
        Ok(updated)
    }

    /// Store the citizen's rating and feedback once work is completed.
    /// Feedback can be given only once per report.
    pub fn submit_feedback(&self, id: u64, feedback: CitizenFeedback) -> LedgerResult<Report> {
        let rating = feedback
            .rating
            .ok_or_else(|| LedgerError::validation("rating", "is required"))?;
        let rating = u8::try_from(rating)
            .ok()
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(&i64::from(*r)))
            .ok_or_else(|| {
                LedgerError::validation(
                    "rating",
                    format!("must be between {MIN_RATING} and {MAX_RATING}"),
                )
            })?;
        let updated = self.mutate(id, |report| {
            if report.has_feedback() {
                return Err(LedgerError::state(id, "feedback already submitted"));
            }
            advance(report, ReportStatus::FeedbackSubmitted)?;
            report.citizen_rating = Some(rating);
            report.citizen_feedback = Some(feedback.feedback.unwrap_or_default());
            Ok(())
        })?;
        info!(report_id = id, rating, "feedback submitted");
        Ok(updated)
    }
}

fn advance(report: &mut Report, target: ReportStatus) -> LedgerResult<()> {
    if !report.status.can_transition_to(target) {
        let allowed: Vec<&str> = report.status.successors().iter().map(|s| s.as_str()).collect();
        let message = if allowed.is_empty() {
            format!("`{}` is final; cannot move to `{target}`", report.status)
        } else {
            format!(
                "cannot move from `{}` to `{target}`; next allowed: {}",
                report.status,
                allowed.join(", ")
            )
        };
        return Err(LedgerError::state(report.id, message));
    }
    report.status = target;
    Ok(())
}
