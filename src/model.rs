//! Data model for complaint reports and their chained hash fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::crypto::HashEncoding;
use crate::error::{LedgerError, LedgerResult};
use crate::status::ReportStatus;

/// `previous_hash` of the genesis record.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Report content as submitted by a citizen. Immutable once chained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportContent {
    pub area: String,
    pub complaint_type: String,
    pub description: String,
    pub estimated_impact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund_misuse_estimate: Option<String>,
}

impl ReportContent {
    /// Hash of the chained fields: area, complaint type, description,
    /// estimated impact, severity score and previous hash, in that order.
    pub fn chain_hash(
        &self,
        severity_score: u32,
        previous_hash: &str,
        encoding: HashEncoding,
    ) -> String {
        let score = severity_score.to_string();
        encoding.digest(&[
            self.area.as_bytes(),
            self.complaint_type.as_bytes(),
            self.description.as_bytes(),
            self.estimated_impact.as_bytes(),
            score.as_bytes(),
            previous_hash.as_bytes(),
        ])
    }
}

/// A JSON request body read field by field, so a missing or mistyped value
/// is reported under its own name.
#[derive(Debug, Clone)]
pub struct RequestBody(Map<String, Value>);

impl RequestBody {
    pub fn parse(value: Value) -> LedgerResult<Self> {
        match value {
            Value::Object(map) => Ok(RequestBody(map)),
            _ => Err(LedgerError::validation("body", "must be a JSON object")),
        }
    }

    /// A string field; absent and `null` both read as `None`.
    pub fn text(&self, field: &'static str) -> LedgerResult<Option<String>> {
        match self.0.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(LedgerError::validation(field, "must be a string")),
        }
    }

    /// An integer field; absent and `null` both read as `None`.
    pub fn integer(&self, field: &'static str) -> LedgerResult<Option<i64>> {
        match self.0.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_i64()
                .map(Some)
                .ok_or_else(|| LedgerError::validation(field, "must be an integer")),
        }
    }
}

/// Unvalidated create request. Every field is optional on the wire so a
/// missing one is reported by name instead of as a decode failure.
#[derive(Debug, Clone, Default)]
pub struct NewReport {
    pub area: Option<String>,
    pub complaint_type: Option<String>,
    pub description: Option<String>,
    pub estimated_impact: Option<String>,
    pub fund_misuse_estimate: Option<String>,
}

impl TryFrom<RequestBody> for NewReport {
    type Error = LedgerError;

    fn try_from(body: RequestBody) -> LedgerResult<Self> {
        Ok(NewReport {
            area: body.text("area")?,
            complaint_type: body.text("complaintType")?,
            description: body.text("description")?,
            estimated_impact: body.text("estimatedImpact")?,
            fund_misuse_estimate: body.text("fundMisuseEstimate")?,
        })
    }
}

impl NewReport {
    pub fn validate(self) -> LedgerResult<ReportContent> {
        Ok(ReportContent {
            area: required("area", self.area)?,
            complaint_type: required("complaintType", self.complaint_type)?,
            description: required("description", self.description)?,
            estimated_impact: required("estimatedImpact", self.estimated_impact)?,
            fund_misuse_estimate: self
                .fund_misuse_estimate
                .filter(|v| !v.trim().is_empty()),
        })
    }
}

impl From<ReportContent> for NewReport {
    fn from(c: ReportContent) -> Self {
        NewReport {
            area: Some(c.area),
            complaint_type: Some(c.complaint_type),
            description: Some(c.description),
            estimated_impact: Some(c.estimated_impact),
            fund_misuse_estimate: c.fund_misuse_estimate,
        }
    }
}

fn required(field: &'static str, value: Option<String>) -> LedgerResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(LedgerError::validation(field, "must not be empty")),
        None => Err(LedgerError::validation(field, "is required")),
    }
}

/// One block of the chain: immutable content and hash fields plus the
/// mutable workflow fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Commit-order id; the chain order.
    pub id: u64,
    #[serde(flatten)]
    pub content: ReportContent,
    pub severity_score: u32,
    pub status: ReportStatus,

    pub contractor_id: Option<String>,
    pub budget: Option<u64>,
    pub duration: Option<String>,
    pub required_skills: Option<String>,

    pub citizen_rating: Option<u8>,
    pub citizen_feedback: Option<String>,

    /// Creation time. Informational, never used for ordering.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub previous_hash: String,
    pub current_hash: String,
}

impl Report {
    pub fn is_genesis(&self) -> bool {
        self.previous_hash == GENESIS_PREVIOUS_HASH
    }

    pub fn has_feedback(&self) -> bool {
        self.citizen_rating.is_some() || self.citizen_feedback.is_some()
    }
}

/// Contractor assignment request.
#[derive(Debug, Clone, Default)]
pub struct ContractorAssignment {
    pub contractor_id: Option<String>,
    pub budget: Option<i64>,
    pub duration: Option<String>,
    pub required_skills: Option<String>,
}

impl TryFrom<RequestBody> for ContractorAssignment {
    type Error = LedgerError;

    fn try_from(body: RequestBody) -> LedgerResult<Self> {
        Ok(ContractorAssignment {
            contractor_id: body.text("contractorId")?,
            budget: body.integer("budget")?,
            duration: body.text("duration")?,
            required_skills: body.text("requiredSkills")?,
        })
    }
}

/// Citizen feedback after work completion. `rating` is range-checked by
/// the workflow, not by the decoder.
#[derive(Debug, Clone, Default)]
pub struct CitizenFeedback {
    pub rating: Option<i64>,
    pub feedback: Option<String>,
}

impl TryFrom<RequestBody> for CitizenFeedback {
    type Error = LedgerError;

    fn try_from(body: RequestBody) -> LedgerResult<Self> {
        Ok(CitizenFeedback {
            rating: body.integer("rating")?,
            feedback: body.text("feedback")?,
        })
    }
}
