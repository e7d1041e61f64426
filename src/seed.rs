//! Demo data for a fresh ledger.

use tracing::info;

use crate::error::LedgerResult;
use crate::ledger::Ledger;
use crate::model::NewReport;
use crate::status::ReportStatus;

struct DemoReport {
    area: &'static str,
    complaint_type: &'static str,
    description: &'static str,
    estimated_impact: &'static str,
    /// Workflow states walked through after the append.
    progress: &'static [ReportStatus],
}

const DEMO_REPORTS: &[DemoReport] = &[
    DemoReport {
        area: "Downtown Ward",
        complaint_type: "broken road",
        description: "Large pothole on Main St causing traffic delays.",
        estimated_impact: "Medium",
        progress: &[],
    },
    DemoReport {
        area: "North District",
        complaint_type: "water leakage",
        description: "Main pipe burst near the park, massive water loss.",
        estimated_impact: "High",
        progress: &[ReportStatus::Received, ReportStatus::AdminVerified],
    },
    DemoReport {
        area: "West End",
        complaint_type: "sewage overflow",
        description: "Sewage contamination in residential area.",
        estimated_impact: "High",
        progress: &[
            ReportStatus::Received,
            ReportStatus::AdminVerified,
            ReportStatus::BudgetAllocated,
        ],
    },
];

/// Append the demo reports if the ledger is empty. Returns how many were added.
pub fn seed_demo(ledger: &Ledger) -> LedgerResult<usize> {
    if !ledger.is_empty()? {
        info!("ledger already has reports; skipping demo seed");
        return Ok(0);
    }
    for demo in DEMO_REPORTS {
        let report = ledger.append(NewReport {
            area: Some(demo.area.to_string()),
            complaint_type: Some(demo.complaint_type.to_string()),
            description: Some(demo.description.to_string()),
            estimated_impact: Some(demo.estimated_impact.to_string()),
            fund_misuse_estimate: None,
        })?;
        for status in demo.progress {
            ledger.set_status(report.id, status.as_str())?;
        }
    }
    info!(count = DEMO_REPORTS.len(), "seeded demo reports");
    Ok(DEMO_REPORTS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerOptions;
    use crate::storage::MemoryStore;

    #[test]
    fn seeds_once_with_a_valid_chain() {
        let ledger = Ledger::new(MemoryStore::new(), LedgerOptions::default());
        assert_eq!(seed_demo(&ledger).unwrap(), 3);
        assert_eq!(seed_demo(&ledger).unwrap(), 0);
        assert_eq!(ledger.len().unwrap(), 3);
        assert!(ledger.verify().unwrap().is_valid);

        let contracts = ledger.available_contracts().unwrap();
        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts[0].content.area, "West End");
        assert_eq!(contracts[0].severity_score, 70);
        assert_eq!(ledger.get(2).unwrap().status, ReportStatus::AdminVerified);
        // broken (30) + delay (10) + medium (10)
        assert_eq!(ledger.get(1).unwrap().severity_score, 50);
    }
}
