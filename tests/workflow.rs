use civic_ledger::storage::MemoryStore;
use civic_ledger::{
    CitizenFeedback, ContractorAssignment, Ledger, LedgerError, LedgerOptions, NewReport,
    Report, ReportStatus,
};

fn ledger_with_reports(n: usize) -> Ledger {
    let ledger = Ledger::new(MemoryStore::new(), LedgerOptions::default());
    for i in 0..n {
        ledger
            .append(NewReport {
                area: Some(format!("Ward {i}")),
                complaint_type: Some("garbage".into()),
                description: Some("bins not collected, slow pickup".into()),
                estimated_impact: Some("medium".into()),
                fund_misuse_estimate: Some("unknown".into()),
            })
            .expect("append");
    }
    ledger
}

fn walk_to(ledger: &Ledger, id: u64, target: ReportStatus) {
    for status in [
        ReportStatus::Received,
        ReportStatus::AdminVerified,
        ReportStatus::BudgetAllocated,
    ] {
        ledger.set_status(id, status.as_str()).expect("advance");
        if status == target {
            return;
        }
    }
}

fn assignment() -> ContractorAssignment {
    ContractorAssignment {
        contractor_id: Some("contractor-7".into()),
        budget: Some(25_000),
        duration: Some("3 weeks".into()),
        required_skills: Some("paving".into()),
    }
}

fn feedback(rating: i64) -> CitizenFeedback {
    CitizenFeedback {
        rating: Some(rating),
        feedback: Some("fixed quickly".into()),
    }
}

fn assert_state_error<T: std::fmt::Debug>(result: Result<T, LedgerError>) {
    assert!(
        matches!(result, Err(LedgerError::State { .. })),
        "expected state error, got {result:?}"
    );
}

#[test]
fn full_lifecycle_keeps_hashes_and_chain() {
    let ledger = ledger_with_reports(3);
    let before: Report = ledger.get(2).expect("get");

    walk_to(&ledger, 2, ReportStatus::BudgetAllocated);
    assert_eq!(ledger.available_contracts().expect("contracts").len(), 1);

    let assigned = ledger.assign_contractor(2, assignment()).expect("assign");
    assert_eq!(assigned.status, ReportStatus::ContractorSelected);
    assert_eq!(assigned.contractor_id.as_deref(), Some("contractor-7"));
    assert_eq!(assigned.budget, Some(25_000));
    assert!(ledger.available_contracts().expect("contracts").is_empty());

    ledger.set_status(2, "Work Started").expect("start");
    ledger.set_status(2, "Work Completed").expect("complete");
    let done = ledger.submit_feedback(2, feedback(5)).expect("feedback");
    assert_eq!(done.status, ReportStatus::FeedbackSubmitted);
    assert_eq!(done.citizen_rating, Some(5));

    let after = ledger.get(2).expect("get");
    assert_eq!(after.current_hash, before.current_hash);
    assert_eq!(after.previous_hash, before.previous_hash);
    assert_eq!(after.content, before.content);
    assert_eq!(after.severity_score, before.severity_score);
    assert!(ledger.verify().expect("verify").is_valid);
}

#[test]
fn skipping_and_going_back_are_rejected() {
    let ledger = ledger_with_reports(1);
    assert_state_error(ledger.set_status(1, "Budget Allocated"));
    ledger.set_status(1, "Received").expect("received");
    assert_state_error(ledger.set_status(1, "Report Sent"));
    assert_state_error(ledger.set_status(1, "Received"));
    assert_eq!(ledger.get(1).expect("get").status, ReportStatus::Received);
}

#[test]
fn payload_states_need_their_own_operation() {
    let ledger = ledger_with_reports(1);
    walk_to(&ledger, 1, ReportStatus::BudgetAllocated);
    assert_state_error(ledger.set_status(1, "Contractor Selected"));
    assert_eq!(
        ledger.get(1).expect("get").status,
        ReportStatus::BudgetAllocated
    );
}

#[test]
fn unknown_status_is_a_validation_error() {
    let ledger = ledger_with_reports(1);
    match ledger.set_status(1, "Closed") {
        Err(LedgerError::Validation { field, .. }) => assert_eq!(field, "status"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn missing_report_is_not_found() {
    let ledger = ledger_with_reports(1);
    assert!(matches!(
        ledger.set_status(9, "Received"),
        Err(LedgerError::NotFound { id: 9 })
    ));
    assert!(matches!(
        ledger.assign_contractor(9, assignment()),
        Err(LedgerError::NotFound { id: 9 })
    ));
    assert!(matches!(
        ledger.submit_feedback(9, feedback(3)),
        Err(LedgerError::NotFound { id: 9 })
    ));
}

#[test]
fn assignment_requires_budget_allocated_and_contractor() {
    let ledger = ledger_with_reports(1);
    assert_state_error(ledger.assign_contractor(1, assignment()));

    walk_to(&ledger, 1, ReportStatus::BudgetAllocated);
    let mut blank = assignment();
    blank.contractor_id = Some(" ".into());
    match ledger.assign_contractor(1, blank) {
        Err(LedgerError::Validation { field, .. }) => assert_eq!(field, "contractorId"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(ledger.get(1).expect("get").contractor_id, None);
}

#[test]
fn feedback_rules() {
    let ledger = ledger_with_reports(1);
    walk_to(&ledger, 1, ReportStatus::BudgetAllocated);
    ledger.assign_contractor(1, assignment()).expect("assign");
    ledger.set_status(1, "Work Started").expect("start");

    // not completed yet
    assert_state_error(ledger.submit_feedback(1, feedback(4)));

    ledger.set_status(1, "Work Completed").expect("complete");
    for rating in [0, 6, 300, -1, i64::MAX] {
        match ledger.submit_feedback(1, feedback(rating)) {
            Err(LedgerError::Validation { field, .. }) => assert_eq!(field, "rating"),
            other => panic!("unexpected {other:?}"),
        }
    }

    match ledger.submit_feedback(1, CitizenFeedback::default()) {
        Err(LedgerError::Validation { field, message }) => {
            assert_eq!(field, "rating");
            assert_eq!(message, "is required");
        }
        other => panic!("unexpected {other:?}"),
    }

    ledger.submit_feedback(1, feedback(4)).expect("feedback");
    assert_state_error(ledger.submit_feedback(1, feedback(1)));
    assert_eq!(ledger.get(1).expect("get").citizen_rating, Some(4));
}

#[test]
fn mutations_leave_verification_untouched() {
    let ledger = ledger_with_reports(4);
    let before = ledger.verify().expect("verify");
    for id in 1..=4 {
        ledger.set_status(id, "Received").expect("received");
    }
    assert_eq!(ledger.verify().expect("verify"), before);
}

#[test]
fn negative_budget_is_rejected() {
    let ledger = ledger_with_reports(1);
    walk_to(&ledger, 1, ReportStatus::BudgetAllocated);
    let mut negative = assignment();
    negative.budget = Some(-5);
    match ledger.assign_contractor(1, negative) {
        Err(LedgerError::Validation { field, .. }) => assert_eq!(field, "budget"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        ledger.get(1).expect("get").status,
        ReportStatus::BudgetAllocated
    );
}
