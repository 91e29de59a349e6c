use std::sync::Arc;

use chrono::NaiveDate;

use super::common::*;
use crate::workflows::prioritization::{
    PrioritizationService, PrioritizationServiceError, Priority, ReportSettings, RepositoryError,
    ScoringError, TestId, TestRecordUpdate, TestRepository,
};
use crate::workflows::tabular::CodecError;

#[test]
fn add_assigns_ids_and_scores() {
    let (service, repository) = build_service();

    let first = service.add(draft("Checkout", EXAMPLE)).expect("stored");
    let second = service
        .add(draft("Refunds", [5, 5, 5, 5, 5, 5, 5]))
        .expect("stored");

    assert_eq!(first.id(), TestId(1));
    assert_eq!(second.id(), TestId(2));
    assert_eq!(first.weighted_score, 41);
    assert_eq!(second.priority, Priority::Highest);
    assert_eq!(repository.list().expect("list").len(), 2);
}

#[test]
fn invalid_draft_is_not_stored() {
    let (service, repository) = build_service();

    let error = service
        .add(draft("Broken", [9, 0, 0, 0, 0, 0, 0]))
        .expect_err("out of range");
    assert!(matches!(
        error,
        PrioritizationServiceError::InvalidDraft(ScoringError::InvalidFactorValue { value: 9, .. })
    ));
    assert!(repository.list().expect("list").is_empty());
}

#[test]
fn edit_rescores_and_keeps_untouched_fields() {
    let (service, _) = build_service();
    let stored = service.add(draft("Checkout", EXAMPLE)).expect("stored");

    let update = TestRecordUpdate {
        automatable: Some(false),
        description: Some("needs a physical card reader".to_string()),
        ..TestRecordUpdate::default()
    };
    let edited = service.edit(stored.id(), &update).expect("edited");

    assert_eq!(edited.priority, Priority::WontAutomate);
    assert_eq!(edited.weighted_score, 41);
    assert_eq!(edited.record.name, "Checkout");
    assert_eq!(edited.record.description, "needs a physical card reader");
    assert_eq!(
        service.get(stored.id()).expect("fetch").priority,
        Priority::WontAutomate
    );
}

#[test]
fn failed_edit_leaves_record_untouched() {
    let (service, _) = build_service();
    let stored = service.add(draft("Checkout", EXAMPLE)).expect("stored");

    let update = TestRecordUpdate {
        name: Some("Renamed".to_string()),
        factor_values: Some(factor_values([4, 5, 2, 1, 3, 0, 7])),
        ..TestRecordUpdate::default()
    };
    let error = service.edit(stored.id(), &update).expect_err("invalid");
    assert!(matches!(
        error,
        PrioritizationServiceError::Scoring(ScoringError::InvalidFactorValue { .. })
    ));

    let current = service.get(stored.id()).expect("still stored");
    assert_eq!(current.record, stored.record);
}

#[test]
fn missing_tests_are_reported() {
    let (service, _) = build_service();

    assert!(matches!(
        service.get(TestId(42)),
        Err(PrioritizationServiceError::Repository(RepositoryError::NotFound(TestId(42))))
    ));
    assert!(matches!(
        service.edit(TestId(42), &TestRecordUpdate::default()),
        Err(PrioritizationServiceError::Repository(RepositoryError::NotFound(_)))
    ));
    assert!(matches!(
        service.delete(TestId(42)),
        Err(PrioritizationServiceError::Repository(RepositoryError::NotFound(_)))
    ));
}

#[test]
fn delete_removes_from_report() {
    let (service, _) = build_service();
    let kept = service.add(draft("Checkout", EXAMPLE)).expect("stored");
    let removed = service.add(draft("Legacy", EXAMPLE)).expect("stored");

    service.delete(removed.id()).expect("deleted");

    let report = service.report().expect("report");
    assert_eq!(report.total_tests(), 1);
    assert_eq!(report.ranked[0].id(), kept.id());
}

#[test]
fn ranked_lists_in_report_order() {
    let (service, _) = build_service();
    service.add(draft("Low", [1, 1, 1, 1, 1, 1, 1])).expect("stored");
    service.add(draft("Top", [5, 5, 5, 5, 5, 5, 5])).expect("stored");

    let names: Vec<String> = service
        .ranked()
        .expect("ranked")
        .into_iter()
        .map(|scored| scored.record.name)
        .collect();
    assert_eq!(names, vec!["Top", "Low"]);
}

#[test]
fn export_then_import_reproduces_catalog() {
    let (source, _) = build_service();
    source.add(draft("Checkout", EXAMPLE)).expect("stored");
    let mut blocked = draft("Printed receipt", [2, 2, 2, 2, 2, 2, 2]);
    blocked.automatable = false;
    source.add(blocked).expect("stored");

    let mut csv = Vec::new();
    assert_eq!(source.export_csv(&mut csv).expect("exported"), 2);

    let (target, repository) = build_service();
    assert_eq!(target.import_csv(csv.as_slice(), false).expect("imported"), 2);

    let mut expected = source.ranked().expect("ranked");
    let mut actual = target.ranked().expect("ranked");
    expected.sort_by_key(|scored| scored.id());
    actual.sort_by_key(|scored| scored.id());
    assert_eq!(actual, expected);

    // Ids continue after the imported batch.
    let next = target.add(draft("After import", EXAMPLE)).expect("stored");
    assert_eq!(next.id(), TestId(3));
    assert_eq!(repository.list().expect("list").len(), 3);
}

#[test]
fn answers_outside_the_catalog_are_refused_on_add_and_edit() {
    let (service, repository) = build_service();
    let mut stray = draft("Checkout", EXAMPLE);
    stray
        .yesno_answers
        .insert("Not in catalog?".to_string(), true);

    assert!(matches!(
        service.add(stray),
        Err(PrioritizationServiceError::InvalidDraft(ScoringError::UnknownQuestion { question, .. }))
            if question == "Not in catalog?"
    ));
    assert!(repository.list().expect("list").is_empty());

    let stored = service.add(draft("Checkout", EXAMPLE)).expect("stored");
    let update = TestRecordUpdate {
        yesno_answers: Some([("Not in catalog?".to_string(), true)].into()),
        ..TestRecordUpdate::default()
    };
    assert!(matches!(
        service.edit(stored.id(), &update),
        Err(PrioritizationServiceError::Scoring(ScoringError::UnknownQuestion { .. }))
    ));

    let mut csv = Vec::new();
    assert_eq!(service.export_csv(&mut csv).expect("still exportable"), 1);
}

#[test]
fn blank_names_are_refused_on_add_and_edit() {
    let (service, repository) = build_service();

    assert!(matches!(
        service.add(draft("", EXAMPLE)),
        Err(PrioritizationServiceError::InvalidDraft(ScoringError::BlankName { .. }))
    ));
    assert!(repository.list().expect("list").is_empty());

    let stored = service.add(draft("Checkout", EXAMPLE)).expect("stored");
    let update = TestRecordUpdate {
        name: Some("  ".to_string()),
        ..TestRecordUpdate::default()
    };
    assert!(matches!(
        service.edit(stored.id(), &update),
        Err(PrioritizationServiceError::Scoring(ScoringError::BlankName { .. }))
    ));
    assert_eq!(service.get(stored.id()).expect("stored").record.name, "Checkout");
}

#[test]
fn exported_text_reimports_verbatim() {
    let (source, _) = build_service();
    let mut padded = draft("  Login  ", EXAMPLE);
    padded.ticket_id = Some(String::new());
    padded.section = Some("   ".to_string());
    padded.description = " trailing ".to_string();
    source.add(padded).expect("stored");
    let mut quoted = draft("Refund, \"partial\"", [5, 5, 5, 5, 5, 5, 5]);
    quoted.description = "line one\nline two".to_string();
    source.add(quoted).expect("stored");

    let stored = source.get(TestId(1)).expect("stored").record;
    assert_eq!(stored.ticket_id, None);
    assert_eq!(stored.section, None);

    let mut csv = Vec::new();
    source.export_csv(&mut csv).expect("exported");
    let (target, _) = build_service();
    assert_eq!(target.import_csv(csv.as_slice(), false).expect("imported"), 2);

    for id in [TestId(1), TestId(2)] {
        assert_eq!(
            target.get(id).expect("imported").record,
            source.get(id).expect("stored").record
        );
    }
    assert_eq!(target.get(TestId(1)).expect("imported").record.name, "  Login  ");
}

#[test]
fn import_conflicts_unless_replacing() {
    let (service, _) = build_service();
    service.add(draft("Checkout", EXAMPLE)).expect("stored");
    let mut csv = Vec::new();
    service.export_csv(&mut csv).expect("exported");

    assert!(matches!(
        service.import_csv(csv.as_slice(), false),
        Err(PrioritizationServiceError::Repository(RepositoryError::Conflict(TestId(1))))
    ));
    assert_eq!(service.import_csv(csv.as_slice(), true).expect("replaced"), 1);
    assert_eq!(service.ranked().expect("ranked").len(), 1);
}

#[test]
fn malformed_import_changes_nothing() {
    let (service, repository) = build_service();
    service.add(draft("Checkout", EXAMPLE)).expect("stored");

    let error = service
        .import_csv("Test Name,Description\nonly,two\n".as_bytes(), true)
        .expect_err("missing columns");
    assert!(matches!(error, PrioritizationServiceError::Codec(CodecError::Rows(_))));
    assert_eq!(repository.list().expect("list").len(), 1);
}

#[test]
fn reports_render_from_stored_tests() {
    let (service, _) = build_service();
    service.add(draft("Checkout", EXAMPLE)).expect("stored");
    let at = NaiveDate::from_ymd_opt(2025, 1, 2)
        .and_then(|date| date.and_hms_opt(8, 0, 0))
        .expect("timestamp");

    let html = service.report_html(at).expect("html");
    assert!(html.contains("Generated: 2025-01-02 08:00"));
    assert!(!html.contains("{{"));

    let text = service.report_text(at).expect("text");
    assert!(text.contains("| 1. Checkout (ID: 1)"));

    let markdown = service.report_markdown(at).expect("markdown");
    assert!(markdown.contains("**Generated:** 2025-01-02 08:00"));
    assert!(markdown.contains("### 1. Checkout"));

    let matrix = service
        .matrix("customer_impact", "automation_complexity")
        .expect("matrix");
    assert_eq!(matrix.points.len(), 1);
    assert_eq!((matrix.points[0].x, matrix.points[0].y), (5, 1));
    assert!(matches!(
        service.matrix("customer_impact", "flakiness"),
        Err(PrioritizationServiceError::Matrix(_))
    ));
}

#[test]
fn repository_failures_propagate() {
    let service = PrioritizationService::new(
        Arc::new(UnavailableRepository),
        engine(),
        ReportSettings::default(),
    );

    assert!(matches!(
        service.add(draft("Checkout", EXAMPLE)),
        Err(PrioritizationServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
    assert!(matches!(
        service.report(),
        Err(PrioritizationServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
    assert!(matches!(
        service.export_csv(Vec::new()),
        Err(PrioritizationServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
}
