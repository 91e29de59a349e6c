use std::sync::Arc;
use test_prioritizer::workflows::prioritization::{
    FactorRegistry, Priority, ScoringEngine, TestId, ThresholdLadder, YesNoQuestion,
};
use test_prioritizer::workflows::tabular::{CodecError, TestCsvCodec};

fn codec(registry: FactorRegistry) -> TestCsvCodec {
    TestCsvCodec::new(ScoringEngine::new(
        Arc::new(registry),
        ThresholdLadder::reference(),
    ))
}

const LEGACY_EXPORT: &str = "\
Rank,Priority,Ticket ID,Section,Test Name,Description,Total Score (100-point),Raw Score,Can it be Automated,Regression Frequency,Customer Impact,Manual Test Effort,Automation Complexity,Existing Framework,Angular Framework,Repetitive,Test ID
1,Highest,QA-7,Cart,Verify that items can be added to cart,Add two items,100,35,5,5,5,5,5,5,5,5,7
2,Low,,Search,Check if search handles special characters,,59,17,3,4,5,2,1,3,0,2,12
3,Won't Automate,QA-9,Profile,Confirm profile picture can be changed,Needs a camera,0,5,1,1,1,1,1,1,0,0,9
";

#[test]
fn legacy_export_decodes_and_rescores() {
    let codec = codec(FactorRegistry::reference());
    let records = codec.decode_str(LEGACY_EXPORT).expect("legacy file decodes");

    let ids: Vec<TestId> = records.iter().map(|record| record.id).collect();
    assert_eq!(ids, vec![TestId(7), TestId(12), TestId(9)]);
    assert_eq!(records[1].ticket_id, None);
    assert_eq!(records[1].description, "");
    assert!(records[1].automatable);
    assert!(!records[2].automatable);

    let scored = codec.engine().score_all(&records).expect("scores");
    assert_eq!(scored[0].weighted_score, 70);
    assert_eq!(scored[1].weighted_score, 41);
    assert_eq!(scored[1].priority, Priority::Low);
    assert_eq!(scored[2].priority, Priority::WontAutomate);
}

#[test]
fn exported_file_reimports_identically() {
    let registry = FactorRegistry::reference()
        .with_question(YesNoQuestion {
            question_text: "Requires third-party sandbox?".to_string(),
            impact_note: String::new(),
        })
        .expect("question added");
    let codec = codec(registry);
    let mut records = codec.decode_str(LEGACY_EXPORT).expect("decodes");
    records[0]
        .yesno_answers
        .insert("Requires third-party sandbox?".to_string(), true);

    let csv = codec.encode_to_string(&records).expect("encodes");
    let header = csv.lines().next().expect("header row");
    assert!(header.contains("Question: Requires third-party sandbox?"));
    assert!(header.ends_with("Test ID"));

    let mut again = codec.decode_str(&csv).expect("re-decodes");
    again.sort_by_key(|record| record.id);
    records.sort_by_key(|record| record.id);
    assert_eq!(again, records);
}

#[test]
fn problems_are_reported_together() {
    let input = "\
Test ID,Test Name,Can it be Automated,Regression Frequency,Customer Impact,Manual Test Effort,Automation Complexity,Existing Framework,Angular Framework,Repetitive
1,Login,Yes,5,5,5,5,5,5,5
1,Login again,Yes,5,5,5,5,5,5,5
2,,maybe,5,5,5,5,5,5,five
";
    let error = codec(FactorRegistry::reference())
        .decode_str(input)
        .expect_err("several problems");

    let problems = error.problems();
    assert!(problems.len() >= 3);
    assert!(problems
        .iter()
        .any(|problem| matches!(problem, CodecError::DuplicateTestId { .. })));
    assert!(problems.iter().any(|problem| matches!(
        problem,
        CodecError::InvalidFieldFormat { column, .. } if column == "Repetitive"
    )));
}
