use super::super::domain::Priority;
use super::super::registry::Factor;
use super::super::scoring::{ScoredTestRecord, ThresholdLadder};
use super::{score_range_label, ReportData};
use chrono::NaiveDateTime;
use std::fmt::Write;

const RULE_WIDTH: usize = 70;

/// Plain-text report: a header followed by one block per tier, Highest first.
pub fn render_text(
    data: &ReportData,
    thresholds: &ThresholdLadder,
    generated_at: NaiveDateTime,
) -> String {
    let mut out = String::new();
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    // Writing into a String cannot fail.
    let _ = writeln!(out, "TEST AUTOMATION PRIORITY REPORT");
    let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(out, "Total Tests: {}", data.total_tests());
    if !data.sections.is_empty() {
        let _ = writeln!(out, "Sections: {}", data.sections.len());
    }
    let _ = writeln!(out, "{heavy}");
    out.push('\n');

    for priority in Priority::ordered() {
        let heading = match priority {
            Priority::WontAutomate => "WON'T AUTOMATE TESTS".to_string(),
            other => format!("{} PRIORITY TESTS", other.label().to_uppercase()),
        };
        let _ = writeln!(
            out,
            "{heading} (Score {}):",
            score_range_label(thresholds, priority)
        );
        let _ = writeln!(out, "{}", priority.recommendation());
        let _ = writeln!(out, "{light}");

        let mut listed = 0;
        for (index, scored) in data.tier(priority).enumerate() {
            write_test(&mut out, index + 1, scored, data);
            listed += 1;
        }
        if listed == 0 {
            let _ = writeln!(out, "| No tests in this category");
        }

        let _ = writeln!(out, "{light}");
        out.push('\n');
    }

    out
}

fn write_test(out: &mut String, rank: usize, scored: &ScoredTestRecord, data: &ReportData) {
    let record = &scored.record;
    let _ = writeln!(out, "| {rank}. {} (ID: {})", record.name, record.id);
    if let Some(ticket) = &record.ticket_id {
        let _ = writeln!(out, "|    Ticket: {ticket}");
    }
    let _ = writeln!(
        out,
        "|    Score: {} ({:.1}% of {})",
        scored.weighted_score,
        scored.percent_of_max(data.max_weighted_score),
        data.max_weighted_score
    );
    if let Some(section) = &record.section {
        let _ = writeln!(out, "|    Section: {section}");
    }
    if !record.description.is_empty() {
        let _ = writeln!(out, "|    Description: {}", record.description);
    }

    if !record.automatable {
        let _ = writeln!(out, "|    {}: No", data.gate.display_name);
    }

    let _ = writeln!(out, "|    Factor Scores:");
    for factor in &data.factors {
        if let Some(value) = record.factor_values.get(&factor.key) {
            let _ = writeln!(out, "|      - {}", factor_line(factor, *value));
        }
    }

    for (question, answer) in &record.yesno_answers {
        let _ = writeln!(out, "|    * {question}: {}", if *answer { "Yes" } else { "No" });
    }
    let _ = writeln!(out, "|");
}

fn factor_line(factor: &Factor, value: u32) -> String {
    match factor.option_label(value) {
        Some(label) => format!("{}: {value} - {label}", factor.display_name),
        None => format!("{}: {value}", factor.display_name),
    }
}
