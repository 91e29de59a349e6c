use super::super::domain::Priority;
use super::super::scoring::{ScoredTestRecord, ThresholdLadder};
use super::{score_range_label, ReportData};
use chrono::NaiveDateTime;
use std::fmt::Write;

/// Markdown report: header, one section per tier and, when tests span more
/// than one section, a per-section breakdown.
pub fn render_markdown(
    data: &ReportData,
    thresholds: &ThresholdLadder,
    generated_at: NaiveDateTime,
) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "# TEST AUTOMATION PRIORITY REPORT\n");
    let _ = writeln!(
        out,
        "**Generated:** {}  ",
        generated_at.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(out, "**Total Tests:** {}  ", data.total_tests());
    if !data.sections.is_empty() {
        let _ = writeln!(out, "**Sections:** {}  ", data.sections.len());
    }
    out.push_str("\n---\n\n");

    for priority in Priority::ordered() {
        let _ = writeln!(
            out,
            "## {} {}\n",
            marker(priority),
            tier_heading(priority, thresholds)
        );
        let _ = writeln!(out, "*{}*\n", priority.recommendation());

        let mut listed = 0;
        for (index, scored) in data.tier(priority).enumerate() {
            write_test(&mut out, index + 1, scored, data);
            listed += 1;
        }
        if listed == 0 {
            out.push_str("*No tests in this category*\n\n");
        }
        out.push_str("---\n\n");
    }

    if data.sections.len() > 1 {
        out.push_str("## SECTION BREAKDOWN\n\n");
        for section in &data.sections {
            let _ = writeln!(out, "### Section: {}\n", inline(&section.section));
            let _ = writeln!(out, "**Total Tests:** {}  ", section.counts.total());
            out.push_str("**Priority Distribution:**\n\n");
            for priority in Priority::ordered() {
                let count = section.counts.get(priority);
                if count > 0 {
                    let _ = writeln!(
                        out,
                        "* {} **{}**: {count} tests",
                        marker(priority),
                        priority.label()
                    );
                }
            }
            out.push('\n');
        }
        out.push_str("---\n\n");
    }

    out
}

fn tier_heading(priority: Priority, thresholds: &ThresholdLadder) -> String {
    match priority {
        Priority::WontAutomate => "TESTS THAT WON'T BE AUTOMATED".to_string(),
        other => format!(
            "{} PRIORITY TESTS (Score {})",
            other.label().to_uppercase(),
            score_range_label(thresholds, other)
        ),
    }
}

fn marker(priority: Priority) -> &'static str {
    match priority {
        Priority::Highest => "🔴",
        Priority::High => "🟠",
        Priority::Medium => "🟡",
        Priority::Low => "🔵",
        Priority::Lowest => "🔷",
        Priority::WontAutomate => "⚪",
    }
}

fn write_test(out: &mut String, rank: usize, scored: &ScoredTestRecord, data: &ReportData) {
    let record = &scored.record;
    let _ = writeln!(out, "### {rank}. {}\n", inline(&record.name));
    let _ = writeln!(out, "**Test ID:** {}  ", record.id);
    let _ = writeln!(
        out,
        "**Score:** {} ({:.1}% of {})  ",
        scored.weighted_score,
        scored.percent_of_max(data.max_weighted_score),
        data.max_weighted_score
    );
    if let Some(ticket) = &record.ticket_id {
        let _ = writeln!(out, "**Ticket:** {}  ", inline(ticket));
    }
    if let Some(section) = &record.section {
        let _ = writeln!(out, "**Section:** {}  ", inline(section));
    }
    if !record.description.trim().is_empty() {
        let _ = writeln!(out, "**Description:** {}  ", inline(&record.description));
    }
    if !record.automatable {
        let _ = writeln!(out, "**{}:** No  ", data.gate.display_name);
    }

    out.push_str("**Factor Scores:**\n\n");
    for factor in &data.factors {
        let Some(value) = record.factor_values.get(&factor.key) else {
            continue;
        };
        match factor.option_label(*value) {
            Some(label) => {
                let _ = writeln!(out, "* **{}**: {value} - {label}", factor.display_name);
            }
            None => {
                let _ = writeln!(out, "* **{}**: {value}", factor.display_name);
            }
        }
    }
    for (question, answer) in &record.yesno_answers {
        let _ = writeln!(
            out,
            "* **{}**: {}",
            inline(question),
            if *answer { "Yes" } else { "No" }
        );
    }
    out.push('\n');
}

/// User text on one line with Markdown control characters escaped.
pub(crate) fn inline(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.trim().chars() {
        match ch {
            '\\' | '`' | '*' | '_' | '[' | ']' | '#' | '<' | '>' | '|' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '\r' | '\n' => escaped.push(' '),
            other => escaped.push(other),
        }
    }
    escaped
}
