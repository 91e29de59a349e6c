use super::super::domain::Priority;
use super::super::scoring::{ScoredTestRecord, ThresholdLadder};
use super::ReportData;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fmt::Write;

/// Static shell the HTML report is substituted into.
pub const REPORT_TEMPLATE: &str = include_str!("template.html");

/// Every token the template shell consumes.
pub const TEMPLATE_TOKENS: [&str; 26] = [
    "timestamp",
    "total_tests",
    "highest_count",
    "high_count",
    "medium_count",
    "low_count",
    "lowest_count",
    "wont_automate_count",
    "highest_threshold",
    "high_threshold",
    "medium_threshold",
    "low_threshold",
    "highest_threshold_minus",
    "high_threshold_minus",
    "medium_threshold_minus",
    "priority_chart",
    "score_distribution_chart",
    "factor_contribution_chart",
    "top_tests_chart",
    "highest_priority_cards",
    "high_priority_cards",
    "medium_priority_cards",
    "low_priority_cards",
    "lowest_priority_cards",
    "wont_automate_cards",
    "test_data_json",
];

pub fn render_html(
    data: &ReportData,
    thresholds: &ThresholdLadder,
    generated_at: NaiveDateTime,
) -> String {
    render_with_template(REPORT_TEMPLATE, data, thresholds, generated_at)
}

/// Substitute the token set into an arbitrary shell. Unknown `{{...}}`
/// placeholders are left as they are.
pub fn render_with_template(
    template: &str,
    data: &ReportData,
    thresholds: &ThresholdLadder,
    generated_at: NaiveDateTime,
) -> String {
    let values = token_values(data, thresholds, generated_at);
    substitute(template, &values)
}

fn token_values(
    data: &ReportData,
    thresholds: &ThresholdLadder,
    generated_at: NaiveDateTime,
) -> HashMap<&'static str, String> {
    let count = |priority: Priority| data.counts.get(priority).to_string();
    let minus = |threshold: u32| threshold.saturating_sub(1).to_string();

    HashMap::from([
        ("timestamp", generated_at.format("%Y-%m-%d %H:%M").to_string()),
        ("total_tests", data.total_tests().to_string()),
        ("highest_count", count(Priority::Highest)),
        ("high_count", count(Priority::High)),
        ("medium_count", count(Priority::Medium)),
        ("low_count", count(Priority::Low)),
        ("lowest_count", count(Priority::Lowest)),
        ("wont_automate_count", count(Priority::WontAutomate)),
        ("highest_threshold", thresholds.highest_threshold().to_string()),
        ("high_threshold", thresholds.high_threshold().to_string()),
        ("medium_threshold", thresholds.medium_threshold().to_string()),
        ("low_threshold", thresholds.low_threshold().to_string()),
        ("highest_threshold_minus", minus(thresholds.highest_threshold())),
        ("high_threshold_minus", minus(thresholds.high_threshold())),
        ("medium_threshold_minus", minus(thresholds.medium_threshold())),
        ("priority_chart", priority_chart(data)),
        ("score_distribution_chart", score_distribution_chart(data)),
        ("factor_contribution_chart", factor_contribution_chart(data)),
        ("top_tests_chart", top_tests_chart(data)),
        ("highest_priority_cards", tier_cards(data, Priority::Highest)),
        ("high_priority_cards", tier_cards(data, Priority::High)),
        ("medium_priority_cards", tier_cards(data, Priority::Medium)),
        ("low_priority_cards", tier_cards(data, Priority::Low)),
        ("lowest_priority_cards", tier_cards(data, Priority::Lowest)),
        ("wont_automate_cards", tier_cards(data, Priority::WontAutomate)),
        ("test_data_json", test_data_json(data)),
    ])
}

/// Single left-to-right pass so substituted text is never rescanned.
fn substitute(template: &str, values: &HashMap<&'static str, String>) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        match after_open.find("}}") {
            Some(end) => {
                let name = &after_open[..end];
                match values.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(name);
                        out.push_str("}}");
                    }
                }
                rest = &after_open[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

pub(crate) fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

struct Bar {
    label: String,
    value: u64,
    class: Option<String>,
}

fn bar_chart(bars: &[Bar]) -> String {
    if bars.iter().all(|bar| bar.value == 0) {
        return r#"<p class="chart-empty">No data</p>"#.to_string();
    }

    let peak = bars.iter().map(|bar| bar.value).max().unwrap_or(1).max(1);
    let mut html = String::from(r#"<div class="bar-chart">"#);
    for bar in bars {
        let width = bar.value as f64 / peak as f64 * 100.0;
        let class = bar
            .class
            .as_deref()
            .map(|class| format!("bar-fill {class}"))
            .unwrap_or_else(|| "bar-fill".to_string());
        let _ = write!(
            html,
            r#"<div class="bar-row"><span class="bar-label" title="{label}">{label}</span><div class="bar-track"><div class="{class}" style="width: {width:.1}%"></div></div><span class="bar-value">{value}</span></div>"#,
            label = escape_html(&bar.label),
            value = bar.value,
        );
    }
    html.push_str("</div>");
    html
}

fn priority_chart(data: &ReportData) -> String {
    let bars: Vec<Bar> = Priority::ordered()
        .into_iter()
        .map(|priority| Bar {
            label: priority.label().to_string(),
            value: data.counts.get(priority) as u64,
            class: Some(priority.css_class()),
        })
        .collect();
    bar_chart(&bars)
}

fn score_distribution_chart(data: &ReportData) -> String {
    let bars: Vec<Bar> = data
        .histogram
        .buckets
        .iter()
        .map(|bucket| Bar {
            label: format!("{} - {}", bucket.lower, bucket.upper - 1),
            value: bucket.count as u64,
            class: None,
        })
        .collect();
    bar_chart(&bars)
}

fn factor_contribution_chart(data: &ReportData) -> String {
    let bars: Vec<Bar> = data
        .factor_contributions
        .iter()
        .map(|contribution| Bar {
            label: format!("{} (x{})", contribution.display_name, contribution.weight),
            value: contribution.total,
            class: None,
        })
        .collect();
    bar_chart(&bars)
}

fn top_tests_chart(data: &ReportData) -> String {
    let bars: Vec<Bar> = data
        .top_tests
        .iter()
        .map(|scored| Bar {
            label: scored.record.name.clone(),
            value: u64::from(scored.weighted_score),
            class: Some(scored.priority.css_class()),
        })
        .collect();
    bar_chart(&bars)
}

fn tier_cards(data: &ReportData, priority: Priority) -> String {
    let mut html = String::new();
    for (index, scored) in data.tier(priority).enumerate() {
        html.push_str(&test_card(data, index + 1, scored));
    }
    if html.is_empty() {
        html.push_str(r#"<div class="no-tests">No tests in this category</div>"#);
    }
    html
}

fn test_card(data: &ReportData, rank: usize, scored: &ScoredTestRecord) -> String {
    let record = &scored.record;
    let mut card = String::new();

    let _ = write!(
        card,
        r#"<div class="test-card priority-{class}"><div class="test-card-header"><h3>{rank}. {name}</h3><span class="score-badge">{score} ({pct:.1}%)</span><div class="test-meta"><span class="meta-item ticket">{ticket}</span>"#,
        class = scored.priority.css_class(),
        name = escape_html(&record.name),
        score = scored.weighted_score,
        pct = scored.percent_of_max(data.max_weighted_score),
        ticket = escape_html(record.ticket_id.as_deref().unwrap_or("N/A")),
    );
    if let Some(section) = &record.section {
        let _ = write!(
            card,
            r#"<span class="meta-item section">{}</span>"#,
            escape_html(section)
        );
    }
    card.push_str(r#"</div></div><div class="test-card-body">"#);

    if !record.description.is_empty() {
        let _ = write!(
            card,
            r#"<div class="test-description">{}</div>"#,
            escape_html(&record.description)
        );
    }

    card.push_str(r#"<ul class="factor-list">"#);
    if !record.automatable {
        let _ = write!(
            card,
            r#"<li class="factor-item"><span class="factor-score">No</span> <span class="factor-name">{}</span></li>"#,
            escape_html(&data.gate.display_name)
        );
    }
    for factor in &data.factors {
        let Some(value) = record.factor_values.get(&factor.key) else {
            continue;
        };
        let description = factor
            .option_label(*value)
            .map(|label| format!(r#" <span class="factor-description">{}</span>"#, escape_html(label)))
            .unwrap_or_default();
        let _ = write!(
            card,
            r#"<li class="factor-item"><span class="factor-score">{value}</span> <span class="factor-name">{}:</span>{description}</li>"#,
            escape_html(&factor.display_name)
        );
    }
    card.push_str("</ul>");

    if !record.yesno_answers.is_empty() {
        card.push_str(r#"<ul class="answer-list">"#);
        for (question, answer) in &record.yesno_answers {
            let _ = write!(
                card,
                r#"<li class="answer-item">{}: {}</li>"#,
                escape_html(question),
                if *answer { "Yes" } else { "No" }
            );
        }
        card.push_str("</ul>");
    }

    card.push_str("</div></div>");
    card
}

/// JSON array for the table script, made safe for embedding in `<script>`.
fn test_data_json(data: &ReportData) -> String {
    let json = serde_json::to_string(&data.test_data_rows()).unwrap_or_else(|_| "[]".to_string());
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitute_leaves_unknown_tokens_and_does_not_rescan_values() {
        let values = HashMap::from([("name", "{{other}}".to_string())]);
        let rendered = substitute("a {{name}} b {{missing}} c {{", &values);
        assert_eq!(rendered, "a {{other}} b {{missing}} c {{");
    }

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn template_carries_every_token() {
        for token in TEMPLATE_TOKENS {
            let placeholder = format!("{{{{{token}}}}}");
            assert!(
                REPORT_TEMPLATE.contains(&placeholder),
                "template is missing {placeholder}"
            );
        }
    }

    #[test]
    fn bar_chart_reports_empty_series() {
        assert!(bar_chart(&[]).contains("No data"));
        let bars = [
            Bar {
                label: "a".into(),
                value: 2,
                class: None,
            },
            Bar {
                label: "b".into(),
                value: 4,
                class: Some("high".into()),
            },
        ];
        let html = bar_chart(&bars);
        assert!(html.contains("width: 50.0%"));
        assert!(html.contains("bar-fill high"));
    }
}
