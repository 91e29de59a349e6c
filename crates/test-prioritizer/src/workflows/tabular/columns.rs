use super::normalizer::normalize_header;
use crate::workflows::prioritization::FactorRegistry;
use std::collections::HashMap;

pub(crate) const RANK: &str = "Rank";
pub(crate) const PRIORITY: &str = "Priority";
pub(crate) const TICKET_ID: &str = "Ticket ID";
pub(crate) const SECTION: &str = "Section";
pub(crate) const TEST_NAME: &str = "Test Name";
pub(crate) const DESCRIPTION: &str = "Description";
pub(crate) const TOTAL_SCORE: &str = "Total Score";
pub(crate) const RAW_SCORE: &str = "Raw Score";
pub(crate) const TEST_ID: &str = "Test ID";
pub(crate) const QUESTION_PREFIX: &str = "Question: ";

pub(crate) fn question_header(question: &str) -> String {
    format!("{QUESTION_PREFIX}{question}")
}

/// Output header row for a catalog, in contract order.
pub(crate) fn output_headers(registry: &FactorRegistry) -> Vec<String> {
    let mut headers: Vec<String> = [RANK, PRIORITY, TICKET_ID, SECTION, TEST_NAME, DESCRIPTION]
        .iter()
        .map(|header| header.to_string())
        .collect();
    headers.extend(
        registry
            .questions()
            .iter()
            .map(|question| question_header(&question.question_text)),
    );
    headers.push(TOTAL_SCORE.to_string());
    headers.push(RAW_SCORE.to_string());
    headers.push(registry.gate().display_name.clone());
    headers.extend(
        registry
            .factors()
            .iter()
            .map(|factor| factor.display_name.clone()),
    );
    headers.push(TEST_ID.to_string());
    headers
}

/// Column positions resolved from an input header row. Order is irrelevant;
/// unrecognised columns are simply not looked up.
#[derive(Debug)]
pub(crate) struct InputColumns {
    pub(crate) test_id: usize,
    pub(crate) name: usize,
    pub(crate) ticket_id: Option<usize>,
    pub(crate) section: Option<usize>,
    pub(crate) description: Option<usize>,
    pub(crate) gate: usize,
    pub(crate) gate_header: String,
    /// (factor key, header text, position) in catalog order.
    pub(crate) factors: Vec<(String, String, usize)>,
    /// (question text, header text, position) for the catalog questions present.
    pub(crate) questions: Vec<(String, String, usize)>,
}

impl InputColumns {
    /// Resolve every column the catalog needs. Returns the display names of
    /// all missing required columns on failure.
    pub(crate) fn resolve<'h, I>(headers: I, registry: &FactorRegistry) -> Result<Self, Vec<String>>
    where
        I: IntoIterator<Item = &'h str>,
    {
        let mut index: HashMap<String, usize> = HashMap::new();
        for (position, header) in headers.into_iter().enumerate() {
            index.entry(normalize_header(header)).or_insert(position);
        }
        let lookup = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| index.get(&normalize_header(name)).copied())
        };

        let mut missing = Vec::new();
        let mut required = |names: &[&str], display: &str| {
            let found = lookup(names);
            if found.is_none() {
                missing.push(display.to_string());
            }
            found.unwrap_or_default()
        };

        let test_id = required(&[TEST_ID], TEST_ID);
        let name = required(&[TEST_NAME], TEST_NAME);
        let gate = registry.gate();
        let gate = required(
            &[gate.display_name.as_str(), gate.key.as_str()],
            &gate.display_name,
        );
        let factors = registry
            .factors()
            .iter()
            .map(|factor| {
                let position = required(
                    &[factor.display_name.as_str(), factor.key.as_str()],
                    &factor.display_name,
                );
                (factor.key.clone(), factor.display_name.clone(), position)
            })
            .collect();

        if !missing.is_empty() {
            return Err(missing);
        }

        let questions = registry
            .questions()
            .iter()
            .filter_map(|question| {
                let header = question_header(&question.question_text);
                lookup(&[header.as_str()])
                    .map(|position| (question.question_text.clone(), header, position))
            })
            .collect();

        Ok(Self {
            test_id,
            name,
            ticket_id: lookup(&[TICKET_ID]),
            section: lookup(&[SECTION]),
            description: lookup(&[DESCRIPTION]),
            gate,
            gate_header: registry.gate().display_name.clone(),
            factors,
            questions,
        })
    }
}
