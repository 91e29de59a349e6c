use super::columns::{InputColumns, TEST_ID, TEST_NAME};
use super::normalizer::parse_flag;
use super::CodecError;
use crate::workflows::prioritization::{FactorRegistry, TestId, TestRecord};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;

/// Decode every row, collecting all row-scoped failures before giving up.
/// Header cells are trimmed; data cells are kept verbatim so free text
/// survives a round trip. Numbers and flags tolerate surrounding spaces.
pub(crate) fn parse_records<R: Read>(
    reader: R,
    registry: &FactorRegistry,
) -> Result<Vec<TestRecord>, CodecError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = InputColumns::resolve(headers.iter(), registry).map_err(|missing| {
        CodecError::collect(
            missing
                .into_iter()
                .map(|column| CodecError::MissingColumn { column })
                .collect(),
        )
    })?;

    let mut records = Vec::new();
    let mut failures = Vec::new();
    let mut seen: HashMap<TestId, usize> = HashMap::new();

    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        let line = row
            .position()
            .map(|position| position.line() as usize)
            .unwrap_or(index + 2);

        match parse_row(&row, line, &columns) {
            Ok(record) => {
                if seen.insert(record.id, line).is_some() {
                    failures.push(CodecError::DuplicateTestId {
                        row: line,
                        id: record.id,
                    });
                } else {
                    records.push(record);
                }
            }
            Err(mut errors) => failures.append(&mut errors),
        }
    }

    if failures.is_empty() {
        Ok(records)
    } else {
        Err(CodecError::collect(failures))
    }
}

fn parse_row(
    row: &csv::StringRecord,
    line: usize,
    columns: &InputColumns,
) -> Result<TestRecord, Vec<CodecError>> {
    let mut errors = Vec::new();
    let cell = |position: usize| row.get(position).unwrap_or("");
    let optional = |position: Option<usize>| {
        position
            .map(cell)
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string)
    };
    let mut invalid = |column: &str, value: &str| {
        errors.push(CodecError::InvalidFieldFormat {
            row: line,
            column: column.to_string(),
            value: value.to_string(),
        });
    };

    let raw_id = cell(columns.test_id);
    let id = raw_id.trim().parse::<u64>().ok().map(TestId);
    if id.is_none() {
        invalid(TEST_ID, raw_id);
    }

    let name = cell(columns.name);
    if name.trim().is_empty() {
        invalid(TEST_NAME, name);
    }

    let raw_gate = cell(columns.gate);
    let automatable = parse_flag(raw_gate, true);
    if automatable.is_none() {
        invalid(&columns.gate_header, raw_gate);
    }

    let mut factor_values = BTreeMap::new();
    for (key, header, position) in &columns.factors {
        let raw = cell(*position);
        match raw.trim().parse::<u32>() {
            Ok(value) => {
                factor_values.insert(key.clone(), value);
            }
            Err(_) => invalid(header, raw),
        }
    }

    let mut yesno_answers = BTreeMap::new();
    for (question, header, position) in &columns.questions {
        let raw = cell(*position);
        if raw.trim().is_empty() {
            continue;
        }
        match parse_flag(raw, false) {
            Some(answer) => {
                yesno_answers.insert(question.clone(), answer);
            }
            None => invalid(header, raw),
        }
    }

    match (id, automatable) {
        (Some(id), Some(automatable)) if errors.is_empty() => Ok(TestRecord {
            id,
            ticket_id: optional(columns.ticket_id),
            name: name.to_string(),
            section: optional(columns.section),
            description: columns
                .description
                .map(cell)
                .unwrap_or_default()
                .to_string(),
            factor_values,
            yesno_answers,
            automatable,
        }),
        _ => Err(errors),
    }
}
