//! CSV encoding of test records with a fixed column contract.
//!
//! Output columns: Rank, Priority, Ticket ID, Section, Test Name, Description,
//! one `Question: ...` column per catalog question, Total Score, Raw Score, the
//! automatable gate, one column per scoring factor, Test ID. Input column order
//! is free, unknown columns are ignored and the derived columns (Rank,
//! Priority, scores) are recomputed rather than read.

mod columns;
mod normalizer;
mod parser;
mod writer;

use crate::workflows::prioritization::{ScoringEngine, ScoringError, TestId, TestRecord};
use std::io::{Read, Write};

/// Reads and writes test records against one scoring configuration.
#[derive(Debug, Clone)]
pub struct TestCsvCodec {
    engine: ScoringEngine,
}

impl TestCsvCodec {
    pub fn new(engine: ScoringEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Output header row for the configured catalog.
    pub fn headers(&self) -> Vec<String> {
        columns::output_headers(self.engine.registry())
    }

    pub fn encode<W: Write>(&self, records: &[TestRecord], writer: W) -> Result<(), CodecError> {
        writer::write_records(writer, records, &self.engine)
    }

    pub fn encode_to_string(&self, records: &[TestRecord]) -> Result<String, CodecError> {
        let mut buffer = Vec::new();
        self.encode(records, &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| {
            CodecError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
        })
    }

    /// Records come back in file order. Every malformed row is reported.
    pub fn decode<R: Read>(&self, reader: R) -> Result<Vec<TestRecord>, CodecError> {
        parser::parse_records(reader, self.engine.registry())
    }

    pub fn decode_str(&self, input: &str) -> Result<Vec<TestRecord>, CodecError> {
        self.decode(input.as_bytes())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },
    #[error("row {row}: column '{column}' has invalid value '{value}'")]
    InvalidFieldFormat {
        row: usize,
        column: String,
        value: String,
    },
    #[error("row {row}: test id {id} appears more than once")]
    DuplicateTestId { row: usize, id: TestId },
    #[error("test {test_id} does not match the factor catalog: {detail}")]
    IncompatibleFactorSet { test_id: TestId, detail: String },
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to read or write CSV: {0}")]
    Io(#[from] std::io::Error),
    #[error("{} problems found: {}", .0.len(), summarize(.0))]
    Rows(Vec<CodecError>),
}

impl CodecError {
    /// Single problems are returned as-is; several are batched in `Rows`.
    fn collect(mut errors: Vec<CodecError>) -> Self {
        if errors.len() == 1 {
            if let Some(error) = errors.pop() {
                return error;
            }
        }
        Self::Rows(errors)
    }

    /// Flattened list of the individual problems.
    pub fn problems(&self) -> Vec<&CodecError> {
        match self {
            Self::Rows(errors) => errors.iter().collect(),
            other => vec![other],
        }
    }
}

fn summarize(errors: &[CodecError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
