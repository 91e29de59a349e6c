use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::io::Read;

/// A weighted scoring input with a bounded integer range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factor {
    pub key: String,
    pub display_name: String,
    pub weight: u32,
    pub min_value: u32,
    pub max_value: u32,
    /// Human readable meaning of selected values, shown on report cards.
    #[serde(default)]
    pub options: BTreeMap<u32, String>,
}

impl Factor {
    pub fn contains(&self, value: u32) -> bool {
        (self.min_value..=self.max_value).contains(&value)
    }

    pub fn option_label(&self, value: u32) -> Option<&str> {
        self.options.get(&value).map(String::as_str)
    }
}

/// The yes/no factor that routes a test straight to Won't Automate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatableGate {
    pub key: String,
    pub display_name: String,
}

/// Informational context question; never contributes to the score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YesNoQuestion {
    pub question_text: String,
    #[serde(default)]
    pub impact_note: String,
}

/// Catalog of scoring factors, the automatable gate and context questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorRegistry {
    gate: AutomatableGate,
    factors: Vec<Factor>,
    questions: Vec<YesNoQuestion>,
}

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    gate: AutomatableGate,
    factors: Vec<Factor>,
    #[serde(default)]
    questions: Vec<YesNoQuestion>,
}

impl FactorRegistry {
    pub fn new(
        gate: AutomatableGate,
        factors: Vec<Factor>,
        questions: Vec<YesNoQuestion>,
    ) -> Result<Self, RegistryError> {
        if factors.is_empty() {
            return Err(RegistryError::NoFactors);
        }

        let mut keys = HashSet::new();
        keys.insert(gate.key.clone());
        for factor in &factors {
            if !keys.insert(factor.key.clone()) {
                return Err(RegistryError::DuplicateKey(factor.key.clone()));
            }
            if factor.weight == 0 {
                return Err(RegistryError::ZeroWeight(factor.key.clone()));
            }
            if factor.min_value > factor.max_value {
                return Err(RegistryError::InvertedRange {
                    key: factor.key.clone(),
                    min: factor.min_value,
                    max: factor.max_value,
                });
            }
        }

        if checked_max_score(&factors).is_none() {
            return Err(RegistryError::ScoreOverflow);
        }

        let mut texts = HashSet::new();
        for question in &questions {
            if !texts.insert(question.question_text.as_str()) {
                return Err(RegistryError::DuplicateQuestion(
                    question.question_text.clone(),
                ));
            }
        }

        Ok(Self {
            gate,
            factors,
            questions,
        })
    }

    /// Load a catalog from its JSON form (`gate`, `factors`, `questions`).
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, RegistryError> {
        let document: RegistryDocument = serde_json::from_reader(reader)?;
        Self::new(document.gate, document.factors, document.questions)
    }

    /// The catalog the QA team started with.
    pub fn reference() -> Self {
        let gate = AutomatableGate {
            key: "can_be_automated".to_string(),
            display_name: "Can it be Automated".to_string(),
        };

        const FACTORS: &[(&str, &str, u32, [&str; 3])] = &[
            (
                "regression_frequency",
                "Regression Frequency",
                3,
                ["Semi-annual", "Quarterly", "Always"],
            ),
            (
                "customer_impact",
                "Customer Impact",
                3,
                [
                    "Minor functionality",
                    "Important functionality",
                    "Critical business process",
                ],
            ),
            (
                "manual_effort",
                "Manual Test Effort",
                2,
                ["< 5 minutes", "5-20 minutes", "> 20 minutes"],
            ),
            (
                "automation_complexity",
                "Automation Complexity",
                2,
                [
                    "Very difficult to automate",
                    "Moderate effort",
                    "Easy to automate",
                ],
            ),
            (
                "existing_framework",
                "Existing Framework",
                2,
                [
                    "No Page Objects",
                    "Some Page Objects",
                    "Established Page Objects",
                ],
            ),
            (
                "angular_framework",
                "Angular Framework",
                1,
                [
                    "Old Angular JS framework",
                    "Migrating soon",
                    "New Angular framework",
                ],
            ),
            (
                "repetitive",
                "Repetitive",
                1,
                [
                    "Not repetitive",
                    "Somewhat repetitive",
                    "Highly repetitive",
                ],
            ),
        ];

        let factors = FACTORS
            .iter()
            .map(|(key, name, weight, [low, mid, high])| Factor {
                key: key.to_string(),
                display_name: name.to_string(),
                weight: *weight,
                min_value: 0,
                max_value: 5,
                options: BTreeMap::from([
                    (1, low.to_string()),
                    (3, mid.to_string()),
                    (5, high.to_string()),
                ]),
            })
            .collect();

        Self {
            gate,
            factors,
            questions: Vec::new(),
        }
    }

    /// Returns a copy of the catalog with one more context question.
    pub fn with_question(mut self, question: YesNoQuestion) -> Result<Self, RegistryError> {
        if self
            .questions
            .iter()
            .any(|existing| existing.question_text == question.question_text)
        {
            return Err(RegistryError::DuplicateQuestion(question.question_text));
        }
        self.questions.push(question);
        Ok(self)
    }

    pub fn gate(&self) -> &AutomatableGate {
        &self.gate
    }

    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    pub fn factor(&self, key: &str) -> Option<&Factor> {
        self.factors.iter().find(|factor| factor.key == key)
    }

    pub fn questions(&self) -> &[YesNoQuestion] {
        &self.questions
    }

    pub fn question(&self, text: &str) -> Option<&YesNoQuestion> {
        self.questions
            .iter()
            .find(|question| question.question_text == text)
    }

    /// Construction guarantees this fits in `u32`, so every per-record sum
    /// computed against the catalog does too.
    pub fn max_weighted_score(&self) -> u32 {
        checked_max_score(&self.factors).unwrap_or(u32::MAX)
    }
}

fn checked_max_score(factors: &[Factor]) -> Option<u32> {
    factors.iter().try_fold(0u32, |total, factor| {
        factor
            .max_value
            .checked_mul(factor.weight)
            .and_then(|contribution| total.checked_add(contribution))
    })
}

impl Default for FactorRegistry {
    fn default() -> Self {
        Self::reference()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("factor catalog must declare at least one scoring factor")]
    NoFactors,
    #[error("factor key '{0}' is declared more than once")]
    DuplicateKey(String),
    #[error("factor '{0}' must carry a positive weight")]
    ZeroWeight(String),
    #[error("factor '{key}' has min_value {min} above max_value {max}")]
    InvertedRange { key: String, min: u32, max: u32 },
    #[error("factor weights and ranges allow scores beyond {}", u32::MAX)]
    ScoreOverflow,
    #[error("question '{0}' is declared more than once")]
    DuplicateQuestion(String),
    #[error("invalid factor catalog document: {0}")]
    Document(#[from] serde_json::Error),
}
