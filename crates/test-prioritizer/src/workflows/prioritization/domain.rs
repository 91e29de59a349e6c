use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of a test record, assigned once and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(pub u64);

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Priority tiers, ordered from most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Highest,
    High,
    Medium,
    Low,
    Lowest,
    WontAutomate,
}

impl Priority {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Highest,
            Self::High,
            Self::Medium,
            Self::Low,
            Self::Lowest,
            Self::WontAutomate,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Highest => "Highest",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Lowest => "Lowest",
            Self::WontAutomate => "Won't Automate",
        }
    }

    pub const fn recommendation(self) -> &'static str {
        match self {
            Self::Highest => "Recommended for immediate automation",
            Self::High => "Recommended for second phase automation",
            Self::Medium => "Recommended for third phase automation",
            Self::Low => "Consider for later phases or keep as manual tests",
            Self::Lowest => "Not recommended for automation",
            Self::WontAutomate => "These tests have been identified as not possible to automate",
        }
    }

    /// Position in [`Priority::ordered`], used for per-tier count arrays.
    pub const fn index(self) -> usize {
        match self {
            Self::Highest => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
            Self::Lowest => 4,
            Self::WontAutomate => 5,
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let normalized = css_class_for_label(value.trim());
        match normalized.as_str() {
            "highest" => Some(Self::Highest),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            "lowest" => Some(Self::Lowest),
            "won-t-automate" | "wont-automate" | "can-t-automate" => Some(Self::WontAutomate),
            _ => None,
        }
    }

    pub fn css_class(self) -> String {
        css_class_for_label(self.label())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lowercases a priority label and collapses every non-alphanumeric run into a
/// single hyphen. The HTML report script applies the same transform client-side.
pub fn css_class_for_label(label: &str) -> String {
    let mut class = String::with_capacity(label.len());
    let mut in_separator = false;
    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() {
            class.push(ch.to_ascii_lowercase());
            in_separator = false;
        } else if !in_separator {
            class.push('-');
            in_separator = true;
        }
    }
    class
}

/// A single test case under consideration for automation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    pub id: TestId,
    #[serde(default)]
    pub ticket_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub description: String,
    pub factor_values: BTreeMap<String, u32>,
    #[serde(default)]
    pub yesno_answers: BTreeMap<String, bool>,
    pub automatable: bool,
}

impl TestRecord {
    pub fn from_draft(id: TestId, draft: TestRecordDraft) -> Self {
        let TestRecordDraft {
            ticket_id,
            name,
            section,
            description,
            factor_values,
            yesno_answers,
            automatable,
        } = draft;

        Self {
            id,
            ticket_id: non_blank(ticket_id),
            name,
            section: non_blank(section),
            description,
            factor_values,
            yesno_answers,
            automatable,
        }
    }
}

/// Submission payload for a new test; the catalog assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecordDraft {
    #[serde(default)]
    pub ticket_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub description: String,
    pub factor_values: BTreeMap<String, u32>,
    #[serde(default)]
    pub yesno_answers: BTreeMap<String, bool>,
    #[serde(default = "default_automatable")]
    pub automatable: bool,
}

fn default_automatable() -> bool {
    true
}

/// Field-wise edit. Absent fields keep their current value; `factor_values`
/// and `yesno_answers` are replaced wholesale when present. For the optional
/// text fields an explicit `null` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecordUpdate {
    #[serde(default, deserialize_with = "explicit_null")]
    pub ticket_id: Option<Option<String>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub section: Option<Option<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub factor_values: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    pub yesno_answers: Option<BTreeMap<String, bool>>,
    #[serde(default)]
    pub automatable: Option<bool>,
}

impl TestRecordUpdate {
    /// Produce the edited record without touching the original.
    pub fn apply_to(&self, record: &TestRecord) -> TestRecord {
        let mut updated = record.clone();
        if let Some(ticket_id) = &self.ticket_id {
            updated.ticket_id = non_blank(ticket_id.clone());
        }
        if let Some(name) = &self.name {
            updated.name = name.clone();
        }
        if let Some(section) = &self.section {
            updated.section = non_blank(section.clone());
        }
        if let Some(description) = &self.description {
            updated.description = description.clone();
        }
        if let Some(values) = &self.factor_values {
            updated.factor_values = values.clone();
        }
        if let Some(answers) = &self.yesno_answers {
            updated.yesno_answers = answers.clone();
        }
        if let Some(automatable) = self.automatable {
            updated.automatable = automatable;
        }
        updated
    }
}

/// Blank optional text is stored as absent, matching an empty CSV cell.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(Some(non_blank(value)))
}
