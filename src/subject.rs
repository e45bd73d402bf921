// 📝 Subject - One row of input + edit policy
// Marks are unset or in [0, 100]; credits are never negative.
// Out-of-range edits are discarded, never clamped.

use crate::grade::{classify, Grade};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Credits given to a freshly added subject
pub const DEFAULT_CREDITS: f64 = 4.0;

pub const MIN_MARKS: f64 = 0.0;
pub const MAX_MARKS: f64 = 100.0;

// ============================================================================
// SUBJECT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Stable identity (UUID), never reused
    #[serde(default = "new_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Missing or empty in older saves loads as 0
    #[serde(default, with = "credits_format")]
    pub credits: f64,

    /// `None` = no mark entered yet. Stored as `""` on disk.
    #[serde(default, with = "marks_format")]
    pub marks: Option<f64>,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Result of applying one edit to a subject field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// Input was invalid; the field kept its prior value
    Rejected,
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied)
    }
}

impl Subject {
    /// Empty row with default credits and unset marks
    pub fn new() -> Self {
        Subject {
            id: new_id(),
            name: String::new(),
            credits: DEFAULT_CREDITS,
            marks: None,
        }
    }

    /// Derived grade, `None` while marks are unset
    pub fn grade(&self) -> Option<Grade> {
        self.marks.map(classify)
    }

    /// Names are free text and accepted as-is
    pub fn set_name(&mut self, input: &str) -> EditOutcome {
        self.name = input.to_string();
        EditOutcome::Applied
    }

    pub fn set_credits(&mut self, input: &str) -> EditOutcome {
        match parse_credits(input) {
            Some(credits) => {
                self.credits = credits;
                EditOutcome::Applied
            }
            None => {
                debug!(subject = %self.id, input, "rejected credits edit");
                EditOutcome::Rejected
            }
        }
    }

    /// Blank input unsets the mark
    pub fn set_marks(&mut self, input: &str) -> EditOutcome {
        match parse_marks(input) {
            Some(marks) => {
                self.marks = marks;
                EditOutcome::Applied
            }
            None => {
                debug!(subject = %self.id, input, "rejected marks edit");
                EditOutcome::Rejected
            }
        }
    }

    /// Reset name and marks. Credits and identity are kept.
    pub fn clear(&mut self) {
        self.name.clear();
        self.marks = None;
    }

    /// True when nothing has been entered in this row
    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.marks.is_none()
    }

    /// Check invariants on data that did not come through the edit policy
    /// (e.g. loaded from storage)
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("subject id is empty".to_string());
        }
        if !self.credits.is_finite() || self.credits < 0.0 {
            return Err(format!("subject {}: invalid credits {}", self.id, self.credits));
        }
        if let Some(marks) = self.marks {
            if !is_valid_marks(marks) {
                return Err(format!("subject {}: marks {} out of range", self.id, marks));
            }
        }
        Ok(())
    }
}

impl Default for Subject {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// EDIT POLICY
// ============================================================================

fn is_valid_marks(marks: f64) -> bool {
    marks.is_finite() && (MIN_MARKS..=MAX_MARKS).contains(&marks)
}

fn parse_number(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// `Some(None)` = unset, `Some(Some(m))` = valid mark, `None` = reject
pub fn parse_marks(input: &str) -> Option<Option<f64>> {
    if input.trim().is_empty() {
        return Some(None);
    }
    parse_number(input)
        .filter(|marks| is_valid_marks(*marks))
        .map(Some)
}

/// Credits have no unset state, so blank input is rejected too
pub fn parse_credits(input: &str) -> Option<f64> {
    parse_number(input).filter(|credits| *credits >= 0.0)
}

/// Format a number the way it was most likely typed: `4` not `4.0`
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// ============================================================================
// SERDE HELPERS
// ============================================================================

/// Number, or `""` when unset. `null` and a missing field also load as unset.
mod marks_format {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawMarks {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(marks: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match marks {
            Some(value) => serializer.serialize_f64(*value),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<RawMarks>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawMarks::Number(value)) => Ok(Some(value)),
            Some(RawMarks::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(RawMarks::Text(text)) => text
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid marks value: {:?}", text))),
        }
    }
}

/// Always written as a number. An empty string (left behind by a cleared
/// credits field in older saves) loads as 0, same as a missing field.
mod credits_format {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCredits {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(credits: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(*credits)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match RawCredits::deserialize(deserializer)? {
            RawCredits::Number(value) => Ok(value),
            RawCredits::Text(text) if text.trim().is_empty() => Ok(0.0),
            RawCredits::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("invalid credits value: {:?}", text))),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
