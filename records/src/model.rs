//! Data types stored in and returned by a [`crate::RecordStore`].

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub type ClassId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("vibe rating {0} is outside 1..=5")]
pub struct VibeOutOfRange(pub i64);

/// How the class felt overall, from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct VibeRating(u8);

impl VibeRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, VibeOutOfRange> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(VibeOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for VibeRating {
    type Error = VibeOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VibeRating> for i64 {
    fn from(value: VibeRating) -> Self {
        value.0 as i64
    }
}

impl fmt::Display for VibeRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Energy {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl Energy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Energy::Low => "Low",
            Energy::Medium => "Medium",
            Energy::High => "High",
            Energy::VeryHigh => "Very High",
        }
    }
}

impl FromStr for Energy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Energy::Low),
            "medium" => Ok(Energy::Medium),
            "high" => Ok(Energy::High),
            "very high" | "very-high" | "very_high" => Ok(Energy::VeryHigh),
            other => Err(format!("unknown energy level '{other}'")),
        }
    }
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured notes about how the class was sequenced.
///
/// Keys this type does not know about are kept in `extra` and written back
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceNotes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub standing: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savasana_minutes: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SequenceNotes {
    pub fn is_empty(&self) -> bool {
        self.warmup.is_none()
            && self.standing.is_empty()
            && self.peak.is_none()
            && self.cooldown.is_none()
            && self.savasana_minutes.is_none()
            && self.extra.is_empty()
    }

    /// `(key, value)` pairs in a stable order for display.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Some(w) = &self.warmup {
            out.push(("warmup".into(), w.clone()));
        }
        if !self.standing.is_empty() {
            out.push(("standing".into(), self.standing.join(", ")));
        }
        if let Some(p) = &self.peak {
            out.push(("peak".into(), p.clone()));
        }
        if let Some(c) = &self.cooldown {
            out.push(("cooldown".into(), c.clone()));
        }
        if let Some(m) = self.savasana_minutes {
            out.push(("savasana_minutes".into(), m.to_string()));
        }
        for (key, value) in &self.extra {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out.push((key.clone(), text));
        }
        out
    }
}

/// One logged class as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub id: ClassId,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub day_of_week: String,
    pub location: Option<String>,
    pub class_type: Option<String>,
    pub is_heated: Option<bool>,
    pub theme: Option<String>,
    pub theme_category: Option<String>,
    pub peak_pose: Option<String>,
    pub energy: Option<Energy>,
    pub student_count: u32,
    pub vibe_rating: VibeRating,
    pub intention: Option<String>,
    pub notes: Option<String>,
    pub sequence: Option<SequenceNotes>,
}

/// A class as entered by the instructor, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClass {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    /// Studio display name; must exist in the locations table.
    pub location: String,
    /// Class type display name; must exist in the class types table.
    pub class_type: String,
    /// Free text. Linked to a known theme when the name matches ignoring case.
    pub theme: Option<String>,
    pub intention: Option<String>,
    pub peak_pose: Option<String>,
    pub energy: Option<Energy>,
    pub student_count: u32,
    pub vibe_rating: VibeRating,
    pub notes: Option<String>,
    pub sequence: Option<SequenceNotes>,
}

impl NewClass {
    pub fn day_of_week(&self) -> String {
        self.date.format("%A").to_string()
    }

    pub(crate) fn sequence_json(&self) -> Result<Option<String>, serde_json::Error> {
        match &self.sequence {
            Some(notes) if !notes.is_empty() => serde_json::to_string(notes).map(Some),
            _ => Ok(None),
        }
    }
}

impl From<ClassRecord> for NewClass {
    /// The editable fields of a stored class. A missing location or class
    /// type becomes an empty name, which the store rejects on write.
    fn from(record: ClassRecord) -> Self {
        Self {
            date: record.date,
            time: record.time,
            location: record.location.unwrap_or_default(),
            class_type: record.class_type.unwrap_or_default(),
            theme: record.theme,
            intention: record.intention,
            peak_pose: record.peak_pose,
            energy: record.energy,
            student_count: record.student_count,
            vibe_rating: record.vibe_rating,
            notes: record.notes,
            sequence: record.sequence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub neighborhood: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassType {
    pub id: i64,
    pub class_name: String,
    pub duration_minutes: u32,
    pub is_heated: bool,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdeaKind {
    Theme,
    Sequence,
}

/// A theme or sequence previously produced by the language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedIdea {
    pub kind: IdeaKind,
    /// Theme name or peak pose.
    pub title: String,
    /// Teaching approach or sequence outline.
    pub body: String,
    pub created_at: DateTime<Utc>,
}
