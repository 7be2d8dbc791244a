use std::{collections::HashMap, fmt, str::FromStr};

use records::ClassRecord;
use serde::{Deserialize, Serialize};

/// Group key for classes whose grouping field is missing or blank.
pub const UNSPECIFIED: &str = "unspecified";

/// Field of a [`ClassRecord`] to group by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Theme,
    Location,
    Pose,
    ClassType,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Theme => "theme",
            Dimension::Location => "location",
            Dimension::Pose => "pose",
            Dimension::ClassType => "class_type",
        }
    }

    /// The record's value along this dimension, or `None` when missing.
    pub fn key_of<'a>(&self, record: &'a ClassRecord) -> Option<&'a str> {
        let value = match self {
            Dimension::Theme => record.theme.as_deref(),
            Dimension::Location => record.location.as_deref(),
            Dimension::Pose => record.peak_pose.as_deref(),
            Dimension::ClassType => record.class_type.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "theme" => Ok(Dimension::Theme),
            "location" | "studio" => Ok(Dimension::Location),
            "pose" | "peak_pose" | "peak-pose" => Ok(Dimension::Pose),
            "class_type" | "class-type" | "type" => Ok(Dimension::ClassType),
            other => Err(format!("unknown dimension '{other}'")),
        }
    }
}

/// Statistics for one group of classes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub key: String,
    pub count: usize,
    pub avg_students: f64,
    pub avg_vibe: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Count,
    AvgStudents,
    AvgVibe,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Count, Metric::AvgStudents, Metric::AvgVibe];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Count => "count",
            Metric::AvgStudents => "avg_students",
            Metric::AvgVibe => "avg_vibe",
        }
    }
}

/// One `(group, metric, value)` triple.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub group_key: String,
    pub metric: Metric,
    pub metric_value: f64,
}

impl AggregateRow {
    pub fn metric_name(&self) -> &'static str {
        self.metric.name()
    }
}

impl GroupSummary {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Count => self.count as f64,
            Metric::AvgStudents => self.avg_students,
            Metric::AvgVibe => self.avg_vibe,
        }
    }

    /// This group's metrics in [`Metric::ALL`] order.
    pub fn rows(&self) -> impl Iterator<Item = AggregateRow> + '_ {
        Metric::ALL.into_iter().map(move |metric| AggregateRow {
            group_key: self.key.clone(),
            metric,
            metric_value: self.value(metric),
        })
    }
}

/// Flatten groups into rows, keeping group order.
pub fn to_rows(groups: &[GroupSummary]) -> Vec<AggregateRow> {
    groups.iter().flat_map(|group| group.rows()).collect()
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    students: u64,
    vibe: u64,
}

/// Group `records` by `dimension`.
///
/// Keys compare as exact, case-sensitive strings; records with no value land
/// in a single [`UNSPECIFIED`] group. Output is sorted by count descending,
/// then key ascending, so the same records in any order give the same result.
pub fn aggregate(records: &[ClassRecord], dimension: Dimension) -> Vec<GroupSummary> {
    let mut groups: HashMap<&str, Accumulator> = HashMap::new();
    for record in records {
        let key = dimension.key_of(record).unwrap_or(UNSPECIFIED);
        let acc = groups.entry(key).or_default();
        acc.count += 1;
        acc.students += u64::from(record.student_count);
        acc.vibe += u64::from(record.vibe_rating.get());
    }

    let mut summaries: Vec<GroupSummary> = groups
        .into_iter()
        .map(|(key, acc)| GroupSummary {
            key: key.to_string(),
            count: acc.count,
            avg_students: acc.students as f64 / acc.count as f64,
            avg_vibe: acc.vibe as f64 / acc.count as f64,
        })
        .collect();
    summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    summaries
}
