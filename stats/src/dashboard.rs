use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use records::ClassRecord;
use serde::{Deserialize, Serialize};

use crate::round1;

const TREND_WINDOW: usize = 3;

/// Headline numbers for the dashboard.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_classes: usize,
    pub total_students: u64,
    /// `None` until a class is logged.
    pub avg_vibe: Option<f64>,
    pub locations_taught: usize,
    pub unique_themes: usize,
}

pub fn overview(records: &[ClassRecord]) -> Overview {
    if records.is_empty() {
        return Overview::default();
    }
    let total_students = records.iter().map(|r| u64::from(r.student_count)).sum();
    let vibe_sum: u64 = records.iter().map(|r| u64::from(r.vibe_rating.get())).sum();
    let locations: HashSet<_> = records.iter().filter_map(|r| r.location.as_deref()).collect();
    let themes: HashSet<_> = records.iter().filter_map(|r| r.theme.as_deref()).collect();

    Overview {
        total_classes: records.len(),
        total_students,
        avg_vibe: Some(round1(vibe_sum as f64 / records.len() as f64)),
        locations_taught: locations.len(),
        unique_themes: themes.len(),
    }
}

/// One class on the student-count timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub location: Option<String>,
    pub students: u32,
    /// Mean of this class and up to two before it.
    pub rolling_avg: f64,
}

/// Classes in chronological order with a three-class rolling average.
pub fn student_trend(records: &[ClassRecord]) -> Vec<TrendPoint> {
    let mut ordered: Vec<&ClassRecord> = records.iter().collect();
    ordered.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.time.cmp(&b.time))
            .then(a.id.cmp(&b.id))
    });

    ordered
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let start = (i + 1).saturating_sub(TREND_WINDOW);
            let window = &ordered[start..=i];
            let sum: u64 = window.iter().map(|r| u64::from(r.student_count)).sum();
            TrendPoint {
                date: record.date,
                time: record.time,
                location: record.location.clone(),
                students: record.student_count,
                rolling_avg: sum as f64 / window.len() as f64,
            }
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StudentRange {
    pub average: f64,
    pub max: u32,
    pub min: u32,
}

pub fn student_range(records: &[ClassRecord]) -> Option<StudentRange> {
    let max = records.iter().map(|r| r.student_count).max()?;
    let min = records.iter().map(|r| r.student_count).min()?;
    let sum: u64 = records.iter().map(|r| u64::from(r.student_count)).sum();
    Some(StudentRange {
        average: sum as f64 / records.len() as f64,
        max,
        min,
    })
}
