use chrono::{Duration, NaiveDate};

use crate::model::ClassRecord;

/// Which classes a read should return. Unset fields do not restrict.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassFilter {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub location: Option<String>,
    pub class_type: Option<String>,
    pub theme: Option<String>,
    /// Case-insensitive substring over theme, personal notes and peak pose.
    pub search: Option<String>,
    pub min_students: Option<u32>,
}

impl ClassFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classes on or after `today - days`.
    pub fn last_days(mut self, days: i64, today: NaiveDate) -> Self {
        self.since = Some(today - Duration::days(days));
        self
    }

    pub fn since(mut self, date: NaiveDate) -> Self {
        self.since = Some(date);
        self
    }

    pub fn until(mut self, date: NaiveDate) -> Self {
        self.until = Some(date);
        self
    }

    pub fn location(mut self, name: impl Into<String>) -> Self {
        self.location = Some(name.into());
        self
    }

    pub fn class_type(mut self, name: impl Into<String>) -> Self {
        self.class_type = Some(name.into());
        self
    }

    pub fn theme(mut self, name: impl Into<String>) -> Self {
        self.theme = Some(name.into());
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn min_students(mut self, count: u32) -> Self {
        self.min_students = Some(count);
        self
    }

    /// Whether the search term, if any, occurs in the theme, notes or peak
    /// pose. Case is folded with full Unicode rules and the term is matched
    /// literally, so `%` and `_` carry no special meaning.
    pub fn matches_search(&self, record: &ClassRecord) -> bool {
        let Some(term) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();
        [&record.theme, &record.notes, &record.peak_pose]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
    }

    /// In-process equivalent of the SQL `WHERE` clause.
    pub fn matches(&self, record: &ClassRecord) -> bool {
        if self.since.is_some_and(|d| record.date < d) {
            return false;
        }
        if self.until.is_some_and(|d| record.date > d) {
            return false;
        }
        if let Some(loc) = &self.location {
            if record.location.as_ref() != Some(loc) {
                return false;
            }
        }
        if let Some(ct) = &self.class_type {
            if record.class_type.as_ref() != Some(ct) {
                return false;
            }
        }
        if let Some(theme) = &self.theme {
            if record.theme.as_ref() != Some(theme) {
                return false;
            }
        }
        if self.min_students.is_some_and(|m| record.student_count < m) {
            return false;
        }
        self.matches_search(record)
    }
}
