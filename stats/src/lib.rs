//! Summary statistics over logged classes.
//!
//! [`aggregate`] groups classes along a [`Dimension`] and reports how often
//! each group was taught, how many students it drew and how it felt.
//! [`overview`] and [`student_trend`] back the dashboard.

pub mod aggregate;
pub mod dashboard;

pub use aggregate::{
    aggregate, to_rows, AggregateRow, Dimension, GroupSummary, Metric, UNSPECIFIED,
};
pub use dashboard::{overview, student_range, student_trend, Overview, StudentRange, TrendPoint};

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
