use serde::Serialize;
use stats::{GroupSummary, Overview, StudentRange, TrendPoint};

/// Everything the dashboard view shows for one filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub overview: Overview,
    pub by_location: Vec<GroupSummary>,
    pub by_class_type: Vec<GroupSummary>,
    /// At most [`Dashboard::TOP_THEMES`] groups.
    pub top_themes: Vec<GroupSummary>,
    pub trend: Vec<TrendPoint>,
    pub range: Option<StudentRange>,
}

impl Dashboard {
    pub const TOP_THEMES: usize = 5;
}
