use crate::types::{Dataset, Record};
use crate::vocabulary::ALL;
use serde::Serialize;

/// Everything the view depends on besides the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub county: String,
    pub category: String,
    pub show_labels: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            county: ALL.to_string(),
            category: ALL.to_string(),
            show_labels: false,
        }
    }
}

impl FilterState {
    /// Exact, case-sensitive match; `"all"` lifts the constraint.
    pub fn matches(&self, record: &Record) -> bool {
        let county_match = self.county == ALL || record.county() == self.county;
        let category_match = self.category == ALL || record.category() == self.category;
        county_match && category_match
    }
}

/// Records matching both selections, in dataset order.
pub fn compute_view(state: &FilterState, dataset: &Dataset) -> Vec<Record> {
    dataset
        .iter()
        .filter(|record| state.matches(record))
        .cloned()
        .collect()
}
