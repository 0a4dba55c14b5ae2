use crate::types::{Dataset, FilterOption, VocabularyEntry};
use serde::Serialize;
use std::collections::BTreeMap;

pub const ALL: &str = "all";
pub const ALL_COUNTIES: &str = "All Counties";
pub const ALL_CATEGORIES: &str = "All Categories";
const UNKNOWN: &str = "Unknown";

/// Distinct counties and categories with their visited counts, sorted by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Vocabulary {
    pub counties: Vec<VocabularyEntry>,
    pub categories: Vec<VocabularyEntry>,
}

pub fn build_vocabulary(dataset: &Dataset) -> Vocabulary {
    let mut counties: BTreeMap<String, usize> = BTreeMap::new();
    let mut categories: BTreeMap<String, usize> = BTreeMap::new();

    for record in dataset {
        let visited = usize::from(record.is_visited());
        *counties.entry(or_unknown(record.county())).or_default() += visited;
        *categories.entry(or_unknown(record.category())).or_default() += visited;
    }

    Vocabulary {
        counties: into_entries(counties),
        categories: into_entries(categories),
    }
}

fn or_unknown(value: &str) -> String {
    if value.is_empty() { UNKNOWN.to_string() } else { value.to_string() }
}

fn into_entries(counts: BTreeMap<String, usize>) -> Vec<VocabularyEntry> {
    counts
        .into_iter()
        .map(|(value, count)| VocabularyEntry { value, count })
        .collect()
}

/// A filter dropdown: the synthetic "all" option followed by one option per entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dropdown {
    pub options: Vec<FilterOption>,
    // None when the requested value isn't one of the options
    pub selected: Option<String>,
}

impl Dropdown {
    pub fn populate(all_label: &str, entries: &[VocabularyEntry]) -> Self {
        let mut options = Vec::with_capacity(entries.len() + 1);
        options.push(FilterOption {
            value: ALL.to_string(),
            label: all_label.to_string(),
        });
        options.extend(entries.iter().map(|e| FilterOption {
            value: e.value.clone(),
            label: format!("{} ({})", e.value, e.count),
        }));

        Self {
            options,
            selected: Some(ALL.to_string()),
        }
    }

    /// Set the selection verbatim. An unknown value leaves nothing selected.
    pub fn select(&mut self, value: &str) {
        self.selected = self
            .options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.value.clone());
    }

    /// What a `<select>` reports: the selected value, or `""` with no selection.
    pub fn value(&self) -> &str {
        self.selected.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;

    fn record(county: &str, category: &str, visited: &str) -> Record {
        [("County", county), ("Category", category), ("Visited", visited)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_sorted_with_visited_counts() {
        let dataset = vec![
            record("Yorkshire", "A", "yes"),
            record("Kent", "B", " YES "),
            record("Yorkshire", "B", "no"),
            record("Kent", "A", "Yes"),
        ];
        let vocab = build_vocabulary(&dataset);

        assert_eq!(
            vocab.counties,
            vec![
                VocabularyEntry { value: "Kent".into(), count: 2 },
                VocabularyEntry { value: "Yorkshire".into(), count: 1 },
            ]
        );
        assert_eq!(vocab.categories[0], VocabularyEntry { value: "A".into(), count: 2 });
        assert_eq!(vocab.categories[1], VocabularyEntry { value: "B".into(), count: 1 });
    }

    #[test]
    fn test_unvisited_values_still_listed() {
        let dataset = vec![record("Cornwall", "", "no"), Record::default()];
        let vocab = build_vocabulary(&dataset);

        assert_eq!(vocab.counties, vec![
            VocabularyEntry { value: "Cornwall".into(), count: 0 },
            VocabularyEntry { value: "Unknown".into(), count: 0 },
        ]);
        assert_eq!(vocab.categories, vec![VocabularyEntry { value: "Unknown".into(), count: 0 }]);
    }

    #[test]
    fn test_counts_sum_to_visited_records() {
        let dataset = vec![
            record("A", "x", "yes"),
            record("B", "y", "nope"),
            record("B", "x", "yEs"),
            record("", "z", "yes"),
        ];
        let visited = dataset.iter().filter(|r| r.is_visited()).count();
        let vocab = build_vocabulary(&dataset);

        assert_eq!(vocab.counties.iter().map(|e| e.count).sum::<usize>(), visited);
        assert_eq!(vocab.categories.iter().map(|e| e.count).sum::<usize>(), visited);
    }

    #[test]
    fn test_dropdown_labels_and_selection() {
        let entries = vec![VocabularyEntry { value: "Yorkshire".into(), count: 1 }];
        let mut dropdown = Dropdown::populate("All Counties", &entries);

        assert_eq!(dropdown.options[0].value, ALL);
        assert_eq!(dropdown.options[0].label, "All Counties");
        assert_eq!(dropdown.options[1].label, "Yorkshire (1)");
        assert_eq!(dropdown.value(), ALL);

        dropdown.select("Yorkshire");
        assert_eq!(dropdown.value(), "Yorkshire");

        dropdown.select("Atlantis");
        assert_eq!(dropdown.selected, None);
        assert_eq!(dropdown.value(), "");
    }
}
