//! Free-text search and category filtering.
//!
//! [`apply`] is a pure projection from the fetched collection plus the
//! current [`FilterCriteria`] to the displayed subset.  It never mutates its
//! input, keeps the source order (stable filter, no re-sort), and an empty
//! result is a perfectly valid outcome — the UI decides whether that means
//! "nothing matched" or "nothing fetched" by looking at the unfiltered
//! collection.

use crate::source::item::{Category, NewsItem};
use crate::source::ALL_CATEGORIES;

/// Category selector: everything, or one exact category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

/// Cycle order for the `c` keybinding, matching the chips the original UI
/// offered.
const CYCLE: [Category; 6] = [
    Category::Economy,
    Category::Environment,
    Category::Science,
    Category::Technology,
    Category::Sports,
    Category::Politics,
];

impl CategoryFilter {
    /// Label shown in the status bar ("الكل" for no restriction).
    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Only(cat) => cat.as_arabic(),
        }
    }

    /// The next selector in the fixed cycle: All → اقتصاد → … → سياسة → All.
    pub fn next(&self) -> CategoryFilter {
        match self {
            CategoryFilter::All => CategoryFilter::Only(CYCLE[0].clone()),
            CategoryFilter::Only(cat) => match CYCLE.iter().position(|c| c == cat) {
                Some(i) if i + 1 < CYCLE.len() => CategoryFilter::Only(CYCLE[i + 1].clone()),
                _ => CategoryFilter::All,
            },
        }
    }
}

/// Current search term and category selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search_term: String,
    pub category: CategoryFilter,
}

/// Keep an item iff the search term appears (case-insensitively) in its
/// title or description, and its category matches the selector.
pub fn apply(items: &[NewsItem], criteria: &FilterCriteria) -> Vec<NewsItem> {
    let needle = criteria.search_term.to_lowercase();
    items
        .iter()
        .filter(|item| {
            let matches_search = needle.is_empty()
                || item.title.to_lowercase().contains(&needle)
                || item.description.to_lowercase().contains(&needle);
            let matches_category = match &criteria.category {
                CategoryFilter::All => true,
                CategoryFilter::Only(cat) => &item.category == cat,
            };
            matches_search && matches_category
        })
        .cloned()
        .collect()
}
