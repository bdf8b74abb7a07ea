use serde::{Deserialize, Serialize};

/// Category value meaning "every category"
pub const ALL_CATEGORIES: &str = ".";

/// Filter against the whole source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFilter {
    /// Category name, or `"."` for all
    pub category: Option<String>,
    /// Space separated tags; a page matches when it carries any of them
    pub tags: Option<String>,
    /// Creator of the page
    pub created_by: Option<String>,
}

impl PageFilter {
    /// Category to query, defaulting to all categories
    pub fn category_or_all(&self) -> &str {
        self.category.as_deref().unwrap_or(ALL_CATEGORIES)
    }

    /// Whether the category filter accepts everything
    pub fn all_categories(&self) -> bool {
        self.category_or_all() == ALL_CATEGORIES
    }

    /// Individual tags of the tag filter
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|t| t.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Fill unset fields from a previously recorded filter
    pub fn or_remembered(self, remembered: &PageFilter) -> PageFilter {
        PageFilter {
            category: self.category.or_else(|| remembered.category.clone()),
            tags: self.tags.or_else(|| remembered.tags.clone()),
            created_by: self.created_by.or_else(|| remembered.created_by.clone()),
        }
    }
}

/// Which pages a catalog build covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSelector {
    /// Explicit page names
    Pages(Vec<String>),
    /// Every page matching the filter
    Filter(PageFilter),
}

impl Default for PageSelector {
    fn default() -> Self {
        PageSelector::Filter(PageFilter::default())
    }
}
