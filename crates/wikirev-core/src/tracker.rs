//! Naming & hierarchy tracker
//!
//! Remembers, per remote page id, the display name last materialized in
//! the target and the parent name last written into its file. The driver
//! asks for a `StepPlan` before touching the target and records the plan
//! once the step's files are written.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::events::{classify, parse_parent_comment, PageEvent};
use crate::model::{RevisionDetails, RevisionRecord};

/// What the target currently holds for one page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// A child page whose `parent:` line must follow a rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildUpdate {
    pub page_id: String,
    /// The child's current materialized name (its file)
    pub name: String,
}

/// Resolved naming and parenting for one revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPlan {
    pub event: PageEvent,
    /// Name the page has at this revision
    pub name: String,
    /// Parent to write into the page file
    pub parent: Option<String>,
    /// No name was tracked for the page before this revision
    pub first_seen: bool,
    /// Children to patch when `event` is a rename
    pub children: Vec<ChildUpdate>,
}

impl StepPlan {
    pub fn rename(&self) -> Option<(&str, &str)> {
        match &self.event {
            PageEvent::Rename { from, to } => Some((from.as_str(), to.as_str())),
            _ => None,
        }
    }
}

/// Keyed store of per-page naming and parenting state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageTracker {
    pages: BTreeMap<String, PageState>,
}

impl PageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, page_id: &str) -> Option<&PageState> {
        self.pages.get(page_id)
    }

    pub fn name(&self, page_id: &str) -> Option<&str> {
        self.pages.get(page_id).map(|p| p.name.as_str())
    }

    pub fn parent(&self, page_id: &str) -> Option<&str> {
        self.pages.get(page_id).and_then(|p| p.parent.as_deref())
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PageState)> {
        self.pages.iter()
    }

    /// Pages whose recorded parent is `parent_name`, ordered by page id
    pub fn children_of(&self, parent_name: &str) -> Vec<ChildUpdate> {
        self.pages
            .iter()
            .filter(|(_, state)| state.parent.as_deref() == Some(parent_name))
            .map(|(page_id, state)| ChildUpdate {
                page_id: page_id.clone(),
                name: state.name.clone(),
            })
            .collect()
    }

    /// Resolve name, rename status and parent for a revision
    pub fn plan(&self, record: &RevisionRecord, details: &RevisionDetails) -> StepPlan {
        let tracked = self.pages.get(&record.page_id);
        let name = details.name_or(&record.page_name).to_string();
        let event = classify(tracked.map(|t| t.name.as_str()), &name, &record.comment);

        // A parent notice applies even when the same revision renames the page
        let parent = parse_parent_comment(&record.comment)
            .or_else(|| tracked.and_then(|t| t.parent.clone()));

        let children = match &event {
            PageEvent::Rename { from, .. } => self
                .children_of(from)
                .into_iter()
                .filter(|c| c.page_id != record.page_id)
                .collect(),
            _ => Vec::new(),
        };

        StepPlan {
            event,
            name,
            parent,
            first_seen: tracked.is_none(),
            children,
        }
    }

    /// Record a plan after its files were written
    pub fn record(&mut self, page_id: &str, plan: &StepPlan) {
        if let Some((_, to)) = plan.rename() {
            for child in &plan.children {
                if let Some(state) = self.pages.get_mut(&child.page_id) {
                    state.parent = Some(to.to_string());
                }
            }
        }
        let state = self.pages.entry(page_id.to_string()).or_default();
        state.name = plan.name.clone();
        state.parent = plan.parent.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(page_id: &str, page_name: &str, rev: &str, comment: &str) -> RevisionRecord {
        RevisionRecord {
            page_id: page_id.to_string(),
            page_name: page_name.to_string(),
            revision_id: rev.to_string(),
            flag: "S".to_string(),
            date: 0,
            user: "alice".to_string(),
            comment: comment.to_string(),
        }
    }

    fn named(name: &str) -> RevisionDetails {
        RevisionDetails {
            title: None,
            unixname: Some(name.to_string()),
        }
    }

    #[test]
    fn test_first_revision_is_first_seen() {
        let tracker = PageTracker::new();
        let plan = tracker.plan(&rec("p1", "alpha", "1", ""), &named("alpha"));
        assert!(plan.first_seen);
        assert_eq!(plan.event, PageEvent::NoEvent);
        assert_eq!(plan.name, "alpha");
        assert_eq!(plan.parent, None);
    }

    #[test]
    fn test_reparent_is_recorded_and_carried_forward() {
        let mut tracker = PageTracker::new();
        let plan = tracker.plan(
            &rec("p1", "alpha", "1", "Parent page set to: \"beta\"."),
            &named("alpha"),
        );
        tracker.record("p1", &plan);
        assert_eq!(tracker.parent("p1"), Some("beta"));

        let next = tracker.plan(&rec("p1", "alpha", "2", "edit"), &named("alpha"));
        assert_eq!(next.parent.as_deref(), Some("beta"));
        assert!(!next.first_seen);
    }

    #[test]
    fn test_rename_collects_children_and_record_repoints_them() {
        let mut tracker = PageTracker::new();
        let delta = tracker.plan(&rec("d", "delta2", "1", ""), &named("delta"));
        tracker.record("d", &delta);
        let eps = tracker.plan(
            &rec("e", "epsilon", "2", "Parent page set to: \"delta\"."),
            &named("epsilon"),
        );
        tracker.record("e", &eps);

        let rename = tracker.plan(&rec("d", "delta2", "5", ""), &named("delta2"));
        assert_eq!(rename.rename(), Some(("delta", "delta2")));
        assert_eq!(
            rename.children,
            vec![ChildUpdate {
                page_id: "e".to_string(),
                name: "epsilon".to_string()
            }]
        );

        tracker.record("d", &rename);
        assert_eq!(tracker.name("d"), Some("delta2"));
        assert_eq!(tracker.parent("e"), Some("delta2"));
    }

    #[test]
    fn test_rename_with_parent_notice_takes_new_parent() {
        let mut tracker = PageTracker::new();
        let first = tracker.plan(&rec("b", "b2", "1", ""), &named("b"));
        tracker.record("b", &first);

        let plan = tracker.plan(
            &rec("b", "b2", "2", "Parent page set to: \"root\"."),
            &named("b2"),
        );

        assert_eq!(plan.rename(), Some(("b", "b2")));
        assert_eq!(plan.parent.as_deref(), Some("root"));
        tracker.record("b", &plan);
        assert_eq!(tracker.parent("b"), Some("root"));
    }

    #[test]
    fn test_missing_details_name_falls_back_to_catalog_name() {
        let tracker = PageTracker::new();
        let plan = tracker.plan(&rec("p1", "alpha", "1", ""), &RevisionDetails::default());
        assert_eq!(plan.name, "alpha");
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut tracker = PageTracker::new();
        let plan = tracker.plan(&rec("p1", "alpha", "1", ""), &named("alpha"));
        tracker.record("p1", &plan);

        let json = serde_json::to_string(&tracker).unwrap();
        assert_eq!(json, r#"{"p1":{"name":"alpha"}}"#);
        let back: PageTracker = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tracker);
    }
}
