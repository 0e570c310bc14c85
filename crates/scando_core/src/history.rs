//! crates/scando_core/src/history.rs
//!
//! Derived per-document views: archive ordering, progress and category grouping.

use serde::Serialize;

use crate::domain::{Document, Priority, Task};

pub const DEFAULT_CATEGORY: &str = "General";

/// Documents newest first by creation time.
pub fn history(documents: &[Document]) -> Vec<&Document> {
    let mut sorted: Vec<&Document> = documents.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

/// Documents whose every task is completed. A document without tasks counts.
pub fn fully_completed_count(documents: &[Document]) -> usize {
    documents
        .iter()
        .filter(|doc| doc.tasks.iter().all(|task| task.is_completed))
        .count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentProgress {
    pub completed: usize,
    pub total: usize,
    pub has_pending_high_priority: bool,
}

impl DocumentProgress {
    pub fn of(document: &Document) -> Self {
        Self {
            completed: document.tasks.iter().filter(|t| t.is_completed).count(),
            total: document.tasks.len(),
            has_pending_high_priority: document
                .tasks
                .iter()
                .any(|t| t.priority == Priority::High && !t.is_completed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub tasks: Vec<&'a Task>,
}

/// Groups a document's tasks by category label, in first-appearance order.
pub fn tasks_by_category(document: &Document) -> Vec<CategoryGroup<'_>> {
    let mut groups: Vec<CategoryGroup<'_>> = Vec::new();
    for task in &document.tasks {
        let category = task.category.as_deref().unwrap_or(DEFAULT_CATEGORY);
        match groups.iter_mut().find(|group| group.category == category) {
            Some(group) => group.tasks.push(task),
            None => groups.push(CategoryGroup {
                category,
                tasks: vec![task],
            }),
        }
    }
    groups
}
