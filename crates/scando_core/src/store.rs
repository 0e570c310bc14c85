//! crates/scando_core/src/store.rs
//!
//! The Document/Task Store: the single source of truth for scanned documents
//! and the only writer of the persisted collection.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::analysis::AnalysisResult;
use crate::domain::{Document, DocumentId, Priority, SourceFile, Task, TaskId, Upload};
use crate::ports::{KeyValueStore, PortResult};

/// Storage key holding the JSON-serialized document collection.
pub const DOCUMENTS_KEY: &str = "scando_docs";

/// What `delete_document` observably did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    pub removed: bool,
    /// The deleted document was the selected one, and the selection is now empty.
    pub selection_cleared: bool,
}

/// An ordered, most-recent-first collection of documents.
///
/// Every mutation that changes the collection rewrites it in full to the
/// injected [`KeyValueStore`]. Uploaded files are written once under their
/// own key and never take part in that rewrite. Mutations that reference
/// unknown ids are no-ops.
pub struct DocumentStore {
    documents: Vec<Document>,
    selected: Option<DocumentId>,
    storage: Arc<dyn KeyValueStore>,
}

impl DocumentStore {
    /// Loads the persisted collection, falling back to an empty one when the
    /// key is absent, unreadable, or holds invalid JSON.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let documents = match storage.get(DOCUMENTS_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<Document>>(&raw).unwrap_or_else(|e| {
                warn!("Discarding corrupt document collection: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read document collection, starting empty: {}", e);
                Vec::new()
            }
        };

        Self {
            documents,
            selected: None,
            storage,
        }
    }

    //-------------------------------------------------------------------------------------
    // Reads
    //-------------------------------------------------------------------------------------

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn selected(&self) -> Option<DocumentId> {
        self.selected
    }

    /// Reads back the uploaded file of document `id`.
    pub fn source_file(&self, id: DocumentId) -> PortResult<Option<SourceFile>> {
        let Some(document) = self.document(id) else {
            return Ok(None);
        };
        let stored = self.storage.get(&document.original_file_url)?;
        Ok(stored.and_then(|data_url| {
            let file = SourceFile::from_data_url(&data_url);
            if file.is_none() {
                warn!("Stored file for document {} is not a data URL", id);
            }
            file
        }))
    }

    pub fn selected_document(&self) -> Option<&Document> {
        self.selected.and_then(|id| self.document(id))
    }

    //-------------------------------------------------------------------------------------
    // Lifecycle
    //-------------------------------------------------------------------------------------

    /// Prepends a freshly created placeholder and stores its uploaded file
    /// under the placeholder's source key.
    ///
    /// Returns `false` without touching the collection or the stored files if
    /// the id is already taken.
    pub fn insert_placeholder(&mut self, document: Document, upload: &Upload) -> bool {
        if self.document(document.id).is_some() {
            warn!("Refusing duplicate document id {}", document.id);
            return false;
        }
        if let Err(e) = self.storage.set(&document.original_file_url, &upload.data_url()) {
            error!("Failed to store the file of document {}: {}", document.id, e);
        }
        self.documents.insert(0, document);
        self.persist();
        true
    }

    /// Patches the placeholder `id` with an analysis result.
    pub fn complete(&mut self, id: DocumentId, result: AnalysisResult) -> bool {
        let changed = self
            .document_mut(id)
            .map(|doc| doc.complete(result))
            .unwrap_or(false);
        self.after_mutation(changed, "complete", id)
    }

    /// Marks the placeholder `id` as failed with a presentable message.
    pub fn fail(&mut self, id: DocumentId, message: &str) -> bool {
        let changed = self
            .document_mut(id)
            .map(|doc| doc.fail(message))
            .unwrap_or(false);
        self.after_mutation(changed, "fail", id)
    }

    //-------------------------------------------------------------------------------------
    // Task Mutations
    //-------------------------------------------------------------------------------------

    pub fn toggle_task_completion(&mut self, document_id: DocumentId, task_id: &TaskId) -> bool {
        let changed = self
            .task_mut(document_id, task_id)
            .map(|task| task.is_completed = !task.is_completed)
            .is_some();
        self.after_mutation(changed, "toggle", document_id)
    }

    /// Overwrites the priority unconditionally.
    pub fn set_task_priority(
        &mut self,
        document_id: DocumentId,
        task_id: &TaskId,
        priority: Priority,
    ) -> bool {
        let changed = self
            .task_mut(document_id, task_id)
            .map(|task| task.priority = priority)
            .is_some();
        self.after_mutation(changed, "set_priority", document_id)
    }

    /// Advances the priority one step and returns the new value.
    pub fn cycle_task_priority(
        &mut self,
        document_id: DocumentId,
        task_id: &TaskId,
    ) -> Option<Priority> {
        let next = self.task_mut(document_id, task_id).map(|task| {
            task.priority = task.priority.cycle();
            task.priority
        });
        self.after_mutation(next.is_some(), "cycle_priority", document_id);
        next
    }

    pub fn set_task_due_date(
        &mut self,
        document_id: DocumentId,
        task_id: &TaskId,
        due_date: Option<NaiveDate>,
    ) -> bool {
        let changed = self
            .task_mut(document_id, task_id)
            .map(|task| task.due_date = due_date)
            .is_some();
        self.after_mutation(changed, "set_due_date", document_id)
    }

    //-------------------------------------------------------------------------------------
    // Removal and Selection
    //-------------------------------------------------------------------------------------

    /// Removes a document with all of its tasks, clearing the selection if it
    /// pointed at the removed document.
    pub fn delete_document(&mut self, id: DocumentId) -> DeleteOutcome {
        let removed = match self.documents.iter().position(|doc| doc.id == id) {
            Some(index) => {
                let document = self.documents.remove(index);
                self.remove_source(&document);
                true
            }
            None => false,
        };

        let selection_cleared = self.selected == Some(id);
        if selection_cleared {
            self.selected = None;
        }

        self.after_mutation(removed, "delete", id);
        DeleteOutcome {
            removed,
            selection_cleared,
        }
    }

    /// Empties the collection and the selection, and drops every stored key
    /// the collection owned.
    pub fn clear_all(&mut self) {
        for document in self.documents.drain(..) {
            if let Err(e) = self.storage.remove(&document.original_file_url) {
                error!("Failed to remove the file of document {}: {}", document.id, e);
            }
        }
        self.selected = None;
        if let Err(e) = self.storage.remove(DOCUMENTS_KEY) {
            error!("Failed to remove document collection: {}", e);
        }
    }

    /// Selects a document. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: DocumentId) -> bool {
        if self.document(id).is_none() {
            debug!("Ignoring selection of unknown document {}", id);
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    //-------------------------------------------------------------------------------------
    // Internals
    //-------------------------------------------------------------------------------------

    fn document_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.iter_mut().find(|doc| doc.id == id)
    }

    fn task_mut(&mut self, document_id: DocumentId, task_id: &TaskId) -> Option<&mut Task> {
        self.document_mut(document_id)
            .and_then(|doc| doc.task_mut(task_id))
    }

    fn remove_source(&self, document: &Document) {
        if let Err(e) = self.storage.remove(&document.original_file_url) {
            error!("Failed to remove the file of document {}: {}", document.id, e);
        }
    }

    fn after_mutation(&self, changed: bool, operation: &str, id: DocumentId) -> bool {
        if changed {
            self.persist();
        } else {
            debug!("{} on document {} matched nothing; ignored", operation, id);
        }
        changed
    }

    /// Writes the whole collection. Failures are logged, never propagated:
    /// the in-memory state stays authoritative for the session.
    fn persist(&self) {
        let serialized = match serde_json::to_string(&self.documents) {
            Ok(serialized) => serialized,
            Err(e) => {
                error!("Failed to serialize document collection: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(DOCUMENTS_KEY, &serialized) {
            error!("Failed to persist document collection: {}", e);
        }
    }
}
