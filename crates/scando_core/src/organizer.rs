//! crates/scando_core/src/organizer.rs
//!
//! The application facade. Owns the store and preferences behind async locks,
//! runs document submissions in the background and patches each placeholder
//! by id once its analysis settles.

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::analysis::AnalysisError;
use crate::calendar;
use crate::domain::{AnalysisMode, Document, DocumentId, Priority, SourceFile, TaskId, Upload};
use crate::ports::{
    AnalysisService, KeyValueStore, NotificationService, PortError, PortResult,
};
use crate::preferences::Preferences;
use crate::store::{DeleteOutcome, DocumentStore};

pub const DUE_TODAY_TITLE: &str = "ScanDo Tasks Due Today";
pub const NOTIFICATIONS_ENABLED_TITLE: &str = "ScanDo Notifications Enabled";

/// How a background submission settled.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Completed { task_count: usize },
    Failed(AnalysisError),
    /// The placeholder was deleted or cleared before the analysis finished.
    Discarded,
    /// The document id was already taken; nothing was analyzed.
    Rejected,
}

/// Handle to an in-flight submission, keyed by its placeholder id.
pub struct Submission {
    pub document_id: DocumentId,
    /// `None` when the placeholder was refused and no analysis was started.
    completion: Option<JoinHandle<SubmissionOutcome>>,
}

impl Submission {
    /// Waits for the analysis to settle. Dropping the handle instead lets it
    /// finish on its own.
    pub async fn wait(self) -> PortResult<SubmissionOutcome> {
        let Some(completion) = self.completion else {
            return Ok(SubmissionOutcome::Rejected);
        };
        completion
            .await
            .map_err(|e| PortError::Unexpected(format!("Submission task failed: {}", e)))
    }
}

#[derive(Clone)]
pub struct Organizer {
    store: Arc<Mutex<DocumentStore>>,
    preferences: Arc<Mutex<Preferences>>,
    analysis: Arc<dyn AnalysisService>,
    notifier: Arc<dyn NotificationService>,
}

impl Organizer {
    /// Loads persisted state from `storage` and wires in the collaborators.
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        analysis: Arc<dyn AnalysisService>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        let store = DocumentStore::load(storage.clone());
        let preferences = Preferences::load(storage);
        info!("Loaded {} document(s) from storage.", store.len());
        Self {
            store: Arc::new(Mutex::new(store)),
            preferences: Arc::new(Mutex::new(preferences)),
            analysis,
            notifier,
        }
    }

    //-------------------------------------------------------------------------------------
    // Submission
    //-------------------------------------------------------------------------------------

    /// Records a processing placeholder and returns at once; the analysis runs
    /// on a spawned task. Submission itself never fails: analysis failures end
    /// up as an error-status document.
    pub async fn submit(&self, upload: Upload, mode: AnalysisMode) -> Submission {
        self.submit_as(DocumentId::new(), upload, mode).await
    }

    /// Like [`Organizer::submit`], with a caller-chosen id. An id that is
    /// already taken is refused and no analysis is started.
    pub async fn submit_as(
        &self,
        document_id: DocumentId,
        upload: Upload,
        mode: AnalysisMode,
    ) -> Submission {
        let placeholder = Document::placeholder(document_id, &upload, chrono::Utc::now());
        if !self.store.lock().await.insert_placeholder(placeholder, &upload) {
            warn!(
                "Not analyzing '{}': document id {} is already taken",
                upload.file_name, document_id
            );
            return Submission {
                document_id,
                completion: None,
            };
        }
        info!(
            "Accepted '{}' ({}, {:?} mode) as document {}",
            upload.file_name, upload.mime_type, mode, document_id
        );

        let completion = tokio::spawn(resolve_submission(
            self.store.clone(),
            self.analysis.clone(),
            document_id,
            upload,
            mode,
        ));

        Submission {
            document_id,
            completion: Some(completion),
        }
    }

    /// The uploaded file of document `id`, if it is still stored.
    pub async fn source_file(&self, id: DocumentId) -> PortResult<Option<SourceFile>> {
        self.store.lock().await.source_file(id)
    }

    //-------------------------------------------------------------------------------------
    // Store Access
    //-------------------------------------------------------------------------------------

    /// Runs `f` against the store under its lock.
    pub async fn read<R>(&self, f: impl FnOnce(&DocumentStore) -> R) -> R {
        let store = self.store.lock().await;
        f(&store)
    }

    pub async fn documents(&self) -> Vec<Document> {
        self.read(|store| store.documents().to_vec()).await
    }

    pub async fn document(&self, id: DocumentId) -> Option<Document> {
        self.read(|store| store.document(id).cloned()).await
    }

    pub async fn toggle_task_completion(&self, document_id: DocumentId, task_id: &TaskId) -> bool {
        self.store
            .lock()
            .await
            .toggle_task_completion(document_id, task_id)
    }

    pub async fn set_task_priority(
        &self,
        document_id: DocumentId,
        task_id: &TaskId,
        priority: Priority,
    ) -> bool {
        self.store
            .lock()
            .await
            .set_task_priority(document_id, task_id, priority)
    }

    pub async fn cycle_task_priority(
        &self,
        document_id: DocumentId,
        task_id: &TaskId,
    ) -> Option<Priority> {
        self.store
            .lock()
            .await
            .cycle_task_priority(document_id, task_id)
    }

    pub async fn set_task_due_date(
        &self,
        document_id: DocumentId,
        task_id: &TaskId,
        due_date: Option<NaiveDate>,
    ) -> bool {
        self.store
            .lock()
            .await
            .set_task_due_date(document_id, task_id, due_date)
    }

    pub async fn delete_document(&self, id: DocumentId) -> DeleteOutcome {
        let outcome = self.store.lock().await.delete_document(id);
        if outcome.removed {
            info!("Deleted document {}", id);
        }
        outcome
    }

    pub async fn clear_all(&self) {
        self.store.lock().await.clear_all();
        info!("Cleared all documents.");
    }

    pub async fn select(&self, id: DocumentId) -> bool {
        self.store.lock().await.select(id)
    }

    pub async fn clear_selection(&self) {
        self.store.lock().await.clear_selection();
    }

    pub async fn selected(&self) -> Option<DocumentId> {
        self.read(|store| store.selected()).await
    }

    //-------------------------------------------------------------------------------------
    // Subscription and Notifications
    //-------------------------------------------------------------------------------------

    pub async fn is_subscribed(&self) -> bool {
        self.preferences.lock().await.is_subscribed()
    }

    /// Deep analysis is reserved for subscribers.
    pub async fn can_use(&self, mode: AnalysisMode) -> bool {
        match mode {
            AnalysisMode::Fast => true,
            AnalysisMode::Deep => self.is_subscribed().await,
        }
    }

    pub async fn activate_subscription(&self) {
        self.preferences.lock().await.activate_subscription();
    }

    pub async fn handle_checkout_return(&self, query: &str) -> bool {
        self.preferences.lock().await.handle_checkout_return(query)
    }

    pub async fn notifications_enabled(&self) -> bool {
        self.preferences.lock().await.notifications_enabled()
    }

    /// Stores the opt-in and confirms it with a notification when switched on.
    pub async fn set_notifications_enabled(&self, enabled: bool) -> PortResult<()> {
        let was_enabled = {
            let mut preferences = self.preferences.lock().await;
            let was_enabled = preferences.notifications_enabled();
            preferences.set_notifications_enabled(enabled);
            was_enabled
        };
        if enabled && !was_enabled {
            self.notifier
                .notify(NOTIFICATIONS_ENABLED_TITLE, "You will be reminded of tasks due today.")?;
        }
        Ok(())
    }

    /// Sends a reminder for tasks due on `today` and returns how many there are.
    ///
    /// Nothing is sent when notifications are off or nothing is due.
    pub async fn notify_due_today(&self, today: NaiveDate) -> PortResult<usize> {
        let due = self
            .read(|store| calendar::todays_tasks(store.documents(), today).count())
            .await;
        if due == 0 || !self.notifications_enabled().await {
            return Ok(due);
        }
        let body = if due == 1 {
            "You have 1 task due today.".to_string()
        } else {
            format!("You have {} tasks due today.", due)
        };
        self.notifier.notify(DUE_TODAY_TITLE, &body)?;
        Ok(due)
    }
}

/// The background half of `submit`: one analysis, one patch keyed by id.
async fn resolve_submission(
    store: Arc<Mutex<DocumentStore>>,
    analysis: Arc<dyn AnalysisService>,
    document_id: DocumentId,
    upload: Upload,
    mode: AnalysisMode,
) -> SubmissionOutcome {
    match analysis.analyze_document(&upload, mode).await {
        Ok(result) => {
            let task_count = result.tasks.len();
            if store.lock().await.complete(document_id, result) {
                info!(
                    "Document {} completed with {} task(s).",
                    document_id, task_count
                );
                SubmissionOutcome::Completed { task_count }
            } else {
                warn!("Document {} vanished before its analysis finished.", document_id);
                SubmissionOutcome::Discarded
            }
        }
        Err(e) => {
            error!(
                "Analysis of document {} failed: {} ({})",
                document_id,
                e,
                e.detail().unwrap_or("no detail")
            );
            if store.lock().await.fail(document_id, &e.to_string()) {
                SubmissionOutcome::Failed(e)
            } else {
                SubmissionOutcome::Discarded
            }
        }
    }
}
