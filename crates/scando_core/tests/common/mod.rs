//! In-memory fakes for every port, shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use scando_core::{
    AnalysisError, AnalysisMode, AnalysisResult, AnalysisService, Document, DocumentId,
    ExtractedTask, KeyValueStore, NotificationService, PortResult, Priority, Upload,
};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;

//=========================================================================================
// Storage
//=========================================================================================

#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    writes: Mutex<usize>,
}

impl MemoryStorage {
    pub fn with(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage
            .values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        storage
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        *self.writes.lock().unwrap() += 1;
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

//=========================================================================================
// Analysis
//=========================================================================================

type Reply = Result<AnalysisResult, AnalysisError>;

/// Analysis fake whose replies are released by the test, keyed by file name.
#[derive(Default)]
pub struct ScriptedAnalysis {
    pending: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    calls: Mutex<Vec<(String, AnalysisMode)>>,
}

impl ScriptedAnalysis {
    /// Registers `file_name` and returns the sender that settles its analysis.
    pub fn expect(&self, file_name: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap()
            .insert(file_name.to_string(), rx);
        tx
    }

    pub fn calls(&self) -> Vec<(String, AnalysisMode)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisService for ScriptedAnalysis {
    async fn analyze_document(&self, upload: &Upload, mode: AnalysisMode) -> Reply {
        self.calls
            .lock()
            .unwrap()
            .push((upload.file_name.clone(), mode));
        let receiver = self.pending.lock().unwrap().remove(&upload.file_name);
        match receiver {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(AnalysisError::Failed("reply dropped".into()))),
            None => Err(AnalysisError::Failed(format!(
                "unexpected upload {}",
                upload.file_name
            ))),
        }
    }
}

//=========================================================================================
// Notifications
//=========================================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationService for RecordingNotifier {
    fn notify(&self, title: &str, body: &str) -> PortResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

//=========================================================================================
// Builders
//=========================================================================================

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn upload(name: &str) -> Upload {
    Upload::new(name, "image/png", vec![0x89, 0x50, 0x4e, 0x47])
}

pub fn task(description: &str, priority: Priority, due: Option<NaiveDate>) -> ExtractedTask {
    ExtractedTask {
        description: description.to_string(),
        priority,
        category: "Errand".to_string(),
        due_date: due,
    }
}

pub fn result(title: &str, tasks: Vec<ExtractedTask>) -> AnalysisResult {
    AnalysisResult {
        title: title.to_string(),
        summary: format!("{} summary", title),
        tasks,
        study_plan: None,
    }
}

/// A completed document created at `minute` past a fixed hour.
pub fn completed(title: &str, minute: u32, tasks: Vec<ExtractedTask>) -> Document {
    let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 9, minute, 0).unwrap();
    let mut doc = Document::placeholder(DocumentId::new(), &upload(title), created_at);
    assert!(doc.complete(result(title, tasks)));
    doc
}
