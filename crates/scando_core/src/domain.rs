//! crates/scando_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! The serialized shape doubles as the persisted format, so field names follow
//! the camelCase JSON the rest of the system already speaks.

use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::analysis::{AnalysisResult, ExtractedTask};

pub const PLACEHOLDER_TITLE: &str = "Processing...";
pub const PLACEHOLDER_SUMMARY: &str = "Extracting data...";

/// Prefix of the storage key holding a document's uploaded file.
pub const SOURCE_KEY_PREFIX: &str = "scando_file_";

//=========================================================================================
// Identifiers
//=========================================================================================

/// Identifies one scanned document. Time-ordered, so ids sort by submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// The storage key of this document's uploaded file.
    pub fn source_key(&self) -> String {
        format!("{}{}", SOURCE_KEY_PREFIX, self.0)
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for DocumentId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Identifies a task within its owning document.
///
/// Built as `{document_id}-{index}`, so it is only unique inside one document.
/// Every lookup pairs it with a [`DocumentId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn for_index(document_id: DocumentId, index: usize) -> Self {
        Self(format!("{}-{}", document_id, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//=========================================================================================
// Enumerations
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// The next value of the one-click priority button: High, Medium, Low, High...
    pub fn cycle(self) -> Self {
        match self {
            Priority::High => Priority::Medium,
            Priority::Medium => Priority::Low,
            Priority::Low => Priority::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown priority '{0}', expected High, Medium or Low")]
pub struct ParsePriorityError(String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "High" => Ok(Priority::High),
            "Medium" => Ok(Priority::Medium),
            "Low" => Ok(Priority::Low),
            other => Err(ParsePriorityError(other.to_string())),
        }
    }
}

/// Lifecycle of a document: `Processing` moves once, to `Completed` or `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Processing,
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Pdf,
}

impl FileKind {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.to_ascii_lowercase().contains("pdf") {
            FileKind::Pdf
        } else {
            FileKind::Image
        }
    }
}

/// Selects the analysis tier. `Deep` also asks for a study plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    #[default]
    Fast,
    Deep,
}

impl FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(AnalysisMode::Fast),
            "deep" => Ok(AnalysisMode::Deep),
            other => Err(format!("unknown analysis mode '{}'", other)),
        }
    }
}

//=========================================================================================
// Tasks and Study Plans
//=========================================================================================

/// One actionable item extracted from a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub priority: Priority,
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    pub topic: String,
    pub duration: String,
    pub activity: String,
    pub technique: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyDay {
    pub day: String,
    pub sessions: Vec<StudySession>,
}

/// A multi-day schedule produced only by deep analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StudyPlan {
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub schedule: Vec<StudyDay>,
    #[serde(default)]
    pub tips: Vec<String>,
}

//=========================================================================================
// Uploads and Documents
//=========================================================================================

/// A file handed to the system for analysis.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn kind(&self) -> FileKind {
        FileKind::from_mime(&self.mime_type)
    }

    pub fn base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// The file as a `data:` URL, used both as the stored source file and as
    /// inline model input.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64())
    }
}

/// An uploaded file read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Parses a base64 `data:` URL as written by [`Upload::data_url`].
    pub fn from_data_url(data_url: &str) -> Option<Self> {
        let (mime_type, payload) = data_url
            .strip_prefix("data:")?
            .split_once(";base64,")?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .ok()?;
        Some(Self {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }
}

/// One uploaded source file plus its extraction result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub summary: String,
    /// Storage key of the uploaded file. The bytes live under that key, not
    /// in the collection.
    pub original_file_url: String,
    pub file_type: FileKind,
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
    pub status: DocumentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_plan: Option<StudyPlan>,
}

impl Document {
    /// The provisional record created the moment a file is submitted.
    pub fn placeholder(id: DocumentId, upload: &Upload, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: PLACEHOLDER_TITLE.to_string(),
            summary: PLACEHOLDER_SUMMARY.to_string(),
            original_file_url: id.source_key(),
            file_type: upload.kind(),
            tasks: Vec::new(),
            created_at,
            status: DocumentStatus::Processing,
            study_plan: None,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.status == DocumentStatus::Processing
    }

    /// Moves a processing document to `Completed`, taking the analysis fields.
    ///
    /// Returns `false` and leaves the document untouched if it already left
    /// the processing state.
    pub fn complete(&mut self, result: AnalysisResult) -> bool {
        if !self.is_processing() {
            return false;
        }
        let id = self.id;
        self.title = result.title;
        self.summary = result.summary;
        self.tasks = result
            .tasks
            .into_iter()
            .enumerate()
            .map(|(index, extracted)| extracted.into_task(TaskId::for_index(id, index)))
            .collect();
        self.study_plan = result.study_plan;
        self.status = DocumentStatus::Completed;
        true
    }

    /// Moves a processing document to `Error` with a user-presentable summary.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if !self.is_processing() {
            return false;
        }
        self.summary = message.into();
        self.status = DocumentStatus::Error;
        true
    }

    pub fn task(&self, task_id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| &task.id == task_id)
    }
}

impl ExtractedTask {
    fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            description: self.description,
            priority: self.priority,
            is_completed: false,
            category: Some(self.category),
            due_date: self.due_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> Upload {
        Upload::new("notes.png", "image/png", vec![1, 2, 3])
    }

    #[test]
    fn priority_cycles_through_all_values() {
        assert_eq!(Priority::High.cycle(), Priority::Medium);
        assert_eq!(Priority::Medium.cycle(), Priority::Low);
        assert_eq!(Priority::Low.cycle(), Priority::High);
    }

    #[test]
    fn priority_parses_only_the_three_names() {
        assert_eq!("High".parse::<Priority>().unwrap(), Priority::High);
        assert!("high".parse::<Priority>().is_err());
        assert!("Urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn file_kind_follows_mime_type() {
        assert_eq!(FileKind::from_mime("application/pdf"), FileKind::Pdf);
        assert_eq!(FileKind::from_mime("image/jpeg"), FileKind::Image);
        assert_eq!(FileKind::from_mime(""), FileKind::Image);
    }

    #[test]
    fn placeholder_starts_processing_with_no_tasks() {
        let id = DocumentId::new();
        let doc = Document::placeholder(id, &upload(), Utc::now());
        assert_eq!(doc.status, DocumentStatus::Processing);
        assert!(doc.tasks.is_empty());
        assert_eq!(doc.title, PLACEHOLDER_TITLE);
        assert_eq!(doc.original_file_url, format!("scando_file_{}", id));
    }

    #[test]
    fn source_file_reads_back_an_upload_data_url() {
        let file = SourceFile::from_data_url(&upload().data_url()).unwrap();
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.bytes, vec![1, 2, 3]);

        assert_eq!(SourceFile::from_data_url("scando_file_x"), None);
        assert_eq!(SourceFile::from_data_url("data:image/png;base64,!!"), None);
    }

    #[test]
    fn failed_document_cannot_be_completed_later() {
        let mut doc = Document::placeholder(DocumentId::new(), &upload(), Utc::now());
        assert!(doc.fail("boom"));
        let result = AnalysisResult {
            title: "Late".into(),
            summary: "Late".into(),
            tasks: Vec::new(),
            study_plan: None,
        };
        assert!(!doc.complete(result));
        assert_eq!(doc.status, DocumentStatus::Error);
        assert_eq!(doc.summary, "boom");
    }

    #[test]
    fn task_ids_are_derived_from_document_and_index() {
        let id = DocumentId::new();
        assert_eq!(TaskId::for_index(id, 2).as_str(), format!("{}-2", id));
    }
}
