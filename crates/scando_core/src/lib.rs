//! Core domain logic for ScanDo: scanned documents, their extracted tasks and
//! the views derived from them. All I/O goes through the traits in [`ports`].

pub mod analysis;
pub mod calendar;
pub mod domain;
pub mod history;
pub mod organizer;
pub mod ports;
pub mod preferences;
pub mod store;
pub mod study_plan;

pub use analysis::{AnalysisError, AnalysisResult, ExtractedTask};
pub use domain::{
    AnalysisMode, Document, DocumentId, DocumentStatus, FileKind, Priority, SourceFile, StudyDay,
    StudyPlan, StudySession, Task, TaskId, Upload,
};
pub use organizer::{Organizer, Submission, SubmissionOutcome};
pub use ports::{AnalysisService, KeyValueStore, NotificationService, PortError, PortResult};
pub use preferences::Preferences;
pub use store::{DeleteOutcome, DocumentStore};
