//! crates/scando_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! These traits form the boundary of the hexagonal architecture: the store and
//! the organizer receive implementations at construction time instead of
//! reaching for ambient globals, so tests can substitute in-memory fakes.

use async_trait::async_trait;

use crate::analysis::{AnalysisError, AnalysisResult};
use crate::domain::{AnalysisMode, Upload};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., filesystem, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Extracts a title, summary and tasks (plus a study plan in deep mode)
    /// from an uploaded image or PDF.
    async fn analyze_document(
        &self,
        upload: &Upload,
        mode: AnalysisMode,
    ) -> Result<AnalysisResult, AnalysisError>;
}

/// A synchronous string key-value store, the persistence collaborator.
pub trait KeyValueStore: Send + Sync {
    /// Returns `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> PortResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> PortResult<()>;

    fn remove(&self, key: &str) -> PortResult<()>;
}

pub trait NotificationService: Send + Sync {
    /// Shows a user-facing notification.
    fn notify(&self, title: &str, body: &str) -> PortResult<()>;
}
