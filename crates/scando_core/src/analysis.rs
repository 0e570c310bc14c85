//! crates/scando_core/src/analysis.rs
//!
//! The contract with the external document-analysis collaborator: the strictly
//! typed result the core accepts, the validation that turns a raw JSON reply
//! into that result, and the failure taxonomy surfaced to users.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use crate::domain::{AnalysisMode, Priority, StudyPlan};

/// Format of every due date exchanged with the analysis collaborator.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

//=========================================================================================
// Validated Result Types
//=========================================================================================

/// A task as extracted by the analysis, before it is attached to a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTask {
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub due_date: Option<NaiveDate>,
}

/// A validated analysis reply. `study_plan` is only ever set for deep analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub title: String,
    pub summary: String,
    pub tasks: Vec<ExtractedTask>,
    pub study_plan: Option<StudyPlan>,
}

//=========================================================================================
// Failure Taxonomy
//=========================================================================================

/// Why an analysis did not produce a result.
///
/// The `Display` text of each variant is what ends up in the failed
/// document's summary, so it must stay presentable to end users. Provider
/// detail is kept in the payload for logs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Service Configuration Error. Please contact the developer.")]
    MissingCredentials,
    #[error("Access Denied: Domain not allowed. Check API Key restrictions in Google Cloud Console.")]
    AccessDenied(String),
    #[error("Bad Request: The file format might not be supported or the image is corrupt.")]
    BadRequest(String),
    #[error("Analysis failed. Please try a clearer image or PDF.")]
    MalformedResponse(String),
    #[error("Analysis failed. Please try a clearer image or PDF.")]
    Failed(String),
}

impl AnalysisError {
    /// Classifies a provider error message into the user-facing categories.
    pub fn from_provider_message(message: &str) -> Self {
        let lowered = message.to_lowercase();
        if lowered.contains("403")
            || lowered.contains("permission denied")
            || lowered.contains("key not valid")
        {
            AnalysisError::AccessDenied(message.to_string())
        } else if lowered.contains("400") || lowered.contains("invalid argument") {
            AnalysisError::BadRequest(message.to_string())
        } else {
            AnalysisError::Failed(message.to_string())
        }
    }

    /// The underlying provider or parser detail, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            AnalysisError::MissingCredentials => None,
            AnalysisError::AccessDenied(detail)
            | AnalysisError::BadRequest(detail)
            | AnalysisError::MalformedResponse(detail)
            | AnalysisError::Failed(detail) => Some(detail),
        }
    }
}

//=========================================================================================
// Raw Wire Shape and Validation
//=========================================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    title: Option<String>,
    summary: Option<String>,
    tasks: Option<Vec<RawTask>>,
    study_plan: Option<StudyPlan>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTask {
    description: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    due_date: Option<String>,
}

impl AnalysisResult {
    /// Parses and validates the model's JSON reply.
    ///
    /// Missing required fields reject the whole reply. A due date that is not
    /// `YYYY-MM-DD` is dropped rather than failing the analysis, and a study
    /// plan returned for a fast analysis is ignored.
    pub fn from_json(text: &str, mode: AnalysisMode) -> Result<Self, AnalysisError> {
        let body = strip_code_fence(text);
        if body.is_empty() {
            return Err(AnalysisError::MalformedResponse(
                "AI extraction returned empty result.".to_string(),
            ));
        }

        let raw: RawAnalysis = serde_json::from_str(body)
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

        let title = required(raw.title, "title")?;
        let summary = required(raw.summary, "summary")?;
        let tasks = required(raw.tasks, "tasks")?
            .into_iter()
            .enumerate()
            .map(|(index, task)| task.validate(index))
            .collect::<Result<Vec<_>, _>>()?;

        let study_plan = match mode {
            AnalysisMode::Deep => raw.study_plan,
            AnalysisMode::Fast => None,
        };

        Ok(Self {
            title,
            summary,
            tasks,
            study_plan,
        })
    }
}

impl RawTask {
    fn validate(self, index: usize) -> Result<ExtractedTask, AnalysisError> {
        let description = required(self.description, &format!("tasks[{}].description", index))?;
        let priority = required(self.priority, &format!("tasks[{}].priority", index))?
            .parse::<Priority>()
            .map_err(|e| AnalysisError::MalformedResponse(format!("tasks[{}]: {}", index, e)))?;
        let category = required(self.category, &format!("tasks[{}].category", index))?;
        let due_date = self.due_date.and_then(|raw| parse_due_date(&raw));

        Ok(ExtractedTask {
            description,
            priority,
            category,
            due_date,
        })
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, AnalysisError> {
    value.ok_or_else(|| AnalysisError::MalformedResponse(format!("missing field `{}`", field)))
}

fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(trimmed, DUE_DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("Dropping unparseable due date '{}': {}", trimmed, e);
            None
        }
    }
}

/// Models occasionally wrap JSON in a markdown fence even in JSON mode.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
