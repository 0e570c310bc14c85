//! services/api/src/adapters/gemini_llm.rs
//!
//! This module contains the adapter for the document-analysis LLM.
//! It implements the `AnalysisService` port from the `core` crate by sending
//! the uploaded file inline to Gemini through its OpenAI-compatible endpoint.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrlArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use scando_core::{
    AnalysisError, AnalysisMode, AnalysisResult, AnalysisService, Upload,
};
use tracing::{debug, error};

const RESPONSE_SHAPE: &str = r#"Respond with a single JSON object and nothing else:
{
  "title": string,
  "summary": string,
  "tasks": [
    { "description": string, "priority": "High" | "Medium" | "Low", "category": string, "dueDate": "YYYY-MM-DD" (optional) }
  ],
  "studyPlan": {
    "overview": string,
    "prerequisites": [string],
    "tips": [string],
    "schedule": [ { "day": string, "sessions": [ { "topic": string, "duration": string, "activity": string, "technique": string } ] } ]
  } (only when requested)
}"#;

const DEEP_INSTRUCTIONS: &str = r#"
CRITICAL: This is a DEEP ANALYSIS request. Use your advanced reasoning to:
1. Provide a strategic OVERVIEW of the content.
2. List all PREREQUISITES or materials needed to succeed.
3. Create a 7-day STUDY_PLAN with daily sessions, durations, and specific techniques (e.g. Feynman, Pomodoro).
4. List 3 high-impact EXECUTION_TIPS."#;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `AnalysisService` using Gemini's OpenAI-compatible API.
///
/// Built without a client when no API key is configured; every analysis then
/// fails with `AnalysisError::MissingCredentials`.
#[derive(Clone)]
pub struct GeminiAnalysisAdapter {
    client: Option<Client<OpenAIConfig>>,
    fast_model: String,
    deep_model: String,
}

impl GeminiAnalysisAdapter {
    /// Creates a new `GeminiAnalysisAdapter`.
    pub fn new(client: Option<Client<OpenAIConfig>>, fast_model: String, deep_model: String) -> Self {
        Self {
            client,
            fast_model,
            deep_model,
        }
    }

    fn model_for(&self, mode: AnalysisMode) -> &str {
        match mode {
            AnalysisMode::Fast => &self.fast_model,
            AnalysisMode::Deep => &self.deep_model,
        }
    }
}

/// The system prompt, anchored to `today` so relative dates resolve.
pub fn system_instruction(today: NaiveDate) -> String {
    format!(
        "You are an elite productivity strategist.\n\
         Extract every actionable task from the document.\n\
         - Title: Catchy and descriptive.\n\
         - Tasks: Clear, concise, and prioritized.\n\
         - Dates: Map relative dates (like \"tomorrow\") to YYYY-MM-DD based on today ({today}).\n\n\
         {RESPONSE_SHAPE}"
    )
}

pub fn user_prompt(today: NaiveDate, mode: AnalysisMode) -> String {
    let mut prompt = format!(
        "Analyze the attached document and return a structured JSON task list. Today is {}.",
        today
    );
    if mode == AnalysisMode::Deep {
        prompt.push_str(DEEP_INSTRUCTIONS);
    }
    prompt
}

fn request_error(e: OpenAIError) -> AnalysisError {
    AnalysisError::Failed(e.to_string())
}

//=========================================================================================
// `AnalysisService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnalysisService for GeminiAnalysisAdapter {
    /// Sends the file inline with the extraction prompt and validates the JSON reply.
    async fn analyze_document(
        &self,
        upload: &Upload,
        mode: AnalysisMode,
    ) -> Result<AnalysisResult, AnalysisError> {
        let Some(client) = &self.client else {
            error!("GEMINI_API_KEY is missing; refusing to analyze documents.");
            return Err(AnalysisError::MissingCredentials);
        };

        let today = chrono::Local::now().date_naive();

        let file_part = ChatCompletionRequestMessageContentPartImageArgs::default()
            .image_url(
                ImageUrlArgs::default()
                    .url(upload.data_url())
                    .detail(ImageDetail::High)
                    .build()
                    .map_err(request_error)?,
            )
            .build()
            .map_err(request_error)?;
        let text_part = ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(user_prompt(today, mode))
            .build()
            .map_err(request_error)?;

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_instruction(today))
                .build()
                .map_err(request_error)?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(vec![file_part.into(), text_part.into()])
                .build()
                .map_err(request_error)?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model_for(mode))
            .messages(messages)
            .response_format(ResponseFormat::JsonObject)
            .n(1)
            .build()
            .map_err(request_error)?;

        debug!(
            "Analyzing '{}' ({} bytes) with {}",
            upload.file_name,
            upload.bytes.len(),
            self.model_for(mode)
        );

        // Map the provider error by its message, which respects the orphan rule.
        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| {
                error!("Gemini API Error: {}", e);
                AnalysisError::from_provider_message(&e.to_string())
            })?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        AnalysisResult::from_json(&text, mode)
    }
}
