pub mod file_store;
pub mod gemini_llm;
pub mod notifier;

pub use file_store::FileKeyValueStore;
pub use gemini_llm::GeminiAnalysisAdapter;
pub use notifier::TracingNotifier;
