//! Tubecheck Core Library
//!
//! Fetches a YouTube transcript, asks an LLM for a moderation assessment and
//! normalizes the free-text answer into a fixed JSON record.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod format;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod text;
pub mod transcript;
pub mod types;

// Re-export commonly used items at crate root
pub use analyzer::{
    ChatCompletionsClient, ChatMessage, CompletionRequest, CompletionService, ContentAnalyzer,
    parse_completion,
};
pub use config::{Overrides, Settings};
pub use error::{Result, TubecheckError};
pub use format::{format_entry, format_preview, format_timestamp};
pub use normalize::{build_result, extract_bias_tags, extract_toxicity_score};
pub use pipeline::{Pipeline, Stage, Startup, connect, start};
pub use provider::{Provider, ProviderConfig};
pub use text::{MAX_TRANSCRIPT_CHARS, concat_transcript, truncate_chars};
pub use transcript::{
    HttpTranscriptSource, TranscriptSource, decode_service_body, detect_payload, fetch_transcript,
};
pub use types::{
    AnalysisResult, AvailableTranscript, BiasTag, Emotions, ErrorRecord, PipelineOutput, RawEntry,
    Snippet, Track, TranscriptEntry, TranscriptPayload,
};
