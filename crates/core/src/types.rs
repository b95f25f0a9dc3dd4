use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One subtitle line, normalized from whatever shape the transcript service used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub start: f64,
    pub text: String,
}

/// Transcript track advertised by the service's listing call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailableTranscript {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub language_code: String,
    #[serde(default)]
    pub is_generated: bool,
}

/// Typed subtitle line, as produced by sources that already know the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawEntry {
    /// Key/value mapping with optional `text` and `start` keys.
    Mapping(Map<String, Value>),
    Snippet(Snippet),
    /// Anything else the service put in the list.
    Opaque(Value),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub transcript: Vec<RawEntry>,
}

/// The accepted response shapes of the transcript service.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptPayload {
    Tracks(Vec<Track>),
    Entries(Vec<RawEntry>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiasTag {
    Political,
    Cultural,
    Gender,
    Racial,
    Unknown,
}

/// Fixed emotion profile shipped with every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emotions {
    pub anger: f64,
    pub joy: f64,
    pub trust: f64,
    pub fear: f64,
    pub sadness: f64,
    pub surprise: f64,
    pub disgust: f64,
}

impl Default for Emotions {
    fn default() -> Self {
        Self {
            anger: 0.3,
            joy: 0.4,
            trust: 0.5,
            fear: 0.2,
            sadness: 0.3,
            surprise: 0.4,
            disgust: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub video_id: String,
    pub title: String,
    pub channel_name: String,
    pub publish_date: String,
    pub thumbnail: String,
    pub toxicity_score: i64,
    pub bias_tags: Vec<BiasTag>,
    pub emotions: Emotions,
    pub analysis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub error: String,
    pub video_id: String,
}

/// The single JSON document a run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PipelineOutput {
    Analysis(AnalysisResult),
    Failure(ErrorRecord),
}

impl PipelineOutput {
    pub fn is_failure(&self) -> bool {
        matches!(self, PipelineOutput::Failure(_))
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
