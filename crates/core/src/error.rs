use thiserror::Error;

#[derive(Error, Debug)]
pub enum TubecheckError {
    #[error("Missing API key: {env_var} environment variable is not set for {provider}")]
    MissingCredential { env_var: String, provider: String },

    #[error("No transcript data returned")]
    TranscriptUnavailable,

    #[error("Transcript fetch failed for {video_id}: {reason}")]
    TranscriptFetch { video_id: String, reason: String },

    #[error("Unrecognized transcript shape: {reason}")]
    UnrecognizedTranscriptShape { reason: String },

    #[error("Analysis service error: {reason}")]
    AnalysisService { reason: String },

    #[error("Could not normalize analysis: {reason}")]
    Normalization { reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, TubecheckError>;
