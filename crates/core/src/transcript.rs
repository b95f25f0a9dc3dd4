use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    error::{Result, TubecheckError},
    text::truncate_chars,
    types::{AvailableTranscript, RawEntry, Snippet, TranscriptEntry, TranscriptPayload, Track},
};

/// Where transcripts come from.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Tracks available for a video. Only used for diagnostics.
    async fn list(&self, video_id: &str) -> Result<Vec<AvailableTranscript>>;

    async fn fetch(&self, video_id: &str) -> Result<TranscriptPayload>;
}

/// Client for an HTTP transcript service exposing `/list/{id}` and `/fetch/{id}`.
pub struct HttpTranscriptSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTranscriptSource {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, action: &str, video_id: &str) -> String {
        format!("{}/{}/{}", self.base_url, action, video_id)
    }

    async fn get_json(&self, action: &str, video_id: &str) -> Result<Value> {
        let url = self.endpoint(action, video_id);
        debug!(%url, "requesting transcript service");
        let fetch_error = |err: reqwest::Error| TubecheckError::TranscriptFetch {
            video_id: video_id.to_string(),
            reason: err.to_string(),
        };

        let response = self.client.get(&url).send().await.map_err(fetch_error)?;
        let status = response.status();
        let body = response.text().await.map_err(fetch_error)?;
        decode_service_body(video_id, status, &body)
    }
}

const ERROR_BODY_PREVIEW_CHARS: usize = 300;

/// Check the status, then decode the JSON body of a transcript service reply.
pub fn decode_service_body(video_id: &str, status: StatusCode, body: &str) -> Result<Value> {
    let fetch_error = |reason: String| TubecheckError::TranscriptFetch {
        video_id: video_id.to_string(),
        reason,
    };

    if !status.is_success() {
        return Err(fetch_error(format!(
            "{status}: {}",
            truncate_chars(body.trim(), ERROR_BODY_PREVIEW_CHARS)
        )));
    }

    serde_json::from_str(body)
        .map_err(|err| fetch_error(format!("invalid JSON from transcript service: {err}")))
}

#[async_trait]
impl TranscriptSource for HttpTranscriptSource {
    async fn list(&self, video_id: &str) -> Result<Vec<AvailableTranscript>> {
        let value = self.get_json("list", video_id).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn fetch(&self, video_id: &str) -> Result<TranscriptPayload> {
        let value = self.get_json("fetch", video_id).await?;
        detect_payload(value)
    }
}

fn has_tracks(value: &Value) -> bool {
    value.as_object().is_some_and(|obj| obj.contains_key("tracks"))
}

/// Decide which response shape the service sent.
///
/// A `tracks` wrapper wins, either as the top-level object or as the first
/// element of a list. Any other list is taken as the entries themselves.
pub fn detect_payload(value: Value) -> Result<TranscriptPayload> {
    match value {
        mut wrapper if has_tracks(&wrapper) => decode_tracks(wrapper["tracks"].take()),
        Value::Array(mut items) if items.first().is_some_and(has_tracks) => {
            let mut wrapper = items.swap_remove(0);
            decode_tracks(wrapper["tracks"].take())
        }
        Value::Array(items) => Ok(TranscriptPayload::Entries(
            items.into_iter().map(decode_entry).collect(),
        )),
        other => Err(TubecheckError::UnrecognizedTranscriptShape {
            reason: format!("expected a list or a tracks object, got {}", kind_of(&other)),
        }),
    }
}

fn decode_tracks(value: Value) -> Result<TranscriptPayload> {
    let Value::Array(tracks) = value else {
        return Err(TubecheckError::UnrecognizedTranscriptShape {
            reason: format!("`tracks` must be a list, got {}", kind_of(&value)),
        });
    };

    let tracks = tracks
        .into_iter()
        .map(|track| {
            let transcript = match track {
                Value::Object(mut obj) => match obj.remove("transcript") {
                    Some(Value::Array(items)) => items.into_iter().map(decode_entry).collect(),
                    _ => Vec::new(),
                },
                _ => Vec::new(),
            };
            Track { transcript }
        })
        .collect();

    Ok(TranscriptPayload::Tracks(tracks))
}

fn decode_entry(value: Value) -> RawEntry {
    match value {
        Value::Object(map) => RawEntry::Mapping(map),
        other => RawEntry::Opaque(other),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

impl RawEntry {
    pub fn text(&self) -> String {
        match self {
            RawEntry::Mapping(map) => match map.get("text") {
                Some(Value::String(text)) => text.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            },
            RawEntry::Snippet(snippet) => snippet.text.clone(),
            RawEntry::Opaque(_) => String::new(),
        }
    }

    pub fn start(&self) -> f64 {
        match self {
            RawEntry::Mapping(map) => match map.get("start") {
                Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
                Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
                _ => 0.0,
            },
            RawEntry::Snippet(snippet) => snippet.start,
            RawEntry::Opaque(_) => 0.0,
        }
    }

    pub fn to_entry(&self) -> TranscriptEntry {
        TranscriptEntry {
            start: self.start(),
            text: self.text(),
        }
    }
}

impl From<Snippet> for RawEntry {
    fn from(snippet: Snippet) -> Self {
        RawEntry::Snippet(snippet)
    }
}

impl TranscriptPayload {
    pub fn shape(&self) -> &'static str {
        match self {
            TranscriptPayload::Tracks(_) => "tracks",
            TranscriptPayload::Entries(_) => "entries",
        }
    }

    /// Entries of the first track, or the flat entry list.
    pub fn into_entries(self) -> Result<Vec<TranscriptEntry>> {
        let raw = match self {
            TranscriptPayload::Tracks(tracks) => tracks
                .into_iter()
                .next()
                .ok_or(TubecheckError::TranscriptUnavailable)?
                .transcript,
            TranscriptPayload::Entries(entries) => entries,
        };

        if raw.is_empty() {
            return Err(TubecheckError::TranscriptUnavailable);
        }

        Ok(raw.iter().map(RawEntry::to_entry).collect())
    }
}

/// List (for diagnostics) then fetch and normalize the transcript of one video.
pub async fn fetch_transcript<S>(source: &S, video_id: &str) -> Result<Vec<TranscriptEntry>>
where
    S: TranscriptSource + ?Sized,
{
    info!(video_id, "fetching transcript");

    let available = source.list(video_id).await?;
    let languages: Vec<&str> = available.iter().map(|t| t.language_code.as_str()).collect();
    info!(video_id, tracks = available.len(), ?languages, "available transcripts");

    let payload = source.fetch(video_id).await?;
    let shape = payload.shape();
    let entries = payload.into_entries()?;
    info!(video_id, shape, entries = entries.len(), "transcript retrieved");

    Ok(entries)
}
