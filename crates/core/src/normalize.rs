//! Turns the free-text moderation assessment into the fixed result schema.
//!
//! Extraction is keyword scanning over the whole response. The score is the
//! first digit run anywhere in the text once "toxicity score" appears, so a
//! year or list number earlier in the response wins over the actual score.
//! Consumers rely on this exact behavior.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::{
    error::{Result, TubecheckError},
    types::{AnalysisResult, BiasTag, Emotions},
};

pub const DEFAULT_TOXICITY_SCORE: i64 = 5;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

static DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d$").expect("digit pattern is valid"));

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// Decimal value of any Unicode `Nd` character.
///
/// Unicode lays out decimal digits in contiguous runs of ten starting at zero,
/// so the value is the offset from the start of the run, modulo ten.
fn digit_value(c: char) -> u32 {
    if let Some(d) = c.to_digit(10) {
        return d;
    }
    let mut start = c as u32;
    while let Some(prev) = start
        .checked_sub(1)
        .and_then(char::from_u32)
        .filter(|p| is_decimal_digit(*p))
    {
        start = prev as u32;
    }
    (c as u32 - start) % 10
}

fn parse_digit_run(run: &str) -> Result<i64> {
    run.chars()
        .try_fold(0i64, |acc, c| {
            acc.checked_mul(10)?.checked_add(i64::from(digit_value(c)))
        })
        .ok_or_else(|| TubecheckError::Normalization {
            reason: format!("toxicity score '{run}' does not fit in an integer"),
        })
}

const BIAS_KEYWORDS: [(&str, BiasTag); 4] = [
    ("political", BiasTag::Political),
    ("cultural", BiasTag::Cultural),
    ("gender", BiasTag::Gender),
    ("racial", BiasTag::Racial),
];

pub fn extract_toxicity_score(analysis: &str) -> Result<i64> {
    if !analysis.to_lowercase().contains("toxicity score") {
        return Ok(DEFAULT_TOXICITY_SCORE);
    }

    let Some(run) = DIGIT_RUN.find(analysis) else {
        return Ok(DEFAULT_TOXICITY_SCORE);
    };

    parse_digit_run(run.as_str())
}

pub fn extract_bias_tags(analysis: &str) -> Vec<BiasTag> {
    let lowered = analysis.to_lowercase();
    if !lowered.contains("bias") {
        return Vec::new();
    }

    BIAS_KEYWORDS
        .iter()
        .filter(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, tag)| *tag)
        .collect()
}

/// Score and tags for a response, or the `5` / `[Unknown]` fallback.
pub fn extract_signals(analysis: &str) -> (i64, Vec<BiasTag>) {
    match extract_toxicity_score(analysis) {
        Ok(score) => (score, extract_bias_tags(analysis)),
        Err(err) => {
            warn!(error = %err, "falling back to default moderation signals");
            (DEFAULT_TOXICITY_SCORE, vec![BiasTag::Unknown])
        }
    }
}

pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/maxresdefault.jpg")
}

/// Assemble the full record. Never fails; the analysis text is kept verbatim.
pub fn build_result(video_id: &str, analysis: String) -> AnalysisResult {
    let (toxicity_score, bias_tags) = extract_signals(&analysis);

    AnalysisResult {
        video_id: video_id.to_string(),
        title: format!("Video {video_id}"),
        channel_name: "Unknown Channel".to_string(),
        publish_date: "2024-01-01T00:00:00Z".to_string(),
        thumbnail: thumbnail_url(video_id),
        toxicity_score,
        bias_tags,
        emotions: Emotions::default(),
        analysis,
    }
}
