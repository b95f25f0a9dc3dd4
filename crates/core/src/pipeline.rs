use tracing::{error, info};

use crate::{
    analyzer::{ChatCompletionsClient, CompletionService, ContentAnalyzer},
    config::{Overrides, Settings},
    error::{Result, TubecheckError},
    normalize::build_result,
    text::{MAX_TRANSCRIPT_CHARS, concat_transcript},
    transcript::{HttpTranscriptSource, TranscriptSource, fetch_transcript},
    types::{ErrorRecord, PipelineOutput, TranscriptEntry},
};

/// Progress notifications emitted while a video is processed.
#[derive(Debug)]
pub enum Stage<'a> {
    Fetching,
    Fetched {
        entries: &'a [TranscriptEntry],
        chars: usize,
    },
    Analyzing,
    Analyzed {
        analysis: &'a str,
    },
}

/// Fetch, concatenate, analyze and normalize one video.
pub struct Pipeline<S, C> {
    source: S,
    analyzer: ContentAnalyzer<C>,
}

impl<S, C> Pipeline<S, C>
where
    S: TranscriptSource,
    C: CompletionService,
{
    pub fn new(source: S, analyzer: ContentAnalyzer<C>) -> Self {
        Self { source, analyzer }
    }

    pub async fn run(&self, video_id: &str) -> PipelineOutput {
        self.run_with_progress(video_id, |_| {}).await
    }

    /// Failures up to transcript retrieval end the run with an [`ErrorRecord`].
    /// Anything after that is absorbed into the result's fields.
    pub async fn run_with_progress<F>(&self, video_id: &str, mut on_stage: F) -> PipelineOutput
    where
        F: FnMut(Stage<'_>),
    {
        on_stage(Stage::Fetching);
        let entries = match fetch_transcript(&self.source, video_id).await {
            Ok(entries) => entries,
            Err(err) => return PipelineOutput::Failure(error_record(video_id, &err)),
        };

        let full_text = concat_transcript(&entries);
        let chars = full_text.chars().count();
        info!(
            video_id,
            chars,
            submitted = chars.min(MAX_TRANSCRIPT_CHARS),
            "transcript concatenated"
        );
        on_stage(Stage::Fetched {
            entries: &entries,
            chars,
        });

        on_stage(Stage::Analyzing);
        let analysis = self.analyzer.analyze(&full_text, video_id).await;
        on_stage(Stage::Analyzed {
            analysis: &analysis,
        });

        PipelineOutput::Analysis(build_result(video_id, analysis))
    }
}

fn error_record(video_id: &str, err: &TubecheckError) -> ErrorRecord {
    let error = match err {
        TubecheckError::TranscriptUnavailable => {
            info!(video_id, "no transcript data returned");
            err.to_string()
        }
        other => {
            error!(video_id, error = ?other, "video processing failed");
            format!("Analysis failed: {other}")
        }
    };

    ErrorRecord {
        error,
        video_id: video_id.to_string(),
    }
}

/// Build the HTTP-backed pipeline described by resolved settings.
pub fn connect(
    settings: &Settings,
) -> Result<Pipeline<HttpTranscriptSource, ChatCompletionsClient>> {
    let source = HttpTranscriptSource::new(&settings.transcript_api_url, settings.timeout)?;
    let service = ChatCompletionsClient::new(
        settings.provider.config().api_url,
        &settings.api_key,
        settings.timeout,
    )?;
    Ok(Pipeline::new(
        source,
        ContentAnalyzer::new(service, &settings.model),
    ))
}

/// Outcome of startup once configuration resolved.
pub enum Startup<S, C> {
    Ready(Settings, Pipeline<S, C>),
    /// The pipeline could not be built; the record is the run's output.
    Failed(Settings, PipelineOutput),
}

/// Resolve settings, then build the pipeline.
///
/// Configuration errors, a missing credential among them, are returned before
/// `build` runs. A failing `build` becomes an `Analysis failed: ...` record.
pub fn start<L, S, C, B>(lookup: L, overrides: Overrides, build: B) -> Result<Startup<S, C>>
where
    L: Fn(&str) -> Option<String>,
    S: TranscriptSource,
    C: CompletionService,
    B: FnOnce(&Settings) -> Result<Pipeline<S, C>>,
{
    let settings = Settings::resolve(lookup, overrides)?;
    Ok(match build(&settings) {
        Ok(pipeline) => Startup::Ready(settings, pipeline),
        Err(err) => {
            let record = error_record(&settings.video_id, &err);
            Startup::Failed(settings, PipelineOutput::Failure(record))
        }
    })
}
