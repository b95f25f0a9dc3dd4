use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use serde_json::json;
use tubecheck_core::{
    AvailableTranscript, BiasTag, CompletionRequest, CompletionService, ContentAnalyzer,
    Overrides, Pipeline, PipelineOutput, RawEntry, Result, Settings, Snippet, Stage, Startup,
    TranscriptPayload, TranscriptSource, TubecheckError, concat_transcript, detect_payload, start,
};

#[derive(Default)]
struct Calls {
    list: AtomicUsize,
    fetch: AtomicUsize,
    complete: AtomicUsize,
}

enum Served {
    Payload(serde_json::Value),
    Snippets(Vec<Snippet>),
    Fail(&'static str),
}

struct StubSource {
    served: Served,
    calls: Arc<Calls>,
}

#[async_trait]
impl TranscriptSource for StubSource {
    async fn list(&self, _video_id: &str) -> Result<Vec<AvailableTranscript>> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        Ok(vec![AvailableTranscript {
            language: "English".into(),
            language_code: "en".into(),
            is_generated: true,
        }])
    }

    async fn fetch(&self, video_id: &str) -> Result<TranscriptPayload> {
        self.calls.fetch.fetch_add(1, Ordering::SeqCst);
        match &self.served {
            Served::Payload(value) => detect_payload(value.clone()),
            Served::Snippets(snippets) => Ok(TranscriptPayload::Entries(
                snippets.iter().cloned().map(RawEntry::from).collect(),
            )),
            Served::Fail(reason) => Err(TubecheckError::TranscriptFetch {
                video_id: video_id.to_string(),
                reason: reason.to_string(),
            }),
        }
    }
}

struct StubService {
    reply: std::result::Result<&'static str, &'static str>,
    calls: Arc<Calls>,
}

#[async_trait]
impl CompletionService for StubService {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        self.calls.complete.fetch_add(1, Ordering::SeqCst);
        self.reply
            .map(str::to_string)
            .map_err(|reason| TubecheckError::AnalysisService {
                reason: reason.to_string(),
            })
    }
}

fn pipeline(
    served: Served,
    reply: std::result::Result<&'static str, &'static str>,
) -> (Pipeline<StubSource, StubService>, Arc<Calls>) {
    let calls = Arc::new(Calls::default());
    let source = StubSource {
        served,
        calls: calls.clone(),
    };
    let service = StubService {
        reply,
        calls: calls.clone(),
    };
    (
        Pipeline::new(source, ContentAnalyzer::new(service, "gpt-4")),
        calls,
    )
}

#[tokio::test]
async fn empty_transcript_yields_error_record() {
    let (pipeline, calls) = pipeline(Served::Payload(json!([])), Ok("unused"));

    let output = pipeline.run("abc").await;

    assert_eq!(
        serde_json::to_value(&output).unwrap(),
        json!({"error": "No transcript data returned", "videoId": "abc"})
    );
    assert_eq!(calls.complete.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fetch_failure_yields_analysis_failed_record() {
    let (pipeline, calls) = pipeline(Served::Fail("connection refused"), Ok("unused"));

    let output = pipeline.run("abc").await;

    let PipelineOutput::Failure(record) = output else {
        panic!("expected the error shape");
    };
    assert!(record.error.starts_with("Analysis failed: "));
    assert!(record.error.contains("connection refused"));
    assert_eq!(record.video_id, "abc");
    assert_eq!(calls.complete.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn analyzer_failure_still_produces_full_record() {
    let (pipeline, _) = pipeline(
        Served::Payload(json!([{"text": "hello there", "start": 0.0}])),
        Err("rate limited"),
    );

    let output = pipeline.run("vid42").await;

    let PipelineOutput::Analysis(result) = output else {
        panic!("expected the full shape");
    };
    assert!(result.analysis.starts_with("Error analyzing content: "));
    assert!(result.analysis.contains("rate limited"));
    assert_eq!(result.toxicity_score, 5);
    assert!(result.bias_tags.is_empty());
    assert_eq!(result.video_id, "vid42");
}

#[tokio::test]
async fn successful_run_extracts_signals() {
    let (pipeline, calls) = pipeline(
        Served::Payload(json!({
            "tracks": [{"transcript": [
                {"text": "welcome back", "start": 0.0},
                {"text": "today we talk politics", "start": 2.5}
            ]}]
        })),
        Ok("Toxicity score: 3/10\nBias: mild political bias detected.\nMisinformation: none."),
    );

    let output = pipeline.run("abc").await;

    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["toxicityScore"], 3);
    assert_eq!(json["biasTags"], json!(["Political"]));
    assert_eq!(json["thumbnail"], "https://img.youtube.com/vi/abc/maxresdefault.jpg");
    assert_eq!(calls.list.load(Ordering::SeqCst), 1);
    assert_eq!(calls.fetch.load(Ordering::SeqCst), 1);
    assert_eq!(calls.complete.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn progress_reports_each_stage_in_order() {
    let (pipeline, _) = pipeline(
        Served::Payload(json!([{"text": "a"}, {"text": "b"}])),
        Ok("fine"),
    );
    let mut seen = Vec::new();

    let output = pipeline
        .run_with_progress("abc", |stage| {
            seen.push(match stage {
                Stage::Fetching => "fetching".to_string(),
                Stage::Fetched { entries, chars } => format!("fetched {} {}", entries.len(), chars),
                Stage::Analyzing => "analyzing".to_string(),
                Stage::Analyzed { analysis } => format!("analyzed {analysis}"),
            })
        })
        .await;

    assert!(!output.is_failure());
    assert_eq!(
        seen,
        vec!["fetching", "fetched 2 3", "analyzing", "analyzed fine"]
    );
}

#[tokio::test]
async fn mapping_and_snippet_sources_concatenate_identically() {
    let texts = ["first line", "second line", "third"];
    let mapping = serde_json::Value::Array(
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| json!({"text": t, "start": i as f64}))
            .collect(),
    );
    let snippets = texts
        .iter()
        .enumerate()
        .map(|(i, t)| Snippet {
            text: t.to_string(),
            start: i as f64,
            duration: 1.0,
        })
        .collect();

    let from_mapping = StubSource {
        served: Served::Payload(mapping),
        calls: Arc::default(),
    };
    let from_snippets = StubSource {
        served: Served::Snippets(snippets),
        calls: Arc::default(),
    };

    let a = from_mapping.fetch("v").await.unwrap().into_entries().unwrap();
    let b = from_snippets.fetch("v").await.unwrap().into_entries().unwrap();

    assert_eq!(concat_transcript(&a), concat_transcript(&b));
    assert_eq!(concat_transcript(&a), "first line second line third");
}

#[tokio::test]
async fn gender_bias_only_tags_gender() {
    let (pipeline, _) = pipeline(
        Served::Payload(json!([{"text": "x"}])),
        Ok("There is some GENDER-related BIAS in the framing."),
    );

    let PipelineOutput::Analysis(result) = pipeline.run("abc").await else {
        panic!("expected the full shape");
    };
    assert_eq!(result.bias_tags, vec![BiasTag::Gender]);
}

fn openai_key(name: &str) -> Option<String> {
    (name == "OPENAI_API_KEY").then(|| "sk-test-key".to_string())
}

#[test]
fn missing_credential_stops_before_the_pipeline_is_built() {
    let built = AtomicUsize::new(0);
    let mut calls = None;

    let startup = start(|_| None, Overrides::default(), |_: &Settings| {
        built.fetch_add(1, Ordering::SeqCst);
        let (pipeline, counters) = pipeline(Served::Payload(json!([{"text": "x"}])), Ok("unused"));
        calls = Some(counters);
        Ok(pipeline)
    });

    assert!(matches!(
        startup,
        Err(TubecheckError::MissingCredential { ref env_var, .. }) if env_var == "OPENAI_API_KEY"
    ));
    assert_eq!(built.load(Ordering::SeqCst), 0);
    assert!(calls.is_none());
}

#[test]
fn build_failure_becomes_an_error_record() {
    let overrides = Overrides {
        video_id: Some("abc".to_string()),
        ..Overrides::default()
    };

    let startup = start(openai_key, overrides, |_: &Settings| {
        Err::<Pipeline<StubSource, StubService>, _>(TubecheckError::InvalidConfig {
            reason: "bad transcript url".to_string(),
        })
    })
    .unwrap();

    let Startup::Failed(settings, output) = startup else {
        panic!("expected a failed startup");
    };
    assert_eq!(settings.video_id, "abc");
    assert!(output.is_failure());
    assert_eq!(
        serde_json::to_value(&output).unwrap(),
        json!({
            "error": "Analysis failed: Invalid configuration: bad transcript url",
            "videoId": "abc"
        })
    );
}

#[tokio::test]
async fn ready_startup_runs_with_resolved_settings() {
    let mut calls = None;

    let startup = start(openai_key, Overrides::default(), |settings: &Settings| {
        assert_eq!(settings.api_key, "sk-test-key");
        let (pipeline, counters) = pipeline(
            Served::Payload(json!([{"text": "hello"}])),
            Ok("Toxicity score: 1"),
        );
        calls = Some(counters);
        Ok(pipeline)
    })
    .unwrap();

    let Startup::Ready(settings, pipeline) = startup else {
        panic!("expected a ready pipeline");
    };
    let calls = calls.unwrap();
    assert_eq!(calls.complete.load(Ordering::SeqCst), 0);

    let PipelineOutput::Analysis(result) = pipeline.run(&settings.video_id).await else {
        panic!("expected the full shape");
    };
    assert_eq!(result.video_id, "5NojPQTNx9s");
    assert_eq!(result.toxicity_score, 1);
    assert_eq!(calls.complete.load(Ordering::SeqCst), 1);
}
