use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use tubecheck_core::{
    Overrides, PipelineOutput, Provider, Stage, Startup, connect, format_preview,
    format_timestamp, start,
};

const PREVIEW_ENTRIES: usize = 10;

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, ValueEnum)]
enum CliProvider {
    Openai,
    Grok,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Openai => Provider::Openai,
            CliProvider::Grok => Provider::Grok,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Parser)]
#[command(name = "tubecheck")]
#[command(
    about = "Fetch a YouTube transcript and assess it for toxicity, bias and misinformation"
)]
struct Cli {
    /// Video ID. Defaults to $VIDEO_ID, then 5NojPQTNx9s.
    video_id: Option<String>,

    /// AI provider for the analysis. Defaults to $TUBECHECK_PROVIDER, then openai.
    #[arg(short, long)]
    provider: Option<CliProvider>,

    /// Model name (e.g., "gpt-4", "gpt-3.5-turbo"). Defaults to the provider's model.
    #[arg(short, long)]
    model: Option<String>,

    /// Base URL of the transcript service
    #[arg(long)]
    transcript_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Preview the transcript and print the raw analysis
    #[arg(short, long)]
    verbose: bool,

    /// Only print the JSON result
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            video_id: self.video_id.clone(),
            provider: self.provider.clone().map(Provider::from),
            model: self.model.clone(),
            transcript_api_url: self.transcript_url.clone(),
            timeout_secs: self.timeout,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "tubecheck=info,tubecheck_core=info"
    } else {
        "tubecheck=warn,tubecheck_core=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn create_spinner(msg: &str, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .expect("spinner template is valid"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Resolve configuration before touching the network
    let startup = match start(|name| std::env::var(name).ok(), cli.overrides(), connect) {
        Ok(startup) => startup,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let (settings, pipeline) = match startup {
        Startup::Ready(settings, pipeline) => (settings, pipeline),
        Startup::Failed(_, output) => {
            println!("{}", output.to_json_pretty()?);
            return Ok(());
        }
    };

    if !cli.quiet {
        eprintln!(
            "\n{}  {}\n",
            style("tubecheck").cyan().bold(),
            style("Content Moderator").dim()
        );
        eprintln!(
            "{} API key loaded: {}",
            style("✓").green().bold(),
            style(settings.masked_api_key()).dim()
        );
        eprintln!(
            "{} Video: {}  Model: {} ({})",
            style("✓").green().bold(),
            style(&settings.video_id).yellow(),
            style(&settings.model).yellow(),
            settings.provider.name()
        );
        eprintln!("{}", style("─".repeat(60)).dim());
    }

    let spinner = create_spinner("Fetching transcript...", cli.quiet);
    let total_start = Instant::now();
    let mut step_start = Instant::now();

    let output = pipeline
        .run_with_progress(&settings.video_id, |stage| match stage {
            Stage::Fetching => spinner.set_message("Fetching transcript..."),
            Stage::Fetched { entries, chars } => {
                let ends_at = entries.last().map(|e| e.start).unwrap_or(0.0);
                spinner.println(format!(
                    "{} Transcript retrieved: {} entries, {} characters, ends at {} {}",
                    style("✓").green().bold(),
                    entries.len(),
                    chars,
                    format_timestamp(ends_at),
                    style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
                ));
                if cli.verbose {
                    spinner.println(format!(
                        "{}\n{}",
                        style(format!("First {} entries:", PREVIEW_ENTRIES)).dim(),
                        format_preview(entries, PREVIEW_ENTRIES)
                    ));
                }
            }
            Stage::Analyzing => {
                step_start = Instant::now();
                spinner.set_message(format!(
                    "Analyzing content with {}...",
                    settings.provider.name()
                ));
            }
            Stage::Analyzed { analysis } => {
                spinner.println(format!(
                    "{} Analysis received {}",
                    style("✓").green().bold(),
                    style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
                ));
                if cli.verbose {
                    let rule = style("═".repeat(60)).dim();
                    spinner.println(format!("{rule}\n{analysis}\n{rule}"));
                }
            }
        })
        .await;

    spinner.finish_and_clear();

    if !cli.quiet {
        match &output {
            PipelineOutput::Analysis(result) => eprintln!(
                "{} Toxicity {} | Bias {} {}",
                style("✓").green().bold(),
                style(result.toxicity_score).yellow(),
                style(format!("{:?}", result.bias_tags)).yellow(),
                style(format!("[{}]", format_duration(total_start.elapsed()))).dim()
            ),
            PipelineOutput::Failure(record) => {
                eprintln!("{} {}", style("✗").red().bold(), record.error)
            }
        }
    }

    println!("{}", output.to_json_pretty()?);

    Ok(())
}
