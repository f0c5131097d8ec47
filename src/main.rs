use anyhow::Context as _;
use clap::Parser;
use dotenvy::dotenv;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use transcue::subtitle::{CueConfig, transcript_to_vtt};
use transcue::transcription::TranscriptFetcher;

/// Convert a word-timed JSON transcript into WebVTT subtitles.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Transcript file path or http(s) URL
    input: String,

    /// Write WebVTT to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum words per cue (overrides TRANSCUE_WORDS_PER_CUE)
    #[arg(short = 'w', long)]
    words_per_cue: Option<usize>,

    /// Maximum cue duration in seconds (overrides TRANSCUE_MAX_CUE_DURATION)
    #[arg(short = 'd', long)]
    max_cue_duration: Option<f64>,

    /// Show a download progress bar for URL inputs
    #[arg(long)]
    progress: bool,
}

impl Args {
    fn cue_config(&self) -> anyhow::Result<CueConfig> {
        let base = CueConfig::from_env().context("Invalid cue settings in environment")?;
        self.apply_overrides(base)
    }

    /// Layer command-line limits over `base` and validate the result
    fn apply_overrides(&self, mut config: CueConfig) -> anyhow::Result<CueConfig> {
        if let Some(words_per_cue) = self.words_per_cue {
            config = config.with_words_per_cue(words_per_cue);
        }
        if let Some(max_cue_duration) = self.max_cue_duration {
            config = config.with_max_cue_duration(max_cue_duration);
        }

        config.validate()?;
        Ok(config)
    }
}

fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Read `input` from disk or over HTTP and convert it to WebVTT
async fn convert(input: &str, config: &CueConfig, progress: bool) -> anyhow::Result<String> {
    let vtt = if is_url(input) {
        TranscriptFetcher::new()
            .with_progress(progress)
            .load_vtt(input, config)
            .await
            .with_context(|| format!("Failed to convert {}", input))?
    } else {
        let content = std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input))?;
        transcript_to_vtt(&content, config)
            .with_context(|| format!("Failed to convert {}", input))?
    };
    Ok(vtt)
}

fn write_output(path: Option<&Path>, vtt: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, vtt)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} bytes to {}", vtt.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(vtt.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "transcue=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.cue_config()?;

    let vtt = convert(&args.input, &config, args.progress).await?;
    write_output(args.output.as_deref(), &vtt)?;
    Ok(())
}
