use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use narrator::config::Settings;
use narrator::domain::entities::SilenceSpec;
use narrator::infrastructure::silence::SilencePadder;
use narrator::infrastructure::speech::NlsSpeechClient;
use narrator::pipeline::driver::{Pipeline, Source};
use std::path::PathBuf;
use std::process::ExitCode;

/// Convert PowerPoint speaker notes or a narration script into speech clips.
#[derive(Parser, Debug)]
#[command(name = "narrator", version)]
#[command(group(ArgGroup::new("source").required(true).multiple(true).args(["pptx", "text"])))]
struct Cli {
    /// PowerPoint file whose speaker notes are narrated, one clip per slide.
    #[arg(long)]
    pptx: Option<PathBuf>,
    /// Text file split into one clip per blank-line separated paragraph.
    #[arg(long)]
    text: Option<PathBuf>,
    /// Output directory (receives `texts/` and `audios/`).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Seconds of silence appended to the end of every clip.
    #[arg(long)]
    silence: Option<u32>,
    /// TOML settings file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Speaker voice requested from the speech service.
    #[arg(long)]
    voice: Option<String>,
    /// Pause between successful speech requests, in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())
        .with_context(|| format!("loading settings from {:?}", cli.config))?;
    if let Some(voice) = cli.voice {
        settings.speech.voice = voice;
    }
    if let Some(seconds) = cli.silence {
        settings.pipeline.silence_seconds = seconds;
    }
    if let Some(delay_ms) = cli.delay_ms {
        settings.pipeline.request_delay_ms = delay_ms;
    }
    let output = cli.output.unwrap_or_else(|| PathBuf::from(&settings.pipeline.output_dir));

    let source = Source::select(cli.pptx, cli.text)?;
    let client = NlsSpeechClient::new(settings.speech.clone()).context("configuring the speech client")?;
    let padder = SilencePadder::new(SilenceSpec::new(settings.pipeline.silence_seconds));

    let report = Pipeline::new(&client, padder, settings.pipeline.request_delay())
        .with_progress(true)
        .run(&source, &output)
        .with_context(|| format!("narrating into {}", output.display()))?;

    if report.is_complete() {
        log::info!("Done: {}", report.summary());
        Ok(ExitCode::SUCCESS)
    } else {
        for (index, reason) in &report.failed {
            log::error!("Segment {:03} was not synthesized: {}", index, reason);
        }
        log::error!("Finished with {} failed segment(s): {}", report.failure_count(), report.summary());
        Ok(ExitCode::from(2))
    }
}
