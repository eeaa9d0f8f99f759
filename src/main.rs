use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use local_transcript::extractors::LocalMediaExtractor;
use local_transcript::transcribe::{TranscriptOptions, WhisperClient};
use local_transcript::{Cli, Config, TranscriptionPipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing; everything but the transcript goes to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    match run(&cli).await {
        Ok(transcript) => {
            println!("{}", transcript);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!("{:?}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<String> {
    let config = Config::load(cli.config.as_deref())?.with_api_base(cli.api_base.as_deref())?;

    let transcriber = cli
        .api_key()
        .map(|key| WhisperClient::new(key, &config.whisper, !cli.quiet))
        .transpose()?;

    let pipeline = TranscriptionPipeline::new(
        LocalMediaExtractor::new(&config),
        transcriber,
        config.whisper.max_upload_bytes(),
    );

    let options = TranscriptOptions {
        with_timestamps: cli.timestamps,
        sub_track: cli.sub_track,
    };

    let transcript = pipeline.run(&cli.file, options).await?;
    tracing::debug!("Transcript source: {:?}", transcript.source);

    Ok(transcript.text)
}
