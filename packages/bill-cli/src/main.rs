//! `analyze` - run the energy bill pipeline on a file.
//!
//! ```text
//! analyze bill.pdf
//! analyze photo.heic --media-type jpeg
//! analyze bill.pdf --json > run.json
//! ```

mod config;
mod render;

use anyhow::{Context, Result};
use bill_pipeline::{AnthropicDelegate, MediaType, Pipeline, PipelineRun, RawDocument};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::render::{render_progress, render_run};

#[derive(Parser, Debug)]
#[command(name = "analyze", version, about = "Analyze an energy bill")]
struct Args {
    /// Bill to analyze (PDF, PNG, JPEG, GIF, or WebP)
    file: PathBuf,

    /// Override media type detection (pdf, png, jpeg, gif, webp, or a MIME type)
    #[arg(long)]
    media_type: Option<MediaType>,

    /// Print the run record as JSON instead of the rendered report
    #[arg(long)]
    json: bool,

    /// Model for every stage
    #[arg(long)]
    model: Option<String>,

    /// Benchmark from model knowledge only
    #[arg(long)]
    no_web_search: bool,

    /// Per-call timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging (stderr, so stdout stays clean for --json)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bill_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Credentials first: a missing key must fail before any work is done
    let config = Config::from_env().context("Failed to load configuration")?;

    let doc = RawDocument::load(&args.file, args.media_type)
        .await
        .with_context(|| format!("Failed to load bill {}", args.file.display()))?;

    let mut pipeline_config = config.pipeline_config();
    if let Some(model) = args.model {
        pipeline_config = pipeline_config.with_model(model);
    }
    if args.no_web_search {
        pipeline_config = pipeline_config.with_web_search(false);
    }
    if let Some(secs) = args.timeout_secs {
        pipeline_config = pipeline_config.with_call_timeout(Duration::from_secs(secs));
    }

    let delegate = AnthropicDelegate::new(&config.credentials());
    let pipeline = Pipeline::new(delegate).with_config(pipeline_config);

    tracing::info!(
        file = %args.file.display(),
        media_type = %doc.media_type(),
        "Analyzing bill"
    );

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let progress = |run: &PipelineRun| {
        if let Some(stage) = run.state().active_stage() {
            eprintln!("{}", render_progress(stage));
        }
    };

    let run = pipeline.run_with_cancel(&doc, &progress, cancel).await;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&run).context("Failed to serialize run")?
        );
    } else {
        print!("{}", render_run(&run));
    }

    if !run.is_complete() {
        std::process::exit(1);
    }
    Ok(())
}
