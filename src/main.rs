use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use senti::client::ServingClient;
use senti::config::Settings;
use senti::display::{display_prediction, display_signature};
use senti::hub::ModelFetcher;
use senti::pipeline::{Pipeline, PipelineOptions};
use senti::server::ApiServer;

mod cli;
use cli::{Cli, Command, ModelArgs, TextArgs};

/// Main entry point for senti
///
/// Loads settings, initializes logging and runs one subcommand. Any stage
/// error propagates here unchanged and ends the process with a non-zero
/// exit status.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load settings first
    let mut settings = Settings::load(&cli.config).context("Failed to load configuration")?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _guard = init_logging(&settings, cli.verbose);
    info!("senti starting up...");

    match cli.command {
        Command::Download { model_id, output } => {
            if let Some(model_id) = model_id {
                settings.model.id = model_id;
            }
            if let Some(output) = output {
                settings.hub.cache_dir = output;
            }
            let fetcher = ModelFetcher::new(&settings.hub)?;
            let bundle = fetcher
                .fetch(&settings.model.id)
                .await
                .with_context(|| format!("Failed to download '{}'", settings.model.id))?;
            println!("{}", bundle.model_dir.display());
        }

        Command::Convert { model, text } => {
            apply_model_args(&mut settings, &model);
            if let Some(text) = text.text {
                settings.model.sample_text = text;
            }
            let pipeline = Pipeline::new(&settings, PipelineOptions::from_settings(&settings))?;
            let bundle = pipeline
                .fetch()
                .await
                .with_context(|| format!("Failed to download '{}'", settings.model.id))?;
            let artifact = pipeline.convert(&bundle).context("Failed to convert model")?;
            println!("{}", artifact.path.display());
        }

        Command::Run { model, text, force_convert, show_signature } => {
            apply_model_args(&mut settings, &model);
            let text = input_text(&settings, text);

            let mut options = PipelineOptions::from_settings(&settings);
            options.force_convert = force_convert;
            let pipeline = Pipeline::new(&settings, options)?;

            let mut classifier = pipeline.prepare().await.context("Failed to prepare model")?;
            if show_signature {
                display_signature(classifier.signature());
            }
            let prediction = classifier.classify(&text).context("Failed to classify text")?;
            display_prediction(&text, &prediction);
        }

        Command::Serve { model, host, port } => {
            apply_model_args(&mut settings, &model);
            let host = host.unwrap_or_else(|| settings.server.host.clone());
            let port = port.unwrap_or(settings.server.port);

            let pipeline = Pipeline::new(&settings, PipelineOptions::from_settings(&settings))?;
            let classifier = pipeline.prepare().await.context("Failed to prepare model")?;

            let server = ApiServer::new(classifier, host, port);
            server.start().await.map_err(|e| anyhow!("Server error: {}", e))?;
        }

        Command::Client { text, url } => {
            let text = input_text(&settings, text);
            let url = url.unwrap_or_else(|| settings.client.url.clone());

            let prediction = ServingClient::new(&url)
                .classify(&text)
                .await
                .with_context(|| format!("Request to {} failed", url))?;
            display_prediction(&text, &prediction);
        }
    }

    Ok(())
}

fn apply_model_args(settings: &mut Settings, args: &ModelArgs) {
    if let Some(model_id) = &args.model_id {
        settings.model.id = model_id.clone();
    }
    if let Some(model_path) = &args.model_path {
        settings.model.artifact_path = model_path.clone();
    }
}

fn input_text(settings: &Settings, args: TextArgs) -> String {
    args.text.unwrap_or_else(|| settings.model.sample_text.clone())
}

/// Logs to a daily rolling file when `logging.file` names a directory,
/// otherwise to stderr. `RUST_LOG` overrides the configured level.
fn init_logging(settings: &Settings, verbose: bool) -> Option<WorkerGuard> {
    let level = if verbose { "debug" } else { settings.logging.level.as_str() };
    let filter = if verbose {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{},ort=warn", level)))
    };

    match &settings.logging.file {
        Some(log_dir) => {
            let file_appender = tracing_appender::rolling::RollingFileAppender::new(
                tracing_appender::rolling::Rotation::DAILY,
                log_dir,
                "senti",
            );
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(non_blocking)
                // Disable ANSI colors for cleaner log files
                .with_ansi(false)
                .with_line_number(true)
                .with_file(true)
                .with_thread_ids(true)
                .with_target(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            None
        }
    }
}
