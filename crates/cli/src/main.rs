//! idphoto CLI - one-shot local photo generation
//!
//! Wires the same pipeline as the server, without HTTP in between.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use idphoto_core::application::PhotoPipeline;
use idphoto_core::domain::SourceImage;
use idphoto_core::port::background_editor::DisabledBackgroundEditor;
use idphoto_core::port::time_provider::SystemTimeProvider;
use idphoto_core::port::BackgroundEditor;
use idphoto_infra_gemini::{GeminiBackgroundEditor, GeminiConfig};
use idphoto_infra_imaging::ImagingBackend;

#[derive(Parser)]
#[command(name = "idphoto")]
#[command(about = "ID/passport photo generator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a 35x45mm @ 300dpi ID photo from a portrait
    Generate {
        /// Input image (JPEG, PNG or WebP)
        #[arg(short, long)]
        input: PathBuf,

        /// Output JPEG path
        #[arg(short, long)]
        output: PathBuf,

        /// Skip the generative background edit (no API key needed)
        #[arg(long)]
        no_background_edit: bool,

        /// Gemini model override
        #[arg(long, env = "IDPHOTO_GEMINI_MODEL")]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("idphoto=warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            output,
            no_background_edit,
            model,
        } => generate(input, output, no_background_edit, model).await,
    }
}

async fn generate(
    input: PathBuf,
    output: PathBuf,
    no_background_edit: bool,
    model: Option<String>,
) -> Result<()> {
    let bytes =
        std::fs::read(&input).with_context(|| format!("failed reading {}", input.display()))?;

    let editor: Arc<dyn BackgroundEditor> = if no_background_edit {
        Arc::new(DisabledBackgroundEditor)
    } else {
        let mut config = GeminiConfig::from_env()
            .context("GEMINI_API_KEY is not set (pass --no-background-edit to run without it)")?;
        if let Some(model) = model {
            config = config.with_model(model);
        }
        Arc::new(GeminiBackgroundEditor::new(config)?)
    };

    let pipeline = PhotoPipeline::with_defaults(
        Arc::new(ImagingBackend::new()),
        editor,
        Arc::new(SystemTimeProvider),
    );

    let artifact = pipeline.generate(SourceImage::new(bytes, None)).await?;

    std::fs::write(&output, &artifact.bytes)
        .with_context(|| format!("failed writing {}", output.display()))?;

    println!(
        "{} {} ({}x{}, background: {}, {} bytes)",
        "Saved".green().bold(),
        output.display(),
        artifact.width,
        artifact.height,
        artifact.background,
        artifact.bytes.len()
    );

    Ok(())
}
