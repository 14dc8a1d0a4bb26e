//! CLI for Retouch - AI image editing.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use retouch::{
    EditProvider, EditSession, EditedImage, GeminiModel, GeminiProvider, ImageFormat,
    PreviewStore, SessionPhase,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "retouch")]
#[command(about = "Edit images with natural-language prompts via the Gemini API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit an image according to a text prompt
    Edit(EditArgs),

    /// Verify that the service is reachable and the API key is accepted
    Check(CheckArgs),
}

#[derive(Args)]
struct EditArgs {
    /// The text prompt describing the desired edit
    prompt: String,

    /// Input image path (PNG, JPEG, or WebP)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    /// Model to use
    #[arg(short, long, value_enum, default_value = "flash")]
    model: ModelArg,
}

#[derive(Args)]
struct CheckArgs {
    /// Model to probe
    #[arg(short, long, value_enum, default_value = "flash")]
    model: ModelArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    Flash,
    Pro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Flash => GeminiModel::Flash,
            ModelArg::Pro => GeminiModel::Pro,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Edit(args) => {
            edit_image(args, cli.json).await?;
        }
        Commands::Check(args) => {
            check_service(args, cli.json).await?;
        }
    }

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("retouch=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn edit_image(args: EditArgs, json_output: bool) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let mime_type = detect_mime_type(&bytes, &args.input)?;

    let provider = GeminiProvider::builder().model(args.model.into()).build();
    let mut session = EditSession::new(Box::new(provider), PreviewStore::new());

    session.select_image(bytes, mime_type);
    session.set_prompt(&args.prompt);
    session.submit_edit().await;

    let snapshot = session.snapshot();
    match snapshot.phase {
        SessionPhase::Succeeded => {
            let url = snapshot
                .edited_data_url
                .context("succeeded without an edited image")?;
            let image = EditedImage::from_data_url(&url)?;
            image.save(&args.output)?;

            if json_output {
                let result = serde_json::json!({
                    "type": "edit",
                    "success": true,
                    "output": args.output.display().to_string(),
                    "size_bytes": image.size(),
                    "mime_type": image.mime_type,
                    "model": GeminiModel::from(args.model).as_str(),
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "Edited image: {} ({} bytes)",
                    args.output.display(),
                    image.size()
                );
            }
            Ok(())
        }
        _ => {
            let message = snapshot
                .error
                .unwrap_or_else(|| "edit did not complete".to_owned());
            anyhow::bail!(message);
        }
    }
}

async fn check_service(args: CheckArgs, json_output: bool) -> anyhow::Result<()> {
    let provider = GeminiProvider::builder().model(args.model.into()).build();
    let outcome = provider.health_check().await;

    if json_output {
        let result = serde_json::json!({
            "type": "check",
            "provider": provider.name(),
            "model": GeminiModel::from(args.model).as_str(),
            "ok": outcome.is_ok(),
            "error": outcome.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        if outcome.is_err() {
            std::process::exit(1);
        }
        return Ok(());
    }

    match outcome {
        Ok(()) => {
            println!("{}: reachable, API key accepted", provider.name());
            Ok(())
        }
        Err(e) => anyhow::bail!("{}: {e}", provider.name()),
    }
}

fn detect_mime_type(bytes: &[u8], path: &Path) -> anyhow::Result<&'static str> {
    ImageFormat::from_magic_bytes(bytes)
        .or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(ImageFormat::from_extension)
        })
        .map(|f| f.mime_type())
        .with_context(|| format!("unrecognized image format: {}", path.display()))
}
