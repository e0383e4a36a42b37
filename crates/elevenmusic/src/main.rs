//! elevenmusic - generate music with the ElevenLabs Music API
//!
//! Subcommands:
//! - `elevenmusic generate` - Generate a track from a prompt or composition plan
//! - `elevenmusic detailed` - Same, through the detailed endpoint
//! - `elevenmusic plan` - Create a composition plan from a prompt
//! - `elevenmusic batch <file>` - Run a JSON array of items in order
//! - `elevenmusic verify` - Check the configured API key
//! - `elevenmusic config` - Show the effective configuration

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use elevenconf::{ConfigSources, ElevenConfig};
use elevenmusic::{
    decode_audio, telemetry, AdditionalOptions, BatchRunner, FailureMode, GenerationResult,
    HttpTransport, ItemParams, ParamDefaults, RequestAdapter,
};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "elevenmusic")]
#[command(about = "Generate music with the ElevenLabs Music API")]
#[command(version)]
struct Cli {
    /// Config file (replaces ./elevenmusic.toml)
    #[arg(long, global = true, env = "ELEVENMUSIC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate music from a prompt or composition plan
    Generate(GenerateArgs),

    /// Generate music through the detailed endpoint
    Detailed(GenerateArgs),

    /// Create a composition plan from a prompt
    Plan {
        /// Text description of the music (max 2000 characters)
        #[arg(short, long)]
        prompt: String,

        /// Length in seconds (10-300)
        #[arg(short, long)]
        seconds: Option<u32>,

        /// Model id (e.g. music_v1)
        #[arg(long)]
        model: Option<String>,
    },

    /// Run a JSON file of items (an array, or a single object)
    Batch {
        file: PathBuf,

        /// Record failed items as {error} instead of aborting
        #[arg(long)]
        continue_on_fail: bool,
    },

    /// Check the configured API key against the API
    Verify,

    /// Print the effective configuration (API key masked)
    Config,
}

#[derive(Args)]
struct GenerateArgs {
    /// Text description of the music (max 2000 characters)
    #[arg(short, long, default_value = "")]
    prompt: String,

    /// Length in seconds (10-300)
    #[arg(short, long)]
    seconds: Option<u32>,

    /// Output format (mp3_44100_128, mp3_44100_192, mp3_22050_32, pcm_44100)
    #[arg(short, long)]
    format: Option<String>,

    /// Model id (e.g. music_v1)
    #[arg(long)]
    model: Option<String>,

    /// JSON composition plan to use instead of the prompt
    #[arg(long)]
    plan_file: Option<PathBuf>,

    /// Write decoded audio here instead of printing base64
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl GenerateArgs {
    fn to_params(&self) -> Result<ItemParams> {
        let composition_plan = match &self.plan_file {
            Some(path) => Some(Value::String(std::fs::read_to_string(path).with_context(
                || format!("Failed to read composition plan {}", path.display()),
            )?)),
            None => None,
        };

        Ok(ItemParams {
            prompt: self.prompt.clone(),
            music_length_seconds: self.seconds,
            output_format: self.format.clone(),
            additional_options: AdditionalOptions {
                model_id: self.model.clone(),
                use_composition_plan: composition_plan.is_some(),
                composition_plan,
            },
            ..Default::default()
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources) = ElevenConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;

    let guard = telemetry::init(&config.telemetry.log_level, config.telemetry.otlp_endpoint())?;
    let result = run(cli.command, &config, &sources).await;
    guard.shutdown();
    result
}

async fn run(command: Commands, config: &ElevenConfig, sources: &ConfigSources) -> Result<()> {
    if let Commands::Config = command {
        print!("{}", config.to_toml());
        for file in &sources.files {
            println!("# loaded: {}", file.display());
        }
        for var in &sources.env_overrides {
            println!("# env: {}", var);
        }
        return Ok(());
    }

    if !config.api.has_api_key() {
        bail!("No API key configured: set ELEVENLABS_API_KEY or api.api_key in elevenmusic.toml");
    }

    let transport =
        HttpTransport::from_config(&config.api).context("Failed to create HTTP client")?;
    let adapter = RequestAdapter::with_defaults(transport, ParamDefaults::from(&config.defaults));

    match command {
        Commands::Generate(args) => {
            let result = adapter.generate_music(&args.to_params()?).await?;
            emit_generation(result, args.output.as_deref())?;
        }
        Commands::Detailed(args) => {
            let result = adapter.generate_music_detailed(&args.to_params()?).await?;
            emit_generation(result, args.output.as_deref())?;
        }
        Commands::Plan {
            prompt,
            seconds,
            model,
        } => {
            let params = ItemParams {
                plan_prompt: prompt,
                plan_music_length_seconds: seconds,
                additional_options: AdditionalOptions {
                    model_id: model,
                    ..Default::default()
                },
                ..Default::default()
            };
            let result = adapter.create_composition_plan(&params).await?;
            print_json(&result)?;
        }
        Commands::Batch {
            file,
            continue_on_fail,
        } => {
            let items = read_items(&file)?;
            let mode = FailureMode::from_continue_flag(
                continue_on_fail || config.batch.continue_on_fail,
            );
            tracing::info!(items = items.len(), ?mode, "running batch");

            let outputs = BatchRunner::new(&adapter, mode).run(items).await?;
            print_json(&outputs)?;
        }
        Commands::Verify => {
            let user = adapter
                .verify_credentials()
                .await
                .context("Credential check failed")?;
            print_json(&user)?;
        }
        Commands::Config => {}
    }

    Ok(())
}

fn emit_generation(result: GenerationResult, output: Option<&Path>) -> Result<()> {
    let Some(path) = output else {
        return print_json(&result);
    };

    let audio = decode_audio(&result)?;
    std::fs::write(path, &audio)
        .with_context(|| format!("Failed to write audio to {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = audio.len(), "wrote audio");

    let mut summary = serde_json::to_value(&result)?;
    if let Some(object) = summary.as_object_mut() {
        object.remove("audioData");
        object.insert(
            "outputFile".to_string(),
            Value::String(path.display().to_string()),
        );
        object.insert("bytes".to_string(), Value::from(audio.len()));
    }
    print_json(&summary)
}

fn read_items(path: &Path) -> Result<Vec<Value>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("Batch file {} is not valid JSON", path.display()))?;

    Ok(match value {
        Value::Array(items) => items,
        single => vec![single],
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
