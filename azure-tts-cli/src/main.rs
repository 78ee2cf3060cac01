use anyhow::{Context, Result};
use azure_tts_core::command::{save_config, set_key, speak, CommandContext, Outcome, SpeakArgs};
use azure_tts_core::credentials::{KeyringStore, SERVICE_NAME};
use azure_tts_core::env::{Env, ProcessEnv};
use azure_tts_core::output::OutputSink;
use azure_tts_core::settings::{ConfigOverrides, SettingsManager};
use azure_tts_core::{TtsError, Voice};
use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::Parser;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use strum::VariantNames;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_FILTER_VAR: &str = "AZURE_TTS_LOG";

/// Convert text to speech using the Azure OpenAI text-to-speech API
///
/// Usage:
///
///     azure-tts "Hello there!" --output audio.mp3
///     echo "Hello there!" | azure-tts > audio.mp3
#[derive(Parser, Debug)]
#[command(name = "azure-tts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(verbatim_doc_comment)]
struct Args {
    /// Text to speak, or `-` to read it from stdin
    #[arg(default_value = "-")]
    text: String,

    /// API key to use
    #[arg(long)]
    key: Option<String>,

    /// Voice to use
    #[arg(
        long,
        default_value_t = Voice::default(),
        value_parser = PossibleValuesParser::new(Voice::VARIANTS.iter().copied()).try_map(|s| s.parse::<Voice>())
    )]
    voice: Voice,

    /// Output file path (defaults to stdout)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Azure OpenAI endpoint, e.g. https://my-resource.openai.azure.com
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// API version, e.g. 2024-02-15-preview
    #[arg(long, value_name = "VERSION")]
    api_version: Option<String>,

    /// Name of the text-to-speech deployment
    #[arg(long, value_name = "NAME")]
    deployment: Option<String>,

    /// Save --api-base, --api-version and --deployment to the settings file and exit
    #[arg(long)]
    save_config: bool,

    /// Store the --key value (or the first line of stdin) in the system keyring and exit
    #[arg(long)]
    set_key: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let env = ProcessEnv;

    let settings = match SettingsManager::new(&env) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = setup_tracing(settings.user_dir(), &env) {
        eprintln!("Warning: failed to initialize logging: {e:#}");
    }

    match run(args, &env, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("azure-tts failed: {e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// 2 for invocation mistakes (matching clap's own usage errors), 1 for
/// everything else.
fn exit_code(err: &anyhow::Error) -> u8 {
    let usage = err
        .downcast_ref::<TtsError>()
        .is_some_and(TtsError::is_usage);
    if usage {
        2
    } else {
        1
    }
}

fn run(args: Args, env: &dyn Env, settings: &SettingsManager) -> Result<()> {
    info!(
        "CLI startup: voice={}, output={:?}, text_from_stdin={}, save_config={}, set_key={}",
        args.voice,
        args.output,
        args.text == "-",
        args.save_config,
        args.set_key
    );

    let store = KeyringStore;

    if args.set_key {
        set_key(args.key.as_deref(), &store, &mut io::stdin().lock())?;
        eprintln!("Stored API key for {SERVICE_NAME}");
        return Ok(());
    }

    let overrides = ConfigOverrides {
        api_base: args.api_base,
        api_version: args.api_version,
        deployment_name: args.deployment,
    };

    if args.save_config {
        let path = save_config(&overrides, settings)?;
        eprintln!("Saved settings to {}", path.display());
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let ctx = CommandContext {
        env,
        store: &store,
        settings,
    };
    let speak_args = SpeakArgs {
        text: args.text,
        key: args.key,
        voice: args.voice,
        output: OutputSink::from_path(args.output),
        overrides,
    };

    let outcome = runtime.block_on(speak(
        speak_args,
        &ctx,
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
    ))?;

    if let Outcome::RateLimited { message } = outcome {
        eprintln!("{message}");
    }

    Ok(())
}

fn setup_tracing(user_dir: &Path, env: &dyn Env) -> Result<()> {
    use std::fs;
    use tracing_subscriber::fmt;

    let trace_dir = user_dir.join("trace");
    fs::create_dir_all(&trace_dir)
        .with_context(|| format!("Failed to create trace directory {trace_dir:?}"))?;

    let log_file = trace_dir.join("azure-tts.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .with_context(|| format!("Failed to open log file {log_file:?}"))?;

    let filter = env
        .var(LOG_FILTER_VAR)
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    info!("Tracing initialized to {:?}", log_file);
    Ok(())
}
