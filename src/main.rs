use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jsbridge::{BridgeConfig, BridgeError, Engine, HostFunctions, HostRegistry};

#[derive(Parser, Debug)]
#[command(name = "jsbridge")]
#[command(about = "Run JavaScript with host functions bridged in")]
#[command(version)]
struct Args {
    /// Extra configuration file, merged over the user config
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Evaluate a snippet (may be repeated, runs before FILEs)
    #[arg(short, long = "eval", value_name = "CODE")]
    eval: Vec<String>,

    /// Script files to evaluate in order
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = BridgeConfig::load(args.config.as_deref())?;

    // Initialize logging to file (never stdout, scripts own it)
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "jsbridge.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    tracing::info!("jsbridge starting");

    let engine = Engine::new(&config.runtime)?;
    let mut registry = HostRegistry::new();
    HostFunctions::register_all(&mut registry, &config.host)?;
    engine.install(registry)?;

    let mut sources: Vec<(String, String)> = args
        .eval
        .into_iter()
        .enumerate()
        .map(|(idx, code)| (format!("<eval #{}>", idx + 1), code))
        .collect();
    for path in &args.files {
        let code = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        sources.push((path.display().to_string(), code));
    }

    for (origin, code) in sources {
        tracing::debug!(%origin, "evaluating");

        let outcome = engine
            .eval(&code)
            .and_then(|value| engine.execute_pending_jobs().map(|_| value));

        match outcome {
            Ok(value) => println!("{value}"),
            Err(BridgeError::Script(err)) => {
                eprintln!("{origin}: {}", err.cause);
                if let Some(stack) = err.stack.as_deref() {
                    eprintln!("{stack}");
                }
                tracing::info!(%origin, cause = %err.cause, "script failed");
                return Ok(ExitCode::FAILURE);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(ExitCode::SUCCESS)
}
