use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use panel_update_check::config::{CheckerConfig, log_path};
use panel_update_check::logging;
use panel_update_check::update::checker::{CheckerSettings, UpdateChecker};
use panel_update_check::update::host::{EnvHostVersion, FixedHostVersion, HostVersion};
use panel_update_check::update::manifest::HttpManifestSource;
use panel_update_check::update::notifier::LogNotifier;

#[derive(Parser)]
#[command(name = "panel-update-check")]
#[command(version, about = "Check a plugin panel's version against its remote manifest")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Manifest URL (overrides the config file)
    #[arg(long, global = true)]
    manifest_url: Option<String>,

    /// Running version (defaults to the host's version environment variable)
    #[arg(long, global = true)]
    current_version: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Write logs to the data directory instead of stderr
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Compare once and print the result as JSON
    Check,
    /// Keep checking while an update is available, until Ctrl-C
    Watch,
}

fn load_config(cli: &Cli) -> anyhow::Result<CheckerConfig> {
    let mut config = match &cli.config {
        Some(path) => CheckerConfig::load(path)?,
        None => CheckerConfig::default(),
    };
    if let Some(url) = &cli.manifest_url {
        config.manifest_url = url.clone();
    }
    Ok(config)
}

fn build_checker(cli: &Cli, config: &CheckerConfig) -> anyhow::Result<Arc<UpdateChecker>> {
    let source = HttpManifestSource::new(&config.manifest_url, config.fetch_timeout())?;
    let host: Arc<dyn HostVersion> = match &cli.current_version {
        Some(version) => Arc::new(FixedHostVersion::new(version)),
        None => Arc::new(EnvHostVersion::new(&config.version_env)),
    };

    Ok(
        UpdateChecker::builder(Arc::new(source), Arc::new(LogNotifier))
            .host_version(host)
            .settings(CheckerSettings::from(config))
            .build(),
    )
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let checker = build_checker(&cli, &config)?;

    match cli.command.unwrap_or(Command::Check) {
        Command::Check => {
            let status = checker.check().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Watch => {
            checker.start().await;

            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            loop {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => {
                        result?;
                        break;
                    }
                    _ = ticker.tick() => {
                        if !checker.is_polling() {
                            info!("No update pending, stopping");
                            break;
                        }
                    }
                }
            }
            checker.shutdown();
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_file = cli.log_file.then(log_path);
    let _guard = logging::init(cli.debug, log_file.as_deref())?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}
