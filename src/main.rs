mod api;
mod app;
mod config;
mod event;
mod form;
mod logging;
mod notify;
mod query;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(about = "A terminal UI for managing employee records")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/roster/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Employee collection endpoint (overrides config and ROSTER_API_URL)
  #[arg(short, long)]
  base_url: Option<String>,

  /// Directory for log files (default: $XDG_DATA_HOME/roster/logs)
  #[arg(long)]
  log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let _log_guard = logging::init(args.log_dir.as_deref())?;

  // Load configuration
  let config = config::Config::load(args.config.as_deref(), args.base_url)?;
  tracing::info!(base_url = %config.api.base_url, "starting roster");

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
