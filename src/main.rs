use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

use facsched::app::{App, Command};
use facsched::config::Config;
use facsched::logging;
use facsched::store::DataStore;

#[derive(Parser, Debug)]
#[command(name = "facsched")]
#[command(about = "Faculty scheduling client that keeps working offline")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/facsched/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Scheduling API base URL
  #[arg(long)]
  api_url: Option<String>,

  /// Print JSON instead of tables
  #[arg(long)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = Config::load(args.config.as_deref())?;
  if let Some(url) = args.api_url {
    config.api.url = url;
  }

  let _log_guard = logging::init(&config.log)?;

  let store = DataStore::new(&config)?;
  let app = App::new(store, args.json);
  let output = app.run(args.command).await?;
  print!("{}", output);

  Ok(())
}
