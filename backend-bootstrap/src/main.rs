use anyhow::Result;
use clap::Parser;

use backend_infrastructure::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "turnout-backend")]
#[command(about = "Turnout event registration and check-in server", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(config) = args.config {
        std::env::set_var("TURNOUT_CONFIG", config);
    }

    let config = AppConfig::load().await?;
    // Dropping the guard stops the file writer.
    let _log_guard = backend_bootstrap::logging::init(&config.log_format, config.log_dir.as_deref())?;

    backend_bootstrap::run_standalone(config).await
}
