use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use mdbrowse::core::config;
use mdbrowse::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "mdbrowse", about = "Terminal client for an md-browse document server")]
struct Args {
    /// Server URL, overrides MD_BROWSE_URL and the config file
    #[arg(long)]
    server_url: Option<String>,

    /// Log level written to mdbrowse.log
    #[arg(long, default_value = "debug")]
    log_level: LevelFilter,

    /// Config file to use instead of ~/.mdbrowse/config.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to mdbrowse.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("mdbrowse.log") {
        let _ = WriteLogger::init(args.log_level, log_config, log_file);
    }

    let file_config = match config::load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {}", e);
            eprintln!("mdbrowse: {e}");
            std::process::exit(2);
        }
    };
    let resolved = config::resolve(&file_config, args.server_url.as_deref());
    info!("mdbrowse starting up against {}", resolved.base_url);

    tui::run(resolved)
}
