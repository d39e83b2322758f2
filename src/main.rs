mod chat;
mod core;
#[cfg(test)]
mod test_support;
mod tui;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

use crate::core::config;

#[derive(Parser)]
#[command(name = "parley", about = "Terminal chat client for a streaming chat backend")]
struct Args {
    /// Backend base URL (e.g. http://localhost:8000)
    #[arg(short, long)]
    backend_url: Option<String>,

    /// Log file path
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("warning: {e}, using defaults");
        config::ParleyConfig::default()
    });
    let resolved = config::resolve(
        &file_config,
        args.backend_url.as_deref(),
        args.log_file.as_deref(),
    );

    // File logger only, stdout belongs to the TUI
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    log::info!("Parley starting up, backend: {}", resolved.backend_url);

    tui::run(resolved)
}
