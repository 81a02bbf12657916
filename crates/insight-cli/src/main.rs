//! Insight: turn PDFs, web pages and videos into digests with audience relevance.

use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{App, Command};

fn resolve_data_dir() -> PathBuf {
    std::env::var("INSIGHT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn print_help() {
    println!("Insight: adaptive document synthesis");
    println!();
    println!("Usage: insight <command>");
    println!();
    println!("Commands:");
    println!("  ingest <source>...         Synthesize PDF paths, video URLs or web URLs");
    println!("  regenerate <record.json>   Re-run synthesis for a stored record");
    println!("  audiences                  List the configured audiences");
    println!("  help                       Show this help message");
    println!();
    println!("Environment:");
    println!("  INSIGHT_DATA_DIR           Config directory (default: data)");
    println!("  RUST_LOG                   Log filter (default: info)");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match commands::parse_args(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{}. Use 'insight help' for usage.", message);
            std::process::exit(2);
        }
    };

    if command == Command::Help {
        print_help();
        return Ok(());
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());
    let app = App::load(&data_dir)?;

    match command {
        Command::Ingest(sources) => {
            let failures = app.ingest_all(&sources).await?;
            if failures > 0 {
                std::process::exit(1);
            }
        }
        Command::Regenerate(path) => app.regenerate(&path).await?,
        Command::Audiences => app.print_audiences()?,
        Command::Help => {}
    }

    Ok(())
}
