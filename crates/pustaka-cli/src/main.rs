//! Pustaka: document intelligence for scholarly texts.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Command;
use pustaka_core::PustakaConfig;

fn resolve_config_path() -> PathBuf {
    std::env::var("PUSTAKA_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("pustaka.json"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if command == Command::Help {
        commands::print_help();
        return Ok(());
    }

    let config_path = resolve_config_path();
    let config = Arc::new(PustakaConfig::load(&config_path)?);
    info!("Config: {}", config_path.display());

    match command {
        Command::Analyze { files } => {
            let outputs = commands::analyze(config, &files).await?;
            println!("{}", serde_json::to_string_pretty(&outputs)?);
        }
        Command::Graph { files, threshold } => {
            let output = commands::graph(config, &files, threshold).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Help => {}
    }

    Ok(())
}
