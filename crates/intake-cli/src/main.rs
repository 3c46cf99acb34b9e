//! Intake CLI - queue applicant documents and run the extraction worker.

use clap::Parser;
use intake_cli::commands;
use intake_cli::config::OutputFormat;
use intake_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> intake_cli::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    // Config management must work before a valid config exists
    let command = match cli.command {
        Command::Config(args) => {
            let formatter = Formatter::new(
                cli.format.map(Into::into).unwrap_or(OutputFormat::Table),
                !cli.no_color,
            );
            return commands::execute_config(args, config_path, &formatter);
        }
        command => command,
    };

    let config = Config::load(config_path)?;

    let format = cli.format.map(Into::into).unwrap_or(config.output.format);
    let color_enabled = !cli.no_color && config.output.color;
    let formatter = Formatter::new(format, color_enabled);

    match command {
        Command::Submit(args) => {
            let mut store = commands::open_store(&config)?;
            commands::execute_submit(args, &mut store, &formatter)?;
        }
        Command::Bulk(args) => {
            let mut store = commands::open_store(&config)?;
            commands::execute_bulk(args, &mut store, &formatter)?;
        }
        Command::Status(args) => {
            let store = commands::open_store(&config)?;
            commands::execute_status(args, &store, &formatter)?;
        }
        Command::List(args) => {
            let store = commands::open_store(&config)?;
            commands::execute_list(args, &store, &formatter)?;
        }
        Command::Worker(args) => {
            commands::execute_worker(args, &config, &formatter).await?;
        }
        Command::Parse(args) => {
            commands::execute_parse(args, &config, &formatter)?;
        }
        Command::Config(_) => {}
    }

    Ok(())
}
