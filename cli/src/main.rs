mod commands;
mod runner;
use crate::commands::Commands;
use crate::runner::{Runnable, Runner};
use clap::Parser;
use skiff::error::Error;
use skiff::logger::Logger;
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Derive a runner from the command and run it
async fn run(command: impl Runnable) -> Result<(), Error> {
    command.runner().run().await
}

#[tokio::main]
async fn main() -> ExitCode {
    Logger::init();

    let cli = Cli::parse();

    // Match all commands here, in one place
    let outcome = match cli.command {
        Commands::Deploy(cmd) => run(cmd).await,
        Commands::Package(cmd) => run(cmd).await,
        Commands::Status(cmd) => run(cmd).await,
        Commands::Destroy(cmd) => run(cmd).await,
    };

    if let Err(error) = outcome {
        eprintln!("\n{}\n{error}", console::style("Error").red().bold());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
