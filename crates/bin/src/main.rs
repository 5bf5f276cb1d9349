use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;
mod storage;

use cli::{Cli, Commands};
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("keysync=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let format = OutputFormat::from_flag(cli.json);
    match &cli.command {
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Sync(args) => commands::sync::run(args, format).await,
        Commands::List(args) => commands::list::run(args, format).await,
        Commands::Health(args) => commands::health::run(args, format).await,
    }
}
