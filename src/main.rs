// ABOUTME: Entry point for texbot: a terminal chat client and relay for a textile assistant.
// ABOUTME: Parses CLI args, loads secrets and config, sets up logging, and dispatches.

mod cli;

use std::path::PathBuf;

use clap::Parser;

use cli::{Cli, Commands};
use texbot::app::App;
use texbot::config::Config;
use texbot::logging::{LogTarget, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before parsing, so `.env` values reach env-backed flags.
    cli::load_secrets(&[PathBuf::from(".env"), Config::secrets_env_path()]);
    let cli = Cli::parse();

    let command = cli.command();
    let mut config = cli.load_config()?;
    cli::apply_overrides(&mut config, &command);

    let log_path = Config::log_path();
    let target = match command {
        Commands::Chat { .. } => LogTarget::File(&log_path),
        Commands::Ask { .. } | Commands::Serve { .. } => LogTarget::Stderr,
    };
    init_logging(cli.verbose, target)?;

    let app = App::new(config);
    match command {
        Commands::Chat { .. } => app.run_chat().await,
        Commands::Ask { message, .. } => {
            if !app.ask(&message).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Serve { .. } => app.serve().await,
    }
}
