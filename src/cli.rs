// ABOUTME: Command-line interface definition for texbot.
// ABOUTME: Global flags plus the chat, ask, and serve subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use texbot::config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "texbot",
    version,
    about = "TexBot: a conversational assistant for the textile industry"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (defaults to ~/.texbot/config.toml)
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Interactive terminal chat (the default)
    Chat {
        /// Chat endpoint URL
        #[arg(long, env = "TEXBOT_ENDPOINT")]
        endpoint: Option<String>,
    },
    /// Send one message, print the reply, and exit
    Ask {
        #[arg(value_name = "MESSAGE")]
        message: String,

        /// Chat endpoint URL
        #[arg(long, env = "TEXBOT_ENDPOINT")]
        endpoint: Option<String>,
    },
    /// Run the relay server in front of the completion API
    Serve {
        /// Address to listen on
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,

        /// Completion model name
        #[arg(long, short = 'm')]
        model: Option<String>,
    },
}

impl Cli {
    /// The subcommand to run; a bare `texbot` opens the chat.
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Chat { endpoint: None })
    }

    /// Load the configured file, or the default location.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }
}

/// Load `.env`-style secret files in order. Earlier files win, and none of
/// them overrides a variable that is already set. Missing files are skipped.
pub fn load_secrets(paths: &[PathBuf]) {
    for path in paths {
        match dotenvy::from_path(path) {
            Ok(()) => {}
            Err(e) if e.not_found() => {}
            Err(e) => eprintln!("warning: could not load {}: {}", path.display(), e),
        }
    }
}

/// Fold subcommand flags into the loaded config.
pub fn apply_overrides(config: &mut Config, command: &Commands) {
    match command {
        Commands::Chat { endpoint } | Commands::Ask { endpoint, .. } => {
            if let Some(url) = endpoint {
                config.endpoint.url = url.clone();
            }
        }
        Commands::Serve { bind, model } => {
            if let Some(bind) = bind {
                config.server.bind = bind.clone();
            }
            if let Some(model) = model {
                config.server.model = model.clone();
            }
        }
    }
}
