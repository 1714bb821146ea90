use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use aqi_core::Config;

#[derive(Debug, Parser)]
#[command(name = "aqi", version, about = "Air-quality place search through a key-holding relay")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, env = "AQI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the CORS relay that holds the API key
    Relay(RelayArgs),
    /// Search places and show current air quality
    Search(SearchArgs),
}

#[derive(Debug, Args)]
pub struct RelayArgs {
    /// Address to bind
    #[arg(long)]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Relay URL up to and including the path prefix
    #[arg(long)]
    pub relay_url: Option<String>,

    /// Quiet period before a query edit triggers a search
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Start with the prefix filter enabled
    #[arg(long)]
    pub filter: bool,
}

impl Cli {
    /// Default log level for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        let base: u8 = match self.command {
            // The search screen owns stdout; keep stderr quiet by default.
            Command::Search(_) => 0,
            Command::Relay(_) => 1,
        };
        match base.saturating_add(self.verbose) {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Apply command-line overrides on top of file configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        match &self.command {
            Command::Relay(args) => {
                if let Some(bind) = &args.bind {
                    config.relay.bind_address = bind.clone();
                }
                if let Some(port) = args.port {
                    config.relay.port = port;
                }
            }
            Command::Search(args) => {
                if let Some(url) = &args.relay_url {
                    config.client.relay_url = url.clone();
                }
                if let Some(ms) = args.debounce_ms {
                    config.client.debounce_ms = ms;
                }
            }
        }
    }
}
