use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use aqi_core::{AppError, Config, ConfigError};
use aqi_ui::{bridge, SearchModel};

mod cli;
mod terminal;

use cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = aqi_core::init(cli.log_level()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e.user_message());
            eprintln!("  ({})", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let (mut config, _) = Config::load_validated(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    let validation = config.validate();
    if !validation.is_valid() {
        return Err(ConfigError::Invalid(validation.error_summary()).into());
    }

    let runtime = bridge::init_runtime()?;

    match &cli.command {
        Command::Relay(_) => {
            let api_key = config.relay.effective_api_key().ok_or_else(|| {
                ConfigError::MissingSetting(format!(
                    "relay.api_key (or the {} environment variable)",
                    aqi_core::config::API_KEY_ENV
                ))
            })?;

            runtime.block_on(aqi_relay::serve(&config.relay, api_key))?;
        }
        Command::Search(args) => {
            bridge::init_client(&config.client)?;

            let mut model = SearchModel::from_bridge(Duration::from_millis(config.client.debounce_ms))?;
            model.set_prefix_filter(args.filter);

            tracing::info!("Searching through relay {}", config.client.relay_url);
            runtime.block_on(terminal::run(model))?;
        }
    }

    Ok(())
}
