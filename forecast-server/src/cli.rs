use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_core::{Config, ForecastProvider, ForecastRequest, provider_from_config};
use inquire::{CustomType, Text};
use std::{path::PathBuf, sync::Arc};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Simplified api.weather.gov forecasts over HTTP")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Defaults to `serve`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve `GET /forecast`.
    Serve {
        /// Listen address, e.g. "0.0.0.0:8080".
        #[arg(long)]
        bind: Option<String>,

        /// Upstream base URL, e.g. "https://api.weather.gov".
        #[arg(long)]
        base_url: Option<String>,

        /// Timeout for each upstream request, in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Interactively write the config file.
    Configure,

    /// Look up the forecast for a single point and print it.
    Show {
        #[arg(allow_hyphen_values = true)]
        latitude: String,

        #[arg(allow_hyphen_values = true)]
        longitude: String,

        /// Print the same JSON the HTTP endpoint returns.
        #[arg(long)]
        json: bool,
    },
}

impl Default for Command {
    fn default() -> Self {
        Self::Serve {
            bind: None,
            base_url: None,
            timeout_secs: None,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let Cli {
            config: config_path,
            command,
        } = self;
        let command = command.unwrap_or_default();

        // Only `configure` needs a place to write to; the others run on defaults.
        let mut config = match (&config_path, &command) {
            (Some(path), _) => Config::load_from(path)?,
            (None, Command::Configure) => Config::load()?,
            (None, _) => Config::load_or_default()?,
        };

        match command {
            Command::Serve {
                bind,
                base_url,
                timeout_secs,
            } => {
                if let Some(bind) = bind {
                    config.server.bind = bind;
                }
                if let Some(base_url) = base_url {
                    config.upstream.base_url = base_url;
                }
                if let Some(timeout_secs) = timeout_secs {
                    config.upstream.timeout_secs = timeout_secs;
                }

                let provider = provider_from_config(&config.upstream)
                    .context("Failed to build upstream client")?;
                server::run_http_server(Arc::from(provider), &config.server.bind).await
            }
            Command::Configure => {
                let config = prompt_config(config)?;
                let path = match config_path {
                    Some(path) => {
                        config.save_to(&path)?;
                        path
                    }
                    None => config.save()?,
                };
                println!("Configuration saved to {}", path.display());
                Ok(())
            }
            Command::Show {
                latitude,
                longitude,
                json,
            } => {
                let provider = provider_from_config(&config.upstream)
                    .context("Failed to build upstream client")?;
                let output = provider
                    .forecast(&ForecastRequest::new(latitude, longitude))
                    .await?;

                if json {
                    println!("{}", serde_json::to_string(&output)?);
                } else {
                    println!("{} ({})", output.forecast, output.temperature);
                }
                Ok(())
            }
        }
    }
}

fn prompt_config(mut config: Config) -> anyhow::Result<Config> {
    let base_url = Text::new("Upstream base URL:")
        .with_default(&config.upstream.base_url)
        .prompt()?;

    let user_agent = Text::new("User-Agent (include contact info):")
        .with_default(&config.upstream.user_agent)
        .prompt()?;

    let timeout_secs = CustomType::<u64>::new("Upstream timeout in seconds:")
        .with_default(config.upstream.timeout_secs)
        .with_error_message("Please enter a whole number of seconds")
        .prompt()?;

    let bind = Text::new("Listen address:")
        .with_default(&config.server.bind)
        .prompt()?;

    config.upstream.base_url = base_url;
    config.upstream.user_agent = user_agent;
    config.upstream.timeout_secs = timeout_secs;
    config.server.bind = bind;

    Ok(config)
}
