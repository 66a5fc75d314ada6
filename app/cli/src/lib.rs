//! Concierge CLI application: a chat assistant on a hosted completion
//! engine with weather, travel advisory and investment capabilities.

pub use config::{Config, Pack};
pub use repl::{ChatRepl, is_exit_phrase};

use anyhow::Result;
use clap::Parser;
use llm::{Assistants, Client};
use runtime::{Registry, Runtime};
use tools::{Investment, WeatherClient, travel};

pub mod config;
pub mod repl;

/// Chat with the concierge assistant.
#[derive(Parser, Debug)]
#[command(name = "concierge", version, about = "Chat with the concierge assistant")]
pub struct Cli {}

impl Cli {
    /// Resolve the configuration, start a session and enter the REPL.
    pub async fn run(self) -> Result<()> {
        let config = Config::resolve()?;
        config.validate()?;

        let registry = registry(&config)?;
        let engine = Assistants::new(
            Client::new(),
            &config.engine.api_key,
            config.engine.engine_config(),
        )?;
        let runtime = Runtime::start(
            engine,
            registry,
            &config.engine.instructions,
            config.turn.turn_config(),
        )
        .await?;

        ChatRepl::new(runtime, &config.engine.name)?.run().await
    }
}

/// Build the capability registry from the enabled packs.
pub fn registry(config: &Config) -> Result<Registry> {
    let mut registry = Registry::new();
    for pack in &config.capabilities {
        match pack {
            Pack::Weather => {
                let client = WeatherClient::new(
                    config.weather.api_key.as_str(),
                    config.weather.request_timeout(),
                )?
                .with_endpoints(
                    config.weather.geocoding_url.as_str(),
                    config.weather.current_url.as_str(),
                );
                registry.register(client.capability())?;
            }
            Pack::Travel => registry.register(travel::capability())?,
            Pack::Investment => {
                let desk = Investment::new(config.investment.success_probability);
                for capability in desk.capabilities() {
                    registry.register(capability)?;
                }
            }
        }
    }
    Ok(registry)
}
