//! Configuration for the CLI.
//!
//! Resolves `config.toml` in priority order:
//! 1. `{cwd}/.concierge/config.toml` (workspace config)
//! 2. `~/.config/concierge/config.toml` (global config)
//! 3. Built-in defaults
//!
//! Nothing is written to disk. `api_key` values support `${ENV_VAR}`
//! expansion.

use anyhow::{Context, Result, ensure};
use llm::EngineConfig;
use runtime::TurnConfig;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Config directory name under the platform config dir.
pub const CONFIG_DIR: &str = "concierge";
/// Config file name.
pub const CONFIG_FILE: &str = "config.toml";

/// Default instructions for the assistant.
pub const DEFAULT_INSTRUCTIONS: &str = "\
You are a helpful assistant that can provide current weather information, travel advisories, \
and process investments for the company you represent.
For weather and travel queries, ask for missing information before calling a function. \
For investments, follow these steps:
1. Ask for the investment amount.
2. Ask for the payment mode (ACH or wire transfer).
3. If wire transfer, ask for the wire ID.
4. Ask for the transaction date (YYYY-MM-DD format, not in the future).
5. Summarize the investment details and ask for confirmation.
6. Process the transaction and inform the user of the result.
7. If successful, congratulate the user. If failed, offer to retry.
At any point, if the user wants to exit the investment process, ask for confirmation \
before cancelling it.";

/// A group of capabilities that can be enabled together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pack {
    /// `get_current_weather`.
    Weather,
    /// `get_travel_advisory`.
    Travel,
    /// `process_investment`, `process_transaction`, `cancel_investment`.
    Investment,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Enabled capability packs.
    pub capabilities: Vec<Pack>,
    /// Hosted engine settings.
    pub engine: EngineSection,
    /// Weather collaborator settings.
    pub weather: WeatherSection,
    /// Per-turn budget.
    pub turn: TurnSection,
    /// Investment simulation.
    pub investment: InvestmentSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capabilities: vec![Pack::Weather, Pack::Travel, Pack::Investment],
            engine: EngineSection::default(),
            weather: WeatherSection::default(),
            turn: TurnSection::default(),
            investment: InvestmentSection::default(),
        }
    }
}

/// `[engine]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Model identifier.
    pub model: String,
    /// Assistant name, also used as the REPL speaker label.
    pub name: String,
    /// API base URL.
    pub base_url: String,
    /// API key (supports `${ENV_VAR}` expansion).
    pub api_key: String,
    /// Assistant instructions.
    pub instructions: String,
}

impl Default for EngineSection {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            model: engine.model,
            name: engine.name,
            base_url: engine.base_url,
            api_key: "${OPENAI_API_KEY}".to_owned(),
            instructions: DEFAULT_INSTRUCTIONS.to_owned(),
        }
    }
}

impl EngineSection {
    /// The engine client configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            model: self.model.clone(),
            name: self.name.clone(),
            base_url: self.base_url.trim_end_matches('/').to_owned(),
        }
    }
}

/// `[weather]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSection {
    /// API key (supports `${ENV_VAR}` expansion).
    pub api_key: String,
    /// Geocoding endpoint.
    pub geocoding_url: String,
    /// Current conditions endpoint.
    pub current_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for WeatherSection {
    fn default() -> Self {
        Self {
            api_key: "${OPENWEATHER_API_KEY}".to_owned(),
            geocoding_url: tools::weather::GEOCODING_URL.to_owned(),
            current_url: tools::weather::CURRENT_URL.to_owned(),
            request_timeout_secs: tools::weather::REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl WeatherSection {
    /// The per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `[turn]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnSection {
    /// Wall-clock budget of one turn in seconds.
    pub timeout_secs: u64,
    /// Delay between polls in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for TurnSection {
    fn default() -> Self {
        let turn = TurnConfig::default();
        Self {
            timeout_secs: turn.timeout.as_secs(),
            poll_interval_ms: turn.poll_interval.as_millis() as u64,
        }
    }
}

impl TurnSection {
    /// The runtime turn configuration.
    pub fn turn_config(&self) -> TurnConfig {
        TurnConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

/// `[investment]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentSection {
    /// Probability that a simulated transaction succeeds.
    pub success_probability: f64,
}

impl Default for InvestmentSection {
    fn default() -> Self {
        Self {
            success_probability: tools::investment::SUCCESS_PROBABILITY,
        }
    }
}

impl Config {
    /// Parse a TOML string, expanding environment variables in key fields.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        Ok(config.expanded())
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))
    }

    /// Resolve configuration following the priority chain.
    pub fn resolve() -> Result<Self> {
        let mut candidates = vec![PathBuf::from(".concierge").join(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join(CONFIG_DIR).join(CONFIG_FILE));
        }
        Self::first_of(&candidates)
    }

    /// Load the first existing file among `candidates`, or the defaults.
    pub fn first_of(candidates: &[PathBuf]) -> Result<Self> {
        match candidates.iter().find(|path| path.is_file()) {
            Some(path) => {
                tracing::debug!("loading config from {}", path.display());
                Self::load(path)
            }
            None => {
                tracing::debug!("no config file found, using defaults");
                Ok(Self::default().expanded())
            }
        }
    }

    /// Reject configurations the session cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.engine.api_key.trim().is_empty(),
            "the engine API key is empty: set OPENAI_API_KEY or [engine] api_key"
        );
        ensure!(
            !self.capabilities.contains(&Pack::Weather) || !self.weather.api_key.trim().is_empty(),
            "the weather API key is empty: set OPENWEATHER_API_KEY or [weather] api_key"
        );
        let p = self.investment.success_probability;
        ensure!(
            (0.0..=1.0).contains(&p),
            "[investment] success_probability must be within 0 and 1, got {p}"
        );
        ensure!(self.turn.timeout_secs > 0, "[turn] timeout_secs must be positive");
        ensure!(
            self.turn.poll_interval_ms > 0,
            "[turn] poll_interval_ms must be positive"
        );
        ensure!(
            self.weather.request_timeout_secs > 0,
            "[weather] request_timeout_secs must be positive"
        );
        Ok(())
    }

    fn expanded(mut self) -> Self {
        self.engine.api_key = expand_env_vars(&self.engine.api_key);
        self.weather.api_key = expand_env_vars(&self.weather.api_key);
        self
    }
}

/// Expand `${VAR}` patterns in a string with environment variable values.
///
/// Unknown variables are replaced with an empty string.
pub fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            result.push_str(&rest[start..]);
            return result;
        };
        if let Ok(value) = std::env::var(&after[..end]) {
            result.push_str(&value);
        }
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}
