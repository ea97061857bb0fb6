use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use weather_core::{Config, LookupOutcome, ServiceId, WeatherLookup, WeatherPanel};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API key for a service.
    Configure {
        /// Service short name: "weatherapi" or "gemini".
        service: String,
    },

    /// Show where the config lives and which services are configured.
    Config,

    /// Show current weather for a city.
    Show {
        /// City name.
        city: String,

        /// Write the condition icon to this file.
        #[arg(long)]
        icon_out: Option<PathBuf>,

        /// Skip the Gemini advice even when a key is configured.
        #[arg(long)]
        no_advice: bool,
    },

    /// Prompt for cities until an empty line or Esc.
    Interactive {
        /// Skip the Gemini advice even when a key is configured.
        #[arg(long)]
        no_advice: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure { service } => configure(&service),
            Command::Config => show_config(),
            Command::Show { city, icon_out, no_advice } => {
                let lookup = build_lookup(no_advice)?;
                let outcome = lookup.lookup(&city).await;

                let mut panel = WeatherPanel::new();
                panel.apply(&outcome);
                print!("{panel}");

                if let (Some(path), LookupOutcome::Weather(summary)) = (icon_out, &outcome) {
                    if let Some(icon) = summary.icon.as_ref().filter(|i| i.is_image()) {
                        fs::write(&path, &icon.bytes).with_context(|| {
                            format!("Failed to write icon file: {}", path.display())
                        })?;
                        tracing::info!(path = %path.display(), "icon written");
                    } else {
                        tracing::warn!("no decodable icon to write");
                    }
                }
                Ok(())
            }
            Command::Interactive { no_advice } => interactive(build_lookup(no_advice)?).await,
        }
    }
}

fn build_lookup(no_advice: bool) -> Result<WeatherLookup> {
    let config = Config::resolve()?;
    let lookup = WeatherLookup::from_config(&config)?;
    Ok(if no_advice { lookup.without_advice() } else { lookup })
}

async fn interactive(lookup: WeatherLookup) -> Result<()> {
    let mut panel = WeatherPanel::new();

    loop {
        let input = match Text::new("Enter city name:").prompt() {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read city name"),
        };

        let Some(city) = submitted_city(&input) else {
            break;
        };

        panel.apply(&lookup.lookup(city).await);
        println!("{panel}");
    }

    Ok(())
}

/// A blank line ends the loop; anything else is looked up as typed, like `show`.
fn submitted_city(input: &str) -> Option<&str> {
    (!input.trim().is_empty()).then_some(input)
}

fn configure(service: &str) -> Result<()> {
    let id = ServiceId::try_from(service)?;
    let path = Config::config_file_path()?;
    let mut config = Config::load()?;

    let key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    config.upsert_api_key(id, key.to_string());
    config.save()?;

    println!("Saved {id} key to {}", path.display());
    Ok(())
}

fn show_config() -> Result<()> {
    let path = Config::config_file_path()?;
    let config = Config::resolve()?;

    println!("Config file: {}", path.display());
    for id in ServiceId::all() {
        let state = match config.api_key(*id) {
            Some(key) => mask(key),
            None => "not configured".to_string(),
        };
        println!("  {id:<10} {state}  (env: {})", id.env_var());
    }
    if let Some(model) = &config.gemini_model {
        println!("  gemini model: {model}");
    }
    if let Some(secs) = config.timeout_secs {
        println!("  timeout: {secs}s");
    }

    Ok(())
}

fn mask(key: &str) -> String {
    const VISIBLE: usize = 4;
    if key.chars().count() <= VISIBLE {
        return "****".to_string();
    }
    let tail: String = key.chars().rev().take(VISIBLE).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{tail}")
}
