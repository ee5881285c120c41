//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::{Args, Subcommand};

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the full configuration
    Show,

    /// Print one value (e.g. "server.port")
    Get { key: String },

    /// Set one value and save
    Set { key: String, value: String },

    /// Show config file path
    Path,

    /// List available keys
    Keys,

    /// Reset config to defaults
    Reset,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    match args.action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = Config::load()?;
            print!("{}", config.to_toml()?);
            if config.data.path.is_none() {
                println!("# data.path = \"{}\"", config.data_path()?.display());
            }
        }

        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key).ok_or_else(|| unknown_key(&key))?;
            println!("{}", value);
        }

        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        ConfigAction::Path => {
            println!("{}", Config::config_path()?.display());
        }

        ConfigAction::Keys => {
            for key in Config::available_keys() {
                println!("{}", key);
            }
        }

        ConfigAction::Reset => {
            Config::default().save()?;
            println!("Configuration reset to defaults");
        }
    }

    Ok(())
}

fn unknown_key(key: &str) -> Error {
    Error::Config(format!(
        "Unknown config key: {}\n\nAvailable keys:\n  {}",
        key,
        Config::available_keys().join("\n  ")
    ))
}
