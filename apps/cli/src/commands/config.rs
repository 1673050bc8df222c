//! `stockpile config ...`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use stockpile_client::ClientConfig;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration (file plus environment).
    Show,
    /// Write a default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print where the config file is read from.
    Path,
}

fn resolve(path: Option<PathBuf>) -> Result<PathBuf> {
    path.or_else(ClientConfig::default_config_path)
        .context("no config directory available on this platform; pass --config")
}

pub fn run(command: ConfigCommand, path: Option<PathBuf>, json: bool) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let mut config = ClientConfig::load(path).context("configuration is invalid")?;
            if config.api.token.is_some() {
                config.api.token = Some("********".to_string());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
        ConfigCommand::Init { force } => {
            let path = resolve(path)?;
            if path.exists() && !force {
                bail!("{} already exists; use --force to overwrite", path.display());
            }
            let written = ClientConfig::default().save(Some(path))?;
            println!("{}", written.display());
        }
        ConfigCommand::Path => {
            println!("{}", resolve(path)?.display());
        }
    }
    Ok(())
}
