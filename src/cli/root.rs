use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use super::{ListCommand, PagesCommand};
use crate::config::Config;
use crate::tui;

/// Browse the Rick and Morty characters, fifteen at a time
#[derive(Parser)]
#[command(
    name = "gallery",
    version,
    about = "Browse the Rick and Morty characters, fifteen at a time",
    long_about = r#"A terminal character gallery over the Rick and Morty API.

Pages are served from a local buffer that grows on demand: reaching the last
known page fetches the next upstream page, and any search or filter scans the
rest of the upstream listing first.

Examples:
  gallery                                   # Interactive gallery
  gallery list --search rick --status alive # Print one page
  gallery list --page 4 --json              # Page 4 as JSON
  gallery pages --current 5 --total 10      # Show the page bar"#
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    /// Configuration file (defaults to ./.gallery.json, ./gallery.json, then the user config dir)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Root of the upstream API
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Characters per page
    #[arg(long = "page-size", global = true)]
    pub page_size: Option<usize>,

    /// Use the built-in dataset instead of the network
    #[arg(long = "offline", global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print one page of characters non-interactively
    List(ListCommand),
    /// Print the page-number bar for a given position
    Pages(PagesCommand),
}

impl Cli {
    /// The terminal UI takes over the screen
    pub fn is_interactive(&self) -> bool {
        self.command.is_none()
    }

    /// Resolve configuration: file, environment, then command-line flags
    pub async fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = Config::load_path(path).await?;
                config.load_from_env();
                config
            }
            None => Config::init().await?,
        };

        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if self.offline {
            config.offline = true;
        }
    }

    pub async fn execute(self, config: Config) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }
        debug!("Configuration: {:?}", config);

        match self.command {
            Some(Commands::List(list_cmd)) => list_cmd.execute(&config).await,
            Some(Commands::Pages(pages_cmd)) => pages_cmd.execute(),
            None => {
                info!("Starting interactive mode");
                tui::run(&config).await?;
                info!("Application finished");
                Ok(())
            }
        }
    }
}
