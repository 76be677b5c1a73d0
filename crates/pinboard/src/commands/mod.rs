pub mod backup;
pub mod completion;
pub mod config;
pub mod workspace;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use colored::Colorize;

use crate::config::Config;
use crate::store::{BoardStore, JsonStore};

/// What every command needs: the loaded config, the store and a runtime to drive it.
pub struct Context {
    pub config: Config,
    pub store: Arc<JsonStore>,
    pub runtime: tokio::runtime::Runtime,
    pub quiet: bool,
}

impl Context {
    /// `data_dir` from the command line wins over the config file.
    pub fn new(data_dir: Option<PathBuf>, quiet: bool) -> Result<Self> {
        let config = Config::load_or_default();
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => config.data_dir()?,
        };
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("pinboard-io")
            .enable_all()
            .build()
            .context("Failed to start the I/O runtime")?;
        tracing::debug!(data_dir = %data_dir.display(), "Using data directory");
        Ok(Self {
            config,
            store: Arc::new(JsonStore::new(data_dir)),
            runtime,
            quiet,
        })
    }

    pub fn store(&self) -> &dyn BoardStore {
        self.store.as_ref()
    }

    /// Print unless `--quiet` was given.
    pub fn say(&self, message: impl std::fmt::Display) {
        if !self.quiet {
            println!("{message}");
        }
    }
}

/// Ask a yes/no question, defaulting to "no". `assume_yes` skips the prompt.
pub fn confirm(question: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    inquire::Confirm::new(question)
        .with_default(false)
        .prompt()
        .context("Confirmation prompt failed (use --yes in non-interactive shells)")
}

pub fn print_version() {
    println!(
        "{} {}",
        "pinboard".bold(),
        env!("CARGO_PKG_VERSION").green()
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION").dimmed());
}
