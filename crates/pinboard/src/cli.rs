use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pinboard")]
#[command(author, version, about)]
#[command(long_about = "An infinite-canvas task board.\n\n\
    Cards live on a pannable, zoomable canvas and can be connected with arrows.\n\
    Every card doubles as a task in the side panel.\n\n\
    Examples:\n  \
    pinboard                          Open the last used workspace\n  \
    pinboard --workspace Roadmap      Open a workspace by title or id\n  \
    pinboard workspace list           List workspaces\n  \
    pinboard export backup.json       Write a backup of every workspace\n  \
    pinboard import backup.json       Replace all data with a backup")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Workspace to open (id or title)
    #[arg(short, long, global = false)]
    pub workspace: Option<String>,

    /// Launch fullscreen instead of in a window
    #[arg(long, global = false)]
    pub fullscreen: bool,

    /// Directory holding the boards (overrides the config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage workspaces
    Workspace {
        #[command(subcommand)]
        command: WorkspaceCommands,
    },

    /// Write a backup of all workspaces (or one) to a JSON file
    Export {
        /// Output file (defaults to pinboard-backup-<date>.json)
        file: Option<PathBuf>,

        /// Only export this workspace (id or title)
        #[arg(short, long)]
        workspace: Option<String>,
    },

    /// Load a backup file
    Import {
        /// Backup file to read
        file: PathBuf,

        /// Keep existing data and only add records whose ids are new
        #[arg(long)]
        merge: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum WorkspaceCommands {
    /// List workspaces
    List,

    /// Create a workspace
    Create {
        /// Title of the new workspace
        title: Option<String>,
    },

    /// Rename a workspace
    Rename {
        /// Workspace id or title
        workspace: String,

        /// New title
        title: String,
    },

    /// Delete a workspace and all of its cards
    Delete {
        /// Workspace id or title
        workspace: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.data_dir, defaults.autosave_delay_ms)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    /// The log filter implied by `-v`/`-q`, used unless `RUST_LOG` is set.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "pinboard=info,warn",
            1 => "pinboard=debug,info",
            _ => "pinboard=trace,debug",
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        if self.no_color {
            colored::control::set_override(false);
        }
        let ctx = crate::commands::Context::new(self.data_dir, self.quiet)?;
        match self.command {
            Some(Commands::Workspace { command }) => crate::commands::workspace::run(&ctx, command),
            Some(Commands::Export { file, workspace }) => {
                crate::commands::backup::export(&ctx, file, workspace.as_deref())
            }
            Some(Commands::Import { file, merge, yes }) => {
                crate::commands::backup::import(&ctx, &file, merge, yes)
            }
            Some(Commands::Config { command }) => crate::commands::config::run(&ctx, command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                crate::commands::print_version();
                Ok(())
            }
            None => crate::app::run(ctx, self.workspace, self.fullscreen),
        }
    }
}
