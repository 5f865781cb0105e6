//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Browse, format and edit ST template structure files
#[derive(Parser, Debug)]
#[command(name = "stree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: $XDG_CONFIG_HOME/stree/stree.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open files (or directories) and print them as a tree
    Show {
        /// ST or Markdown files; directories are searched recursively
        #[arg(value_hint = ValueHint::AnyPath)]
        files: Vec<PathBuf>,

        /// Also open the files of the stored session
        #[arg(short, long)]
        session: bool,
    },

    /// Re-serialize an ST file in canonical form
    Format {
        /// ST file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Rewrite the file instead of printing
        #[arg(short, long)]
        write: bool,
    },

    /// Create a new ST file with a single root folder
    New {
        /// Target path (".st" is appended when missing)
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },

    /// Remove a node, or the file itself
    Remove {
        /// ST or Markdown file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Rows from the document root to the node, e.g. 0/1
        #[arg(short, long, value_delimiter = '/')]
        path: Vec<usize>,

        /// Delete the file from disk (file removal only)
        #[arg(long)]
        purge: bool,
    },

    /// Manage the list of files reopened on start
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Print change notifications for a file until interrupted
    Watch {
        /// File to watch
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// List stored files
    List,

    /// Add files to the session
    Add {
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,
    },

    /// Drop a file from the session
    Forget {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Remove all files from the session
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a config template
    Init,

    /// Show config paths
    Path,
}
