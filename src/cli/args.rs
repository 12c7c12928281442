//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::{parse_member_id, Direction, DocumentFormat, MemberId, PageSize};

/// Family-tree subtree builder: couples, generations and Graphviz export
#[derive(Parser, Debug)]
#[command(name = "famtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Directory of the global config file (default: XDG config dir)
    #[arg(short = 'C', long, global = true, env = "FAMTREE_CONFIG_DIR", value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the members of a family file
    Members {
        /// Family file (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show the descendant tree of a member
    Tree {
        /// Family file (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Root member id (default: member flagged isRoot)
        #[arg(short, long, value_parser = parse_member_id)]
        root: Option<MemberId>,
    },

    /// Print the descendant tree as Graphviz DOT
    Dot {
        /// Family file (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Root member id (default: member flagged isRoot)
        #[arg(short, long, value_parser = parse_member_id)]
        root: Option<MemberId>,
        /// Layout direction: TB, LR, BT, RL
        #[arg(long)]
        direction: Option<Direction>,
        /// Write to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Render descendant trees into documents via the converter
    Render {
        /// Family file (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Root member ids, rendered in parallel (default: member flagged isRoot)
        #[arg(short, long = "root", value_parser = parse_member_id)]
        roots: Vec<MemberId>,
        /// Layout direction: TB, LR, BT, RL
        #[arg(long)]
        direction: Option<Direction>,
        /// Paper size: a3, a4, a5, letter, legal
        #[arg(long)]
        page: Option<PageSize>,
        /// Document format: pdf, png, svg
        #[arg(long)]
        format: Option<DocumentFormat>,
        /// Output directory
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        output_dir: Option<PathBuf>,
        /// Convert even if an up-to-date document exists
        #[arg(long)]
        force: bool,
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
pub enum ConfigCommands {
    /// Show effective configuration
    Show {
        /// Family file whose local config is included
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },
    /// Create a config template
    Init {
        /// Create next to this family file instead of globally
        #[arg(long, value_hint = ValueHint::FilePath)]
        local: Option<PathBuf>,
    },
    /// Show config file locations
    Path,
}
