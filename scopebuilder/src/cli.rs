//! Command-line interface definitions for scopebuilder

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use scopebuilder::formatter::{LineSpacing, NumberingStyle, OutputFormat};

/// CLI structure for the scopebuilder application
#[derive(Parser)]
#[command(name = "scopebuilder")]
#[command(version)]
#[command(about = "Scope-of-work document builder", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./scopebuilder.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Template and checked items shared by commands that build a tree
#[derive(Args)]
pub struct Selection {
    /// Template .json file
    #[arg(
        value_name = "TEMPLATE",
        required_unless_present = "project",
        conflicts_with = "project"
    )]
    pub template: Option<PathBuf>,

    /// Project file to open instead of a template; its checked items are
    /// applied before any --check
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Item to check, written "Section > Subsection > Item" (repeatable).
    /// Every ">" separates labels, so labels containing ">" cannot be checked
    #[arg(short, long = "check", value_name = "PATH")]
    pub checks: Vec<String>,
}

/// Style overrides on top of the configured render settings
#[derive(Args)]
pub struct StyleArgs {
    /// Output format (inferred from the output extension when omitted)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Numbering style used to classify lines
    #[arg(long, value_enum)]
    pub numbering: Option<NumberingStyle>,

    /// Base font size in points (8-16)
    #[arg(long)]
    pub font_size: Option<u32>,

    /// Indent step in pixels (10-50)
    #[arg(long)]
    pub indent: Option<u32>,

    /// Line spacing
    #[arg(long, value_enum)]
    pub spacing: Option<LineSpacing>,

    /// Omit the title banner
    #[arg(long)]
    pub no_header: bool,

    /// Banner text
    #[arg(long)]
    pub title: Option<String>,
}

/// Available subcommands for scopebuilder
#[derive(Subcommand)]
pub enum Commands {
    /// Render the checked items of a template
    Render {
        #[command(flatten)]
        selection: Selection,

        #[command(flatten)]
        style: StyleArgs,

        /// Output file (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a template tree with check, lock and highlight markers
    Tree {
        #[command(flatten)]
        selection: Selection,
    },

    /// Write a project file recording the checked items
    SaveProject {
        #[command(flatten)]
        selection: Selection,

        /// Project file to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Create an empty template
    NewTemplate {
        /// Template name (e.g., "03-3000 Cast-in-Place Concrete")
        name: String,

        /// Directory to create it in (defaults to the configured templates_dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Add, remove, lock or highlight template items and save in place
    ///
    /// Items are written "Section > Subsection > Item"; every ">" separates
    /// labels. Additions run first, then lock and highlight toggles, then
    /// removals. The file is left untouched if any edit fails.
    EditTemplate {
        /// Template .json file
        template: PathBuf,

        /// Item to add; the last label is created under the rest (repeatable)
        #[arg(long, value_name = "PATH")]
        add: Vec<String>,

        /// Item to delete along with everything below it (repeatable)
        #[arg(long, value_name = "PATH")]
        remove: Vec<String>,

        /// Item whose lock flag to flip (repeatable)
        #[arg(long, value_name = "PATH")]
        toggle_lock: Vec<String>,

        /// Item whose highlight flag to flip (repeatable)
        #[arg(long, value_name = "PATH")]
        toggle_highlight: Vec<String>,
    },

    /// List templates
    ListTemplates {
        /// Directory to scan (defaults to the configured templates_dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Only names containing this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
    },

    /// List saved projects
    ListProjects {
        /// Directory to scan (defaults to the configured projects_dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Only names containing this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
    },
}
