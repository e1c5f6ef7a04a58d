use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::BuildMode;

/// sitecfg - Blog site configuration and template helpers
#[derive(Parser)]
#[command(name = "sitecfg")]
#[command(about = "Inspect, validate and evaluate the blog site configuration")]
#[command(version)]
pub struct Cli {
    /// Build mode used to evaluate mode-scoped blocks
    #[arg(long, global = true, default_value_t = BuildMode::Development)]
    pub mode: BuildMode,

    /// Site manifest to use instead of the built-in configuration
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print resolved settings and activation order as JSON
    Show,
    /// Validate a site manifest
    Validate {
        /// Path to manifest file to validate
        manifest: PathBuf,
    },
    /// Write the built-in configuration as a manifest
    Init {
        /// Destination file
        output: PathBuf,
    },
    /// Hand every activation to the logging collaborator, in order
    Activate,
    /// Format an article date the way templates display it
    ArticleDate {
        /// Published date (takes precedence)
        #[arg(long)]
        published: Option<String>,
        /// Fallback date
        #[arg(long)]
        date: Option<String>,
    },
    /// Print the listing path for a tag
    TagPath {
        tag: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
