//! Type-safe configuration types for sitecfg
//!
//! Symbolic configuration values (build mode, markdown engine, deploy method)
//! are Rust enums rather than free-form strings, so a typo is a parse error
//! instead of a silently ignored setting.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Build mode selected once per process run
///
/// Mode-scoped configuration blocks only apply when their mode matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BuildMode {
    /// Local preview server
    #[default]
    Development,
    /// Static build of the site
    Build,
}

impl BuildMode {
    /// Returns true for the static build mode
    pub fn is_build(self) -> bool {
        matches!(self, Self::Build)
    }
}

/// Markdown renderer used by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MarkdownEngine {
    #[default]
    Kramdown,
    Redcarpet,
}

/// Transport used by the deploy extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeployMethod {
    #[default]
    Git,
    Rsync,
    Ftp,
    Sftp,
}

impl DeployMethod {
    /// Whether the method pushes to a version-control remote
    pub fn uses_vcs(self) -> bool {
        matches!(self, Self::Git)
    }
}

/// Commit strategy for git deploys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeployStrategy {
    #[default]
    ForcePush,
    Submodule,
}
