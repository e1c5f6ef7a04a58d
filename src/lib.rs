//! sitecfg Library
//!
//! Typed configuration for a static blog site: the settings registry read by
//! the generator, the template helpers called while rendering, and the
//! ordered extension activations with their mode-scoped blocks.

pub mod cli;
pub mod config_file;
pub mod error;
pub mod extensions;
pub mod helpers;
pub mod mode;
pub mod settings;
pub mod site;
pub mod types;

// Re-export main types for convenience
pub use config_file::SiteManifest;
pub use error::SiteError;
pub use extensions::{
    Activation, ActivationList, BlogOptions, Collaborator, DeployOptions, DisqusOptions,
    LiveReloadOptions, LogCollaborator, PluginActivation, SyntaxOptions,
};
pub use helpers::{
    article_date, current_tag, Article, ArticleDate, HelperError, RenderContext, SiteHelpers,
    TemplateHelpers,
};
pub use mode::{ConfigBlock, ModeScoped};
pub use settings::{Defaults, SettingValue, Settings, SettingsRegistry};
pub use site::{Declaration, SiteConfig, SiteConfigBuilder};
pub use types::{BuildMode, DeployMethod, DeployStrategy, MarkdownEngine};
