//! Site configuration assembly
//!
//! [`SiteConfigBuilder`] records settings, activations and mode-scoped blocks
//! in declaration order, then evaluates them top to bottom for one
//! [`BuildMode`]. The result is an immutable [`SiteConfig`] read by the
//! generator while rendering.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::error::{Result, SiteError};
use crate::extensions::{
    Activation, ActivationList, BlogOptions, Collaborator, DeployOptions, DisqusOptions,
    LiveReloadOptions, SyntaxOptions,
};
use crate::helpers::SiteHelpers;
use crate::mode::{ConfigBlock, ModeScoped};
use crate::settings::{keys, Defaults, SettingValue, Settings, SettingsRegistry};
use crate::types::{BuildMode, DeployMethod, MarkdownEngine};

/// One declaration, kept in source order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Declaration {
    Set { key: String, value: SettingValue },
    Activate(Activation),
    Configure(ModeScoped),
}

/// Records declarations for later evaluation
#[derive(Debug, Clone)]
pub struct SiteConfigBuilder {
    mode: BuildMode,
    defaults: Defaults,
    declarations: Vec<Declaration>,
}

impl SiteConfigBuilder {
    pub fn new(mode: BuildMode) -> Self {
        Self {
            mode,
            defaults: Defaults::default(),
            declarations: Vec::new(),
        }
    }

    /// Replace the generator defaults used for unset keys
    pub fn defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.declarations.push(Declaration::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn activate(mut self, activation: Activation) -> Self {
        self.declarations.push(Declaration::Activate(activation));
        self
    }

    /// Declare a block that only applies in `mode`
    pub fn configure(mut self, mode: BuildMode, block: ConfigBlock) -> Self {
        self.declarations.push(Declaration::Configure(ModeScoped::new(mode, block)));
        self
    }

    pub fn declare(mut self, declaration: Declaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Recorded declarations, in order
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn into_declarations(self) -> Vec<Declaration> {
        self.declarations
    }

    /// Evaluate every declaration in order for the builder's mode
    pub fn build(self) -> SiteConfig {
        let mut registry = SettingsRegistry::with_defaults(self.defaults);
        let mut activations = ActivationList::new();

        for declaration in &self.declarations {
            match declaration {
                Declaration::Set { key, value } => registry.set(key.clone(), value.clone()),
                Declaration::Activate(activation) => activations.push(activation.clone()),
                Declaration::Configure(scoped) => {
                    scoped.apply_if(self.mode, &mut registry, &mut activations);
                }
            }
        }

        debug!(mode = %self.mode, activations = activations.len(), "site configuration built");
        SiteConfig {
            mode: self.mode,
            settings: registry.freeze(),
            activations,
        }
    }
}

/// Fully evaluated configuration for one build mode
#[derive(Debug, Clone)]
pub struct SiteConfig {
    mode: BuildMode,
    settings: Settings,
    activations: ActivationList,
}

impl SiteConfig {
    pub fn builder(mode: BuildMode) -> SiteConfigBuilder {
        SiteConfigBuilder::new(mode)
    }

    /// The blog site's own configuration
    pub fn blog_default(mode: BuildMode) -> Self {
        default_builder(mode).build()
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn activations(&self) -> &ActivationList {
        &self.activations
    }

    pub fn helpers(&self) -> SiteHelpers {
        SiteHelpers
    }

    pub fn blog(&self) -> Option<&BlogOptions> {
        self.activations.blog()
    }

    /// Run every activation against `collaborator` in declaration order
    pub fn activate(&self, collaborator: &mut dyn Collaborator) -> Result<()> {
        info!(mode = %self.mode, count = self.activations.len(), "activating extensions");
        self.activations.activate_all(collaborator)
    }

    /// Resolved settings and activations as JSON
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let activations = self
            .activations
            .iter()
            .map(Activation::to_plugin)
            .collect::<Result<Vec<_>>>()?;
        Ok(serde_json::json!({
            "mode": self.mode,
            "settings": self.settings.resolved(),
            "activations": activations,
        }))
    }
}

/// Declarations of the blog site, in source order
pub fn default_builder(mode: BuildMode) -> SiteConfigBuilder {
    SiteConfig::builder(mode)
        .configure(
            BuildMode::Development,
            ConfigBlock::new().activate(Activation::LiveReload(LiveReloadOptions::default())),
        )
        .set(keys::CSS_DIR, "stylesheets")
        .set(keys::JS_DIR, "javascripts")
        .set(keys::IMAGES_DIR, "images")
        .set(keys::FONTS_DIR, "fonts")
        .set(keys::PARTIALS_DIR, "partials")
        .set(
            keys::MARKDOWN_ENGINE,
            SettingValue::symbol(MarkdownEngine::Redcarpet.to_string()),
        )
        .set(
            keys::MARKDOWN,
            SettingValue::options([("fenced_code_blocks", true), ("smartypants", true)]),
        )
        .activate(Activation::Blog(default_blog()))
        .configure(BuildMode::Build, ConfigBlock::new().set(keys::HTTP_PREFIX, "/"))
        .activate(Activation::Deploy(DeployOptions {
            method: DeployMethod::Git,
            build_before: true,
            ..Default::default()
        }))
        .activate(Activation::Syntax(SyntaxOptions { line_numbers: true }))
        .activate(Activation::Disqus(DisqusOptions {
            shortname: "codeandtheology".to_string(),
        }))
}

static READ_MORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("READ_MORE").expect("valid separator"));

fn default_blog() -> BlogOptions {
    let mut blog = BlogOptions::default();
    blog.sources = "articles/{year}-{month}-{day}-{title}.html".to_string();
    blog.summary_separator = READ_MORE.clone();
    blog.paginate = true;
    blog.taglink = "category/{tag}.html".to_string();
    blog.tag_template = Some("tag.html".to_string());
    blog
}

/// Read the markdown engine setting as a typed value
pub fn markdown_engine(settings: &Settings) -> Result<MarkdownEngine> {
    let name = settings
        .get_str(keys::MARKDOWN_ENGINE)
        .ok_or_else(|| SiteError::config("markdown_engine is not a name"))?;
    name.parse()
        .map_err(|_| SiteError::config(format!("unknown markdown engine '{}'", name)))
}
