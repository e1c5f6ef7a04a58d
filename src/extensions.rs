//! Extension activations
//!
//! Each external collaborator (blog indexing, live reload, deploy, syntax
//! highlighting, comments) gets one options struct populated by plain field
//! assignment. An [`Activation`] pairs a collaborator with its options, and an
//! [`ActivationList`] hands them to a [`Collaborator`] strictly in declaration
//! order.
//!
//! Options are not validated here beyond what the types enforce; that is the
//! collaborator's job.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tracing::info;

use crate::error::{Result, SiteError};
use crate::helpers::{Article, ArticleDate, HelperError};
use crate::types::{DeployMethod, DeployStrategy};

// =============================================================================
// Blog
// =============================================================================

static DEFAULT_SUMMARY_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(READMORE)").expect("valid default separator"));

/// Options for the blog indexing collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogOptions {
    /// Source path pattern, e.g. `articles/{year}-{month}-{day}-{title}.html`
    pub sources: String,
    /// Marker splitting an article's summary from the rest of the body
    #[serde(with = "regex_serde")]
    pub summary_separator: Regex,
    pub paginate: bool,
    pub per_page: u32,
    /// Tag page path pattern, e.g. `category/{tag}.html`
    pub taglink: String,
    pub tag_template: Option<String>,
    pub layout: String,
    /// Output path pattern for articles
    pub permalink: String,
}

impl Default for BlogOptions {
    fn default() -> Self {
        Self {
            sources: "{year}-{month}-{day}-{title}.html".to_string(),
            summary_separator: DEFAULT_SUMMARY_SEPARATOR.clone(),
            paginate: false,
            per_page: 10,
            taglink: "tags/{tag}.html".to_string(),
            tag_template: None,
            layout: "layout".to_string(),
            permalink: "{year}/{month}/{day}/{title}.html".to_string(),
        }
    }
}

impl PartialEq for BlogOptions {
    fn eq(&self, other: &Self) -> bool {
        self.sources == other.sources
            && self.summary_separator.as_str() == other.summary_separator.as_str()
            && self.paginate == other.paginate
            && self.per_page == other.per_page
            && self.taglink == other.taglink
            && self.tag_template == other.tag_template
            && self.layout == other.layout
            && self.permalink == other.permalink
    }
}

/// Fields captured from a source path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMatch {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub title: Option<String>,
}

impl SourceMatch {
    /// Calendar date encoded in the path, when year, month and day are all present
    pub fn date(&self) -> Option<ArticleDate> {
        ArticleDate::from_ymd(self.year?, self.month?, self.day?)
    }
}

/// A `{placeholder}` path pattern compiled to an anchored regex
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    regex: Regex,
}

impl PathPattern {
    pub fn compile(template: &str) -> Result<Self> {
        let mut expr = String::from("^");
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            expr.push_str(&regex::escape(&rest[..open]));
            let close = rest[open..]
                .find('}')
                .map(|i| open + i)
                .ok_or_else(|| {
                    SiteError::config(format!("unclosed '{{' in pattern '{}'", template))
                })?;
            let name = &rest[open + 1..close];
            let capture = match name {
                "year" => r"\d{4}",
                "month" | "day" => r"\d{2}",
                _ => r"[^/]+",
            };
            expr.push_str(&format!("(?P<{}>{})", name, capture));
            rest = &rest[close + 1..];
        }
        expr.push_str(&regex::escape(rest));
        expr.push('$');
        Ok(Self {
            template: template.to_string(),
            regex: Regex::new(&expr)?,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn matches(&self, path: &str) -> Option<SourceMatch> {
        let caps = self.regex.captures(path)?;
        let text = |name: &str| caps.name(name).map(|m| m.as_str());
        Some(SourceMatch {
            year: text("year").and_then(|s| s.parse().ok()),
            month: text("month").and_then(|s| s.parse().ok()),
            day: text("day").and_then(|s| s.parse().ok()),
            title: text("title").map(str::to_string),
        })
    }
}

impl BlogOptions {
    /// Compiled form of `sources`
    pub fn source_pattern(&self) -> Result<PathPattern> {
        PathPattern::compile(&self.sources)
    }

    /// Match a source path against `sources`
    pub fn match_source(&self, path: &str) -> Result<Option<SourceMatch>> {
        Ok(self.source_pattern()?.matches(path))
    }

    /// Output path of the listing page for `tag`
    ///
    /// `None` when the tag has no URL-safe characters at all.
    pub fn tag_path(&self, tag: &str) -> Option<String> {
        let slug = slugify(tag);
        if slug.is_empty() {
            return None;
        }
        Some(self.taglink.replace("{tag}", &slug))
    }

    /// Part of `body` before the summary separator, if the separator occurs
    pub fn summary<'a>(&self, body: &'a str) -> Option<&'a str> {
        self.summary_separator
            .find(body)
            .map(|m| body[..m.start()].trim_end())
    }

    /// Build an article from a source path and its front matter
    ///
    /// When the front matter has no `date`, the date encoded in the path is
    /// used. Paths that don't match `sources` yield `Ok(None)`.
    pub fn load_article(
        &self,
        path: &str,
        front_matter: std::collections::BTreeMap<String, serde_json::Value>,
    ) -> Result<Option<Article>> {
        let Some(source) = self.match_source(path)? else {
            return Ok(None);
        };
        let mut article = Article::from_front_matter(path, front_matter)?;
        if article.date.is_none() {
            article.date = source.date();
        }
        if article.title.is_empty() {
            if let Some(slug) = &source.title {
                article.title = slug.replace('-', " ");
            }
        }
        if article.date.is_none() && article.published.is_none() {
            return Err(HelperError::MissingDate {
                article: path.to_string(),
            }
            .into());
        }
        Ok(Some(article))
    }
}

/// URL-safe form of a tag name
pub fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    for c in s.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

mod regex_serde {
    use regex::Regex;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(regex: &Regex, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(regex.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Regex, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        Regex::new(&pattern).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Live reload, deploy, syntax, comments
// =============================================================================

/// Options for the development live-reload server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveReloadOptions {
    pub host: String,
    pub port: u16,
    pub apply_css_live: bool,
    pub apply_js_live: bool,
}

impl Default for LiveReloadOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 35729,
            apply_css_live: true,
            apply_js_live: true,
        }
    }
}

/// Options for the deploy collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployOptions {
    pub method: DeployMethod,
    /// Run a full build before deploying
    pub build_before: bool,
    /// Remote name or URL (default: origin)
    pub remote: Option<String>,
    /// Target branch (default: gh-pages)
    pub branch: Option<String>,
    pub strategy: DeployStrategy,
    pub commit_message: Option<String>,
}

impl DeployOptions {
    pub fn remote(&self) -> &str {
        self.remote.as_deref().unwrap_or("origin")
    }

    pub fn branch(&self) -> &str {
        self.branch.as_deref().unwrap_or("gh-pages")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntaxOptions {
    pub line_numbers: bool,
}

/// Options for the comments widget
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisqusOptions {
    pub shortname: String,
}

// =============================================================================
// Activations
// =============================================================================

/// One collaborator activation with its typed options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "options", rename_all = "lowercase")]
pub enum Activation {
    Blog(BlogOptions),
    LiveReload(LiveReloadOptions),
    Deploy(DeployOptions),
    Syntax(SyntaxOptions),
    Disqus(DisqusOptions),
}

impl Activation {
    /// Collaborator identifier
    pub fn name(&self) -> &'static str {
        match self {
            Self::Blog(_) => "blog",
            Self::LiveReload(_) => "livereload",
            Self::Deploy(_) => "deploy",
            Self::Syntax(_) => "syntax",
            Self::Disqus(_) => "disqus",
        }
    }

    /// Untyped form handed to a collaborator
    pub fn to_plugin(&self) -> Result<PluginActivation> {
        let options = match self {
            Self::Blog(o) => serde_json::to_value(o)?,
            Self::LiveReload(o) => serde_json::to_value(o)?,
            Self::Deploy(o) => serde_json::to_value(o)?,
            Self::Syntax(o) => serde_json::to_value(o)?,
            Self::Disqus(o) => serde_json::to_value(o)?,
        };
        Ok(PluginActivation {
            name: self.name().to_string(),
            options,
        })
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Collaborator name plus its options object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginActivation {
    pub name: String,
    pub options: serde_json::Value,
}

/// Receiver of activations (the generator's extension loader)
pub trait Collaborator {
    fn activate(&mut self, activation: &PluginActivation) -> anyhow::Result<()>;
}

/// Collaborator that only logs what would be activated
#[derive(Debug, Default)]
pub struct LogCollaborator {
    pub activated: Vec<String>,
}

impl Collaborator for LogCollaborator {
    fn activate(&mut self, activation: &PluginActivation) -> anyhow::Result<()> {
        info!(extension = %activation.name, options = %activation.options, "activate");
        self.activated.push(activation.name.clone());
        Ok(())
    }
}

/// Activations in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationList(Vec<Activation>);

impl ActivationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, activation: Activation) {
        self.0.push(activation);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Activation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(Activation::name).collect()
    }

    /// First activation with the given collaborator name
    pub fn find(&self, name: &str) -> Option<&Activation> {
        self.0.iter().find(|a| a.name() == name)
    }

    pub fn blog(&self) -> Option<&BlogOptions> {
        self.0.iter().find_map(|a| match a {
            Activation::Blog(o) => Some(o),
            _ => None,
        })
    }

    /// Hand every activation to `collaborator`, in order
    ///
    /// Stops at the first collaborator failure.
    pub fn activate_all(&self, collaborator: &mut dyn Collaborator) -> Result<()> {
        for activation in &self.0 {
            let plugin = activation.to_plugin()?;
            collaborator
                .activate(&plugin)
                .map_err(|e| SiteError::activation(plugin.name.clone(), format!("{:#}", e)))?;
        }
        Ok(())
    }
}

impl From<Vec<Activation>> for ActivationList {
    fn from(list: Vec<Activation>) -> Self {
        Self(list)
    }
}

impl<'a> IntoIterator for &'a ActivationList {
    type Item = &'a Activation;
    type IntoIter = std::slice::Iter<'a, Activation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
