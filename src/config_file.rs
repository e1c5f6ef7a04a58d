//! Site manifest handling for saving and loading configurations.
//!
//! A manifest is the JSON form of the site declarations: the ordered list of
//! settings, activations and mode-scoped blocks, plus optional overrides of
//! the generator defaults. It is evaluated for one build mode with
//! [`SiteManifest::into_site`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use strum::IntoEnumIterator;

use crate::extensions::Activation;
use crate::settings::{Defaults, SettingValue};
use crate::site::{default_builder, Declaration, SiteConfig};
use crate::types::BuildMode;

/// Site configuration that can be saved/loaded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteManifest {
    /// Overrides of generator defaults for unset keys
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, SettingValue>,
    /// Declarations evaluated top to bottom
    pub declarations: Vec<Declaration>,
}

impl SiteManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manifest for the blog site's own configuration
    pub fn blog_default() -> Self {
        Self {
            defaults: BTreeMap::new(),
            declarations: default_builder(BuildMode::Development).into_declarations(),
        }
    }

    /// Save manifest to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize manifest to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write manifest to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load manifest from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read manifest from {:?}", path.as_ref()))?;

        let manifest: Self =
            serde_json::from_str(&content).context("Failed to parse manifest JSON")?;

        Ok(manifest)
    }

    /// Evaluate the declarations for `mode`
    pub fn into_site(self, mode: BuildMode) -> SiteConfig {
        let defaults = self
            .defaults
            .into_iter()
            .fold(Defaults::default(), |d, (k, v)| d.with(k, v));
        self.declarations
            .into_iter()
            .fold(SiteConfig::builder(mode).defaults(defaults), |b, d| b.declare(d))
            .build()
    }

    /// Activations that take effect in `mode`, in order
    fn activations_for(&self, mode: BuildMode) -> Vec<&Activation> {
        let mut out = Vec::new();
        for declaration in &self.declarations {
            match declaration {
                Declaration::Activate(a) => out.push(a),
                Declaration::Configure(scoped) if scoped.applies_to(mode) => {
                    out.extend(scoped.block.activations.iter())
                }
                _ => {}
            }
        }
        out
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<()> {
        for declaration in &self.declarations {
            if let Declaration::Set { key, .. } = declaration {
                if key.trim().is_empty() {
                    anyhow::bail!("Setting key must not be empty");
                }
            }
        }

        for mode in BuildMode::iter() {
            let activations = self.activations_for(mode);

            // Each collaborator is set up at most once per build
            let mut seen = HashSet::new();
            for activation in &activations {
                if !seen.insert(activation.name()) {
                    anyhow::bail!(
                        "Extension '{}' is activated more than once in {} mode",
                        activation.name(),
                        mode
                    );
                }
            }

            for activation in activations {
                validate_activation(activation)?;
            }
        }

        Ok(())
    }
}

fn validate_activation(activation: &Activation) -> Result<()> {
    match activation {
        Activation::Blog(blog) => {
            if !blog.sources.contains("{title}") {
                anyhow::bail!("Blog sources pattern must contain {{title}}");
            }
            blog.source_pattern()
                .with_context(|| format!("Invalid blog sources pattern '{}'", blog.sources))?;
            if !blog.taglink.contains("{tag}") {
                anyhow::bail!("Blog taglink must contain {{tag}}");
            }
            if blog.paginate && blog.per_page == 0 {
                anyhow::bail!("Blog per_page must be at least 1 when paginating");
            }
        }
        Activation::Disqus(disqus) => {
            if disqus.shortname.trim().is_empty() {
                anyhow::bail!("Disqus shortname must be specified");
            }
        }
        Activation::LiveReload(live) => {
            if live.port == 0 {
                anyhow::bail!("Livereload port must be non-zero");
            }
        }
        Activation::Deploy(_) | Activation::Syntax(_) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{DisqusOptions, LiveReloadOptions};
    use crate::mode::{ConfigBlock, ModeScoped};
    use crate::settings::keys;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_blog_default_is_valid() {
        assert!(SiteManifest::blog_default().validate().is_ok());
    }

    #[test]
    fn test_save_and_load_json_manifest() {
        let manifest = SiteManifest::blog_default();
        let file = NamedTempFile::new().unwrap();
        manifest.save_to_file(file.path()).unwrap();

        let loaded = SiteManifest::load_from_file(file.path()).unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn test_loaded_manifest_matches_builtin_site() {
        let file = NamedTempFile::new().unwrap();
        SiteManifest::blog_default().save_to_file(file.path()).unwrap();

        for mode in BuildMode::iter() {
            let site = SiteManifest::load_from_file(file.path()).unwrap().into_site(mode);
            let builtin = SiteConfig::blog_default(mode);
            assert_eq!(site.activations(), builtin.activations());
            assert_eq!(site.settings(), builtin.settings());
        }
    }

    #[test]
    fn test_marker_shaped_options_survive_save_and_load() {
        let manifest = SiteManifest {
            declarations: vec![Declaration::Set {
                key: "widget".to_string(),
                value: SettingValue::options([("symbol", "x")]),
            }],
            ..Default::default()
        };
        let file = NamedTempFile::new().unwrap();
        manifest.save_to_file(file.path()).unwrap();

        let site = SiteManifest::load_from_file(file.path())
            .unwrap()
            .into_site(BuildMode::Build);
        assert_eq!(
            site.settings().get("widget"),
            Some(&SettingValue::options([("symbol", "x")]))
        );
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = SiteManifest::load_from_file("/nonexistent/site.json");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = SiteManifest::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn test_hand_written_manifest() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "defaults": {{ "build_dir": "public" }},
                "declarations": [
                    {{ "set": {{ "key": "css_dir", "value": "css" }} }},
                    {{ "set": {{ "key": "markdown_engine", "value": {{ "symbol": "redcarpet" }} }} }},
                    {{ "configure": {{ "mode": "build", "settings": [["http_prefix", "/blog/"]] }} }},
                    {{ "activate": {{ "name": "syntax", "options": {{ "line_numbers": true }} }} }}
                ]
            }}"#
        )
        .unwrap();

        let manifest = SiteManifest::load_from_file(file.path()).unwrap();
        manifest.validate().unwrap();
        let site = manifest.into_site(BuildMode::Build);
        assert_eq!(site.settings().get_str(keys::CSS_DIR), Some("css"));
        assert_eq!(site.settings().get_str(keys::BUILD_DIR), Some("public"));
        assert_eq!(site.settings().get_str(keys::HTTP_PREFIX), Some("/blog/"));
        assert_eq!(
            site.settings().get(keys::MARKDOWN_ENGINE),
            Some(&SettingValue::symbol("redcarpet"))
        );
        assert_eq!(site.activations().names(), vec!["syntax"]);
    }

    #[test]
    fn test_validation_empty_shortname() {
        let manifest = SiteManifest {
            declarations: vec![Declaration::Activate(Activation::Disqus(DisqusOptions {
                shortname: "  ".to_string(),
            }))],
            ..Default::default()
        };
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("shortname"));
    }

    #[test]
    fn test_validation_duplicate_activation() {
        let live = Activation::LiveReload(LiveReloadOptions::default());
        let manifest = SiteManifest {
            declarations: vec![
                Declaration::Activate(live.clone()),
                Declaration::Configure(ModeScoped::new(
                    BuildMode::Development,
                    ConfigBlock::new().activate(live),
                )),
            ],
            ..Default::default()
        };
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("development"));
    }

    #[test]
    fn test_same_extension_in_disjoint_modes_is_valid() {
        let live = Activation::LiveReload(LiveReloadOptions::default());
        let manifest = SiteManifest {
            declarations: vec![
                Declaration::Configure(ModeScoped::new(
                    BuildMode::Development,
                    ConfigBlock::new().activate(live.clone()),
                )),
                Declaration::Configure(ModeScoped::new(
                    BuildMode::Build,
                    ConfigBlock::new().activate(live),
                )),
            ],
            ..Default::default()
        };
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_validation_blog_patterns() {
        let mut manifest = SiteManifest::blog_default();
        for declaration in &mut manifest.declarations {
            if let Declaration::Activate(Activation::Blog(blog)) = declaration {
                blog.taglink = "category/index.html".to_string();
            }
        }
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("{tag}"));
    }
}
