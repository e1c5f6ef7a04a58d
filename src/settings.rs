//! Settings registry
//!
//! A key → value store populated once at startup and read by the generator
//! while rendering. Writes happen through [`SettingsRegistry`]; once startup is
//! done the registry is frozen into a read-only [`Settings`] that can be
//! shared across rendering threads.
//!
//! Lookups never fail: a key that was never set falls back to the generator
//! default from [`Defaults`], and a key with no default simply yields `None`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Literal setting keys understood by the generator
pub mod keys {
    pub const CSS_DIR: &str = "css_dir";
    pub const JS_DIR: &str = "js_dir";
    pub const IMAGES_DIR: &str = "images_dir";
    pub const FONTS_DIR: &str = "fonts_dir";
    pub const PARTIALS_DIR: &str = "partials_dir";
    pub const LAYOUTS_DIR: &str = "layouts_dir";
    pub const MARKDOWN_ENGINE: &str = "markdown_engine";
    pub const MARKDOWN: &str = "markdown";
    pub const HTTP_PREFIX: &str = "http_prefix";
    pub const SOURCE: &str = "source";
    pub const BUILD_DIR: &str = "build_dir";
}

/// A single setting value
///
/// No type validation happens here; interpreting the value is the
/// generator's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ValueRepr", into = "ValueRepr")]
pub enum SettingValue {
    Str(String),
    /// Symbolic/enumerated value such as a markdown engine name
    Symbol(String),
    Bool(bool),
    /// Small options mapping, e.g. markdown renderer flags
    Options(BTreeMap<String, SettingValue>),
}

impl SettingValue {
    /// Create a symbolic value
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// Build an options mapping from `(name, value)` pairs
    pub fn options<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<SettingValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Options(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Borrow the textual content of a string or symbol value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_options(&self) -> Option<&BTreeMap<String, SettingValue>> {
        match self {
            Self::Options(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{:?}", s),
            Self::Symbol(s) => write!(f, ":{}", s),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Options(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

// Manifest form: plain JSON strings, booleans and objects, with symbols
// written as {"symbol": "name"}. An options map that could be read back as a
// symbol or as the wrapper itself is written as {"options": {...}}.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SymbolRepr {
    symbol: String,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct WrappedOptions {
    options: BTreeMap<String, ValueRepr>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ValueRepr {
    Bool(bool),
    Str(String),
    Symbol(SymbolRepr),
    Wrapped(WrappedOptions),
    Options(BTreeMap<String, ValueRepr>),
}

/// Whether a bare options map would be mistaken for a marker object
fn needs_wrapping(map: &BTreeMap<String, SettingValue>) -> bool {
    map.len() == 1 && map.keys().any(|k| k == "symbol" || k == "options")
}

impl From<ValueRepr> for SettingValue {
    fn from(repr: ValueRepr) -> Self {
        match repr {
            ValueRepr::Bool(b) => Self::Bool(b),
            ValueRepr::Str(s) => Self::Str(s),
            ValueRepr::Symbol(sym) => Self::Symbol(sym.symbol),
            ValueRepr::Wrapped(WrappedOptions { options: map }) | ValueRepr::Options(map) => {
                Self::Options(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<SettingValue> for ValueRepr {
    fn from(value: SettingValue) -> Self {
        match value {
            SettingValue::Bool(b) => Self::Bool(b),
            SettingValue::Str(s) => Self::Str(s),
            SettingValue::Symbol(symbol) => Self::Symbol(SymbolRepr { symbol }),
            SettingValue::Options(map) => {
                let wrap = needs_wrapping(&map);
                let options = map.into_iter().map(|(k, v)| (k, v.into())).collect();
                if wrap {
                    Self::Wrapped(WrappedOptions { options })
                } else {
                    Self::Options(options)
                }
            }
        }
    }
}

/// Generator defaults consulted for keys that were never set
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    values: BTreeMap<String, SettingValue>,
}

impl Defaults {
    /// An empty defaults table (every unset key yields `None`)
    pub fn empty() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Add or replace a default
    pub fn with(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key)
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self::empty()
            .with(keys::SOURCE, "source")
            .with(keys::BUILD_DIR, "build")
            .with(keys::CSS_DIR, "stylesheets")
            .with(keys::JS_DIR, "javascripts")
            .with(keys::IMAGES_DIR, "images")
            .with(keys::FONTS_DIR, "fonts")
            .with(keys::LAYOUTS_DIR, "layouts")
            .with(keys::MARKDOWN_ENGINE, SettingValue::symbol("kramdown"))
            .with(keys::HTTP_PREFIX, "/")
    }
}

/// Read-only view of the settings, produced by [`SettingsRegistry::freeze`]
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    values: BTreeMap<String, SettingValue>,
    defaults: Defaults,
}

impl Settings {
    /// Explicit value if set, otherwise the generator default
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key).or_else(|| self.defaults.get(key))
    }

    /// String or symbol content of a setting
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(SettingValue::as_str)
    }

    /// Whether the key was explicitly set (defaults don't count)
    pub fn is_set(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Keys that were explicitly set, in sorted order
    pub fn explicit_keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Explicitly set values
    pub fn explicit(&self) -> &BTreeMap<String, SettingValue> {
        &self.values
    }

    /// Explicit values merged over the defaults
    pub fn resolved(&self) -> BTreeMap<String, SettingValue> {
        let mut merged = self.defaults.values.clone();
        merged.extend(self.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

/// Startup-time writer for the settings
#[derive(Debug, Clone, Default)]
pub struct SettingsRegistry {
    inner: Settings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
            defaults: Defaults::default(),
        }
    }
}

impl SettingsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry backed by a custom defaults table
    pub fn with_defaults(defaults: Defaults) -> Self {
        Self {
            inner: Settings {
                values: BTreeMap::new(),
                defaults,
            },
        }
    }

    /// Store a setting; the last write for a key wins
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(previous) = self.inner.values.insert(key.clone(), value) {
            debug!(key = %key, previous = %previous, "setting overwritten");
        }
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.inner.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.inner.get_str(key)
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.inner.is_set(key)
    }

    /// End the write phase
    pub fn freeze(self) -> Settings {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_key_falls_back_to_default() {
        let registry = SettingsRegistry::new();
        assert_eq!(registry.get_str(keys::CSS_DIR), Some("stylesheets"));
        assert!(!registry.is_set(keys::CSS_DIR));
    }

    #[test]
    fn test_unknown_key_is_none_not_error() {
        let registry = SettingsRegistry::new();
        assert!(registry.get("no_such_setting").is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let mut registry = SettingsRegistry::new();
        registry.set(keys::CSS_DIR, "css");
        registry.set(keys::CSS_DIR, "stylesheets/v2");
        assert_eq!(registry.get_str(keys::CSS_DIR), Some("stylesheets/v2"));
    }

    #[test]
    fn test_no_type_validation() {
        let mut registry = SettingsRegistry::new();
        registry.set(keys::CSS_DIR, true);
        assert_eq!(registry.get(keys::CSS_DIR), Some(&SettingValue::Bool(true)));
        assert_eq!(registry.get_str(keys::CSS_DIR), None);
    }

    #[test]
    fn test_custom_defaults() {
        let registry = SettingsRegistry::with_defaults(Defaults::empty().with("theme", "dark"));
        assert_eq!(registry.get_str("theme"), Some("dark"));
        assert!(registry.get(keys::CSS_DIR).is_none());
    }

    #[test]
    fn test_freeze_preserves_values() {
        let mut registry = SettingsRegistry::new();
        registry.set(keys::PARTIALS_DIR, "partials");
        let settings = registry.freeze();
        assert_eq!(settings.get_str(keys::PARTIALS_DIR), Some("partials"));
        assert_eq!(settings.explicit_keys().collect::<Vec<_>>(), vec!["partials_dir"]);
    }

    #[test]
    fn test_resolved_merges_explicit_over_defaults() {
        let mut registry = SettingsRegistry::new();
        registry.set(keys::MARKDOWN_ENGINE, SettingValue::symbol("redcarpet"));
        let resolved = registry.freeze().resolved();
        assert_eq!(
            resolved.get(keys::MARKDOWN_ENGINE),
            Some(&SettingValue::symbol("redcarpet"))
        );
        assert_eq!(resolved.get(keys::BUILD_DIR), Some(&SettingValue::from("build")));
    }

    #[test]
    fn test_value_json_forms() {
        let value = SettingValue::options([
            ("fenced_code_blocks", SettingValue::Bool(true)),
            ("engine", SettingValue::symbol("redcarpet")),
        ]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "engine": { "symbol": "redcarpet" },
                "fenced_code_blocks": true
            })
        );
        let parsed: SettingValue = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_object_with_extra_keys_is_options_not_symbol() {
        let parsed: SettingValue =
            serde_json::from_value(serde_json::json!({ "symbol": "x", "other": "y" })).unwrap();
        assert!(parsed.as_options().is_some());
    }

    #[test]
    fn test_options_shaped_like_markers_survive_json() {
        let cases = [
            SettingValue::options([("symbol", "x")]),
            SettingValue::options([("options", SettingValue::options([("a", true)]))]),
            SettingValue::options([("options", "plain")]),
            SettingValue::options([("symbol", SettingValue::symbol("nested"))]),
        ];
        for value in cases {
            let json = serde_json::to_value(&value).unwrap();
            let parsed: SettingValue = serde_json::from_value(json.clone()).unwrap();
            assert_eq!(parsed, value, "json form {}", json);
        }
    }

    #[test]
    fn test_wrapped_options_json_form() {
        let json = serde_json::to_value(SettingValue::options([("symbol", "x")])).unwrap();
        assert_eq!(json, serde_json::json!({ "options": { "symbol": "x" } }));
        let symbol: SettingValue = serde_json::from_value(serde_json::json!({ "symbol": "x" })).unwrap();
        assert_eq!(symbol, SettingValue::symbol("x"));
    }

    #[test]
    fn test_display() {
        assert_eq!(SettingValue::symbol("redcarpet").to_string(), ":redcarpet");
        assert_eq!(SettingValue::from("/").to_string(), "\"/\"");
        let opts = SettingValue::options([("smartypants", true)]);
        assert_eq!(opts.to_string(), "{smartypants: true}");
    }
}
