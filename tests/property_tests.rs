//! Property-Based Tests for sitecfg
//!
//! Uses proptest for invariants of the settings registry, the date helper and
//! mode-scoped blocks.

use proptest::prelude::*;

use sitecfg::settings::keys;
use sitecfg::{
    article_date, current_tag, Article, ArticleDate, BuildMode, ConfigBlock, Defaults,
    RenderContext, SettingsRegistry, SiteConfig,
};

/// Strategy for generating valid calendar dates
fn date_strategy() -> impl Strategy<Value = ArticleDate> {
    (1970i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| ArticleDate::from_ymd(y, m, d).expect("valid date"))
}

fn mode_strategy() -> impl Strategy<Value = BuildMode> {
    prop_oneof![Just(BuildMode::Development), Just(BuildMode::Build)]
}

proptest! {
    /// Registry: the last of several writes is the one read back
    #[test]
    fn registry_last_write_wins(
        key in "[a-z_]{1,16}",
        values in prop::collection::vec("[a-z/]{0,12}", 1..8),
    ) {
        let mut registry = SettingsRegistry::new();
        for v in &values {
            registry.set(key.clone(), v.as_str());
        }
        let last = values.last().unwrap();
        prop_assert_eq!(registry.get_str(&key), Some(last.as_str()));
    }

    /// Registry: a never-set key reads the generator default, whatever else was written
    #[test]
    fn registry_unset_key_reads_default(
        key in prop::sample::select(vec![
            keys::CSS_DIR, keys::JS_DIR, keys::IMAGES_DIR, keys::FONTS_DIR,
            keys::LAYOUTS_DIR, keys::MARKDOWN_ENGINE, keys::HTTP_PREFIX,
            keys::SOURCE, keys::BUILD_DIR, keys::PARTIALS_DIR, "unknown_key",
        ]),
        others in prop::collection::btree_map("[a-z_]{1,16}", "[a-z/]{0,12}", 0..8),
    ) {
        let mut registry = SettingsRegistry::new();
        for (k, v) in others.iter().filter(|(k, _)| k.as_str() != key) {
            registry.set(k.clone(), v.as_str());
        }
        let defaults = Defaults::default();
        prop_assert!(!registry.is_set(key));
        prop_assert_eq!(registry.get(key), defaults.get(key));
    }

    /// Registry: custom defaults answer for unset keys and yield to explicit writes
    #[test]
    fn registry_custom_default_until_set(
        key in "[a-z_]{1,16}",
        default in "[a-z/]{1,12}",
        explicit in prop::option::of("[a-z/]{1,12}"),
    ) {
        let mut registry =
            SettingsRegistry::with_defaults(Defaults::empty().with(key.clone(), default.as_str()));
        prop_assert_eq!(registry.get_str(&key), Some(default.as_str()));
        if let Some(value) = &explicit {
            registry.set(key.clone(), value.as_str());
            prop_assert_eq!(registry.get_str(&key), Some(value.as_str()));
        }
        prop_assert_eq!(registry.is_set(&key), explicit.is_some());
    }

    /// article_date: published always wins over date
    #[test]
    fn article_date_prefers_published(published in date_strategy(), date in date_strategy()) {
        let article = Article {
            published: Some(published),
            date: Some(date),
            ..Default::default()
        };
        prop_assert_eq!(article_date(&article).unwrap(), published.display());
    }

    /// article_date: date is used when published is absent
    #[test]
    fn article_date_falls_back(date in date_strategy()) {
        let article = Article { date: Some(date), ..Default::default() };
        prop_assert_eq!(article_date(&article).unwrap(), date.display());
    }

    /// article_date: output has the "Month DD, YYYY" shape
    #[test]
    fn article_date_shape(date in date_strategy()) {
        let article = Article { date: Some(date), ..Default::default() };
        let s = article_date(&article).unwrap();
        let re = regex::Regex::new(r"^[A-Z][a-z]+ \d{2}, \d{4}$").unwrap();
        prop_assert!(re.is_match(&s), "unexpected format {}", s);
    }

    /// current_tag: returns exactly the bound value
    #[test]
    fn current_tag_returns_binding(tag in "\\PC{0,24}") {
        let ctx = RenderContext::tag_page("category/x.html", tag.clone());
        prop_assert_eq!(current_tag(&ctx), Some(tag.as_str()));
    }

    /// Mode-scoped settings only take effect in their own mode
    #[test]
    fn mode_scoped_setting_filter(
        declared in mode_strategy(),
        active in mode_strategy(),
        value in "[a-z/]{1,12}",
    ) {
        let site = SiteConfig::builder(active)
            .configure(declared, ConfigBlock::new().set(keys::HTTP_PREFIX, value.as_str()))
            .build();
        prop_assert_eq!(site.settings().is_set(keys::HTTP_PREFIX), declared == active);
        if declared == active {
            prop_assert_eq!(site.settings().get_str(keys::HTTP_PREFIX), Some(value.as_str()));
        }
    }
}
