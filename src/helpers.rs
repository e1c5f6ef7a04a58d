//! Template helpers
//!
//! Pure functions the template layer calls while rendering a page. They keep
//! no state and mutate nothing, so any number of renders may call them in
//! parallel.
//!
//! The current tag is read from an explicit [`RenderContext`] instead of an
//! ambient template variable: pages that are not tag listings simply carry
//! `current_tag: None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Display format for article dates, e.g. "March 07, 2024"
pub const ARTICLE_DATE_FORMAT: &str = "%B %d, %Y";

/// Errors raised by the template helpers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HelperError {
    /// Neither `published` nor `date` is present on the article
    #[error("article '{article}' has neither a published nor a date field")]
    MissingDate { article: String },

    /// A front-matter date could not be parsed
    #[error("invalid date '{value}'")]
    InvalidDate { value: String },
}

/// Per-page rendering context supplied by the generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderContext {
    /// Tag being listed, only set on tag-listing pages
    pub current_tag: Option<String>,
    /// Output path of the page being rendered
    pub page_path: Option<String>,
}

impl RenderContext {
    /// Context for an ordinary page
    pub fn page(path: impl Into<String>) -> Self {
        Self {
            current_tag: None,
            page_path: Some(path.into()),
        }
    }

    /// Context for a tag-listing page
    pub fn tag_page(path: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            current_tag: Some(tag.into()),
            page_path: Some(path.into()),
        }
    }
}

/// A date value as the content model provides it
///
/// Values are kept exactly as written; an RFC 3339 offset is dropped, not
/// converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArticleDate(NaiveDateTime);

impl ArticleDate {
    pub fn new(datetime: NaiveDateTime) -> Self {
        Self(datetime)
    }

    /// Midnight on the given calendar day
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Self)
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    /// Format as "Month DD, YYYY"
    pub fn display(&self) -> String {
        self.0.format(ARTICLE_DATE_FORMAT).to_string()
    }
}

impl FromStr for ArticleDate {
    type Err = HelperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(dt.naive_local()));
        }
        for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(Self(dt));
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Self)
            .ok_or_else(|| HelperError::InvalidDate {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for ArticleDate {
    type Error = HelperError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArticleDate> for String {
    fn from(date: ArticleDate) -> Self {
        date.0.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl fmt::Display for ArticleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// An article as seen by the templates
///
/// Owned by the generator's content model; helpers only read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub path: String,
    #[serde(default, deserialize_with = "front_matter_date")]
    pub published: Option<ArticleDate>,
    #[serde(default, deserialize_with = "front_matter_date")]
    pub date: Option<ArticleDate>,
    /// Remaining front-matter fields
    #[serde(default)]
    pub data: BTreeMap<String, serde_json::Value>,
}

impl Article {
    /// Build an article from its front matter
    ///
    /// `title`, `date` and `published` are lifted out of the map; a
    /// `published: false` flag (draft marker) is left in `data`.
    pub fn from_front_matter(
        path: impl Into<String>,
        mut data: BTreeMap<String, serde_json::Value>,
    ) -> Result<Self, HelperError> {
        let title = match data.remove("title") {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => {
                data.insert("title".to_string(), other);
                String::new()
            }
            None => String::new(),
        };
        let date = take_date(&mut data, "date")?;
        let published = take_date(&mut data, "published")?;
        Ok(Self {
            title,
            path: path.into(),
            published,
            date,
            data,
        })
    }

    /// Label used in diagnostics
    fn label(&self) -> &str {
        if self.title.is_empty() {
            &self.path
        } else {
            &self.title
        }
    }
}

fn take_date(
    data: &mut BTreeMap<String, serde_json::Value>,
    key: &str,
) -> Result<Option<ArticleDate>, HelperError> {
    let date = match data.get(key) {
        Some(serde_json::Value::String(s)) => Some(s.parse()?),
        Some(serde_json::Value::Null) => None,
        // Non-date values such as a `published: false` draft flag stay in data
        _ => return Ok(None),
    };
    data.remove(key);
    Ok(date)
}

// Same rules as `take_date`: strings must parse, any other value means "no date".
fn front_matter_date<'de, D>(deserializer: D) -> Result<Option<ArticleDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Tag bound for the page being rendered, if any
pub fn current_tag(ctx: &RenderContext) -> Option<&str> {
    ctx.current_tag.as_deref()
}

/// Display date of an article
///
/// Uses `published` when present, otherwise `date`. An article with
/// neither is reported as [`HelperError::MissingDate`].
pub fn article_date(article: &Article) -> Result<String, HelperError> {
    article
        .published
        .or(article.date)
        .map(|d| d.display())
        .ok_or_else(|| HelperError::MissingDate {
            article: article.label().to_string(),
        })
}

/// The helper set exposed to templates by name
pub trait TemplateHelpers {
    fn current_tag<'a>(&self, ctx: &'a RenderContext) -> Option<&'a str>;
    fn article_date(&self, article: &Article) -> Result<String, HelperError>;
}

/// Stateless implementation of [`TemplateHelpers`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteHelpers;

impl TemplateHelpers for SiteHelpers {
    fn current_tag<'a>(&self, ctx: &'a RenderContext) -> Option<&'a str> {
        current_tag(ctx)
    }

    fn article_date(&self, article: &Article) -> Result<String, HelperError> {
        article_date(article)
    }
}
