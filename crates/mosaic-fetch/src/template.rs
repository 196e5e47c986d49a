//! Search-results URL templates
//!
//! A template carries exactly one `{}` slot that receives the encoded query
//! token. Google and Bing image search are built in; anything else can be
//! supplied as a custom template.

use crate::error::TemplateError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Google image search
pub const GOOGLE_TEMPLATE: &str = "https://www.google.com/search?q={}&safe=strict&tbm=isch&sclient=img";

/// Bing image search
pub const BING_TEMPLATE: &str =
    "https://www.bing.com/images/search?q={}&form=HDRSC3&first=1&tsc=ImageBasicHover";

const SLOT: &str = "{}";

/// Characters escaped inside one query word
const QUERY_WORD: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Encode a query token: words are percent-encoded and joined with `+`
#[must_use]
pub fn encode_token(token: &str) -> String {
    token
        .split_whitespace()
        .map(|word| utf8_percent_encode(word, QUERY_WORD).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// Validated URL template with a single query slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTemplate {
    pattern: String,
}

impl SearchTemplate {
    /// Create template from a pattern
    ///
    /// # Errors
    /// - `TemplateError::MissingSlot` if `pattern` has no `{}`
    /// - `TemplateError::MultipleSlots` if it has more than one
    pub fn new(pattern: impl Into<String>) -> Result<Self, TemplateError> {
        let pattern = pattern.into();
        match pattern.matches(SLOT).count() {
            0 => Err(TemplateError::MissingSlot(pattern)),
            1 => Ok(Self { pattern }),
            count => Err(TemplateError::MultipleSlots {
                template: pattern,
                count,
            }),
        }
    }

    /// Raw pattern
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Results-page URL for a query token
    #[must_use]
    pub fn render(&self, token: &str) -> String {
        self.pattern.replacen(SLOT, &encode_token(token), 1)
    }
}

/// Interchangeable search providers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    /// Google image search
    Google,
    /// Bing image search
    #[default]
    Bing,
    /// Caller-supplied template
    Custom(String),
}

impl SearchProvider {
    /// Template for this provider
    ///
    /// # Errors
    /// - `TemplateError` if a custom pattern is malformed
    pub fn template(&self) -> Result<SearchTemplate, TemplateError> {
        match self {
            Self::Google => SearchTemplate::new(GOOGLE_TEMPLATE),
            Self::Bing => SearchTemplate::new(BING_TEMPLATE),
            Self::Custom(pattern) => SearchTemplate::new(pattern.clone()),
        }
    }
}

impl FromStr for SearchProvider {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "bing" => Ok(Self::Bing),
            _ => SearchTemplate::new(s).map(|t| Self::Custom(t.pattern)),
        }
    }
}

impl std::fmt::Display for SearchProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::Bing => write!(f, "bing"),
            Self::Custom(pattern) => write!(f, "{pattern}"),
        }
    }
}
