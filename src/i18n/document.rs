//! Per-language translation documents.
//!
//! A `lang/<code>.json` file looks like:
//!
//! ```json
//! {
//!   "langCode": "fr",
//!   "content": { "hero": { "title": "Bonjour", "lead": "<strong>Salut</strong>" } },
//!   "seo": { "title": "...", "description": "...", "keywords": "...", "image": "..." }
//! }
//! ```
//!
//! Leaf values are classified once, here, into a [`TranslationValue`]. The
//! injector never re-inspects string contents.

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Language code assumed when a document omits `langCode`.
pub const FALLBACK_LANG_CODE: &str = "en";

static MARKUP_REGEX: OnceLock<Regex> = OnceLock::new();

fn markup_regex() -> &'static Regex {
    MARKUP_REGEX.get_or_init(|| Regex::new(r"(?i)</?[a-z][\s\S]*>").expect("valid markup regex"))
}

/// A translated leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationValue {
    /// Text written verbatim.
    PlainText(String),
    /// First-party HTML fragment, written as markup.
    Markup(String),
    /// JSON payload for structured-metadata scripts. `raw` is the text as it
    /// appeared in the document (used for attributes and plain elements).
    StructuredJson { raw: String, value: Value },
}

impl TranslationValue {
    /// Classify a string leaf.
    ///
    /// Returns `None` for empty strings, which are treated as missing.
    pub fn classify(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }

        if markup_regex().is_match(text) {
            return Some(Self::Markup(text.to_string()));
        }

        let trimmed = text.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(value) = serde_json::from_str::<Value>(text) {
                return Some(Self::StructuredJson {
                    raw: text.to_string(),
                    value,
                });
            }
        }

        Some(Self::PlainText(text.to_string()))
    }

    /// The value as it should appear in text or attribute form.
    pub fn as_text(&self) -> &str {
        match self {
            Self::PlainText(text) | Self::Markup(text) => text,
            Self::StructuredJson { raw, .. } => raw,
        }
    }
}

/// A node of the content tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationNode {
    Leaf(TranslationValue),
    /// Nested keys. The source JSON is kept so a branch can be emitted as
    /// structured metadata.
    Branch {
        children: Vec<(String, TranslationNode)>,
        json: Value,
    },
}

impl TranslationNode {
    /// Build a node from JSON. `None` means the value counts as missing.
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => TranslationValue::classify(text).map(Self::Leaf),
            // Falsy scalars such as `0` and `false` are real values, not missing ones
            Value::Bool(b) => Some(Self::Leaf(TranslationValue::PlainText(b.to_string()))),
            Value::Number(n) => Some(Self::Leaf(TranslationValue::PlainText(n.to_string()))),
            Value::Array(_) => Some(Self::Leaf(TranslationValue::StructuredJson {
                raw: value.to_string(),
                value: value.clone(),
            })),
            Value::Object(map) => Some(Self::branch_from_map(map)),
        }
    }

    fn branch_from_map(map: &Map<String, Value>) -> Self {
        let children = map
            .iter()
            .filter_map(|(key, value)| Self::from_json(value).map(|node| (key.clone(), node)))
            .collect();
        Self::Branch {
            children,
            json: Value::Object(map.clone()),
        }
    }

    fn child(&self, key: &str) -> Option<&TranslationNode> {
        match self {
            Self::Branch { children, .. } => children
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, node)| node),
            Self::Leaf(_) => None,
        }
    }
}

/// SEO fields of a translation document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SeoMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "langCode", default)]
    lang_code: Option<String>,
    #[serde(default)]
    content: Option<Map<String, Value>>,
    #[serde(default)]
    seo: Option<SeoMetadata>,
}

/// A parsed `lang/<code>.json` document.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationDocument {
    pub lang_code: String,
    pub content: TranslationNode,
    pub seo: SeoMetadata,
}

impl TranslationDocument {
    /// Parse a document from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let raw: RawDocument = serde_json::from_str(text)?;
        Ok(Self::from_raw(raw))
    }

    /// Build a document from an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let raw: RawDocument = serde_json::from_value(value)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawDocument) -> Self {
        let content = raw.content.unwrap_or_default();
        Self {
            lang_code: raw
                .lang_code
                .filter(|code| !code.is_empty())
                .unwrap_or_else(|| FALLBACK_LANG_CODE.to_string()),
            content: TranslationNode::branch_from_map(&content),
            seo: raw.seo.unwrap_or_default(),
        }
    }

    /// Look up a dot-separated key in the content tree.
    ///
    /// Empty path segments never match, so `"hero..title"` and `""` are
    /// missing rather than aliases of another key.
    pub fn lookup(&self, key: &str) -> Option<&TranslationNode> {
        key.split('.')
            .try_fold(&self.content, |node, segment| node.child(segment))
            .filter(|_| !key.is_empty())
    }
}
