//! Writes translation values into marked elements.

use crate::dom::{Document, NodeId};
use crate::i18n::{TranslationDocument, TranslationNode, TranslationValue};
use serde_json::Value;
use tracing::{error, warn};

/// Attribute naming the translation key of an element.
pub const KEY_ATTR: &str = "data-i18n";

/// Attribute naming the target attribute for the translated value.
pub const TARGET_ATTR: &str = "data-i18n-attr";

/// Outcome of one injection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionReport {
    /// Elements written
    pub applied: usize,
    /// Keys with no value in the document (elements untouched)
    pub missing: Vec<String>,
    /// Structured-metadata keys whose payload was not JSON (nodes untouched)
    pub failed: Vec<String>,
}

fn is_structured_script(doc: &Document, node: NodeId) -> bool {
    doc.tag(node) == Some("script")
        && doc
            .attr(node, "type")
            .map(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
            .unwrap_or(false)
}

/// Apply every `data-i18n` key in `doc` from `translations`.
///
/// Also sets the root element's `lang` attribute. Running this twice with
/// the same document leaves the tree unchanged the second time.
pub fn inject_translations(doc: &mut Document, translations: &TranslationDocument) -> InjectionReport {
    let root = doc.root();
    doc.set_attr(root, "lang", &translations.lang_code);

    let mut report = InjectionReport::default();
    let targets = doc.query_all(|d, n| d.has_attr(n, KEY_ATTR));

    for node in targets {
        let Some(key) = doc.attr(node, KEY_ATTR).map(str::to_string) else {
            continue;
        };

        match apply(doc, node, &key, translations.lookup(&key)) {
            Applied::Written => report.applied += 1,
            Applied::Missing => {
                warn!("Missing translation: {}", key);
                report.missing.push(key);
            }
            Applied::Invalid => report.failed.push(key),
        }
    }

    report
}

enum Applied {
    Written,
    Missing,
    Invalid,
}

fn apply(doc: &mut Document, node: NodeId, key: &str, entry: Option<&TranslationNode>) -> Applied {
    let Some(entry) = entry else {
        return Applied::Missing;
    };

    if is_structured_script(doc, node) {
        let json = match entry {
            TranslationNode::Branch { json, .. } => json.clone(),
            TranslationNode::Leaf(TranslationValue::StructuredJson { value, .. }) => value.clone(),
            TranslationNode::Leaf(other) => match serde_json::from_str::<Value>(other.as_text()) {
                Ok(value) => value,
                Err(e) => {
                    error!("Invalid JSON-LD for {}: {}", key, e);
                    return Applied::Invalid;
                }
            },
        };
        return match serde_json::to_string_pretty(&json) {
            Ok(text) => {
                doc.set_text(node, &text);
                Applied::Written
            }
            Err(e) => {
                error!("Could not serialize JSON-LD for {}: {}", key, e);
                Applied::Invalid
            }
        };
    }

    let TranslationNode::Leaf(value) = entry else {
        // Sub-trees only make sense as structured metadata
        return Applied::Missing;
    };

    if let Some(attr) = doc.attr(node, TARGET_ATTR).map(str::to_string) {
        doc.set_attr(node, &attr, value.as_text());
        return Applied::Written;
    }

    match value {
        TranslationValue::Markup(html) => doc.set_inner_html(node, html),
        other => doc.set_text(node, other.as_text()),
    }
    Applied::Written
}
