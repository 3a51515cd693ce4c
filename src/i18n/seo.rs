//! Per-language document metadata: title, meta tags, canonical and alternates.

use crate::dom::{Document, NodeId};
use crate::i18n::{Language, SeoMetadata};
use tracing::debug;

/// How a meta tag is addressed.
#[derive(Debug, Clone, Copy)]
enum MetaKey {
    Name(&'static str),
    Property(&'static str),
}

/// Which SEO field feeds a meta tag.
#[derive(Debug, Clone, Copy)]
enum MetaSource {
    Title,
    Description,
    Keywords,
    Image,
    Locale,
}

const META_TAGS: &[(MetaKey, MetaSource)] = &[
    (MetaKey::Name("description"), MetaSource::Description),
    (MetaKey::Name("keywords"), MetaSource::Keywords),
    (MetaKey::Property("og:title"), MetaSource::Title),
    (MetaKey::Property("og:description"), MetaSource::Description),
    (MetaKey::Property("og:image"), MetaSource::Image),
    (MetaKey::Property("og:locale"), MetaSource::Locale),
    (MetaKey::Name("twitter:title"), MetaSource::Title),
    (MetaKey::Name("twitter:description"), MetaSource::Description),
    (MetaKey::Name("twitter:image"), MetaSource::Image),
];

fn find_meta(doc: &Document, key: MetaKey) -> Option<NodeId> {
    let (attr, value) = match key {
        MetaKey::Name(v) => ("name", v),
        MetaKey::Property(v) => ("property", v),
    };
    doc.query_first(|d, n| d.tag(n) == Some("meta") && d.attr(n, attr) == Some(value))
}

fn is_language_link(doc: &Document, node: NodeId) -> bool {
    doc.tag(node) == Some("link")
        && matches!(doc.attr(node, "rel"), Some("canonical") | Some("alternate"))
}

/// Rewrite title, meta tags and language links.
///
/// `base_url` is the page's `origin + path`. `lang_code` is the document's
/// language code. Absent SEO fields leave the existing markup untouched;
/// language links are always regenerated from scratch.
pub fn inject_seo(doc: &mut Document, seo: &SeoMetadata, lang_code: &str, base_url: &str) {
    if let Some(title) = seo.title.as_deref().filter(|t| !t.is_empty()) {
        doc.set_title(title);
    }

    for &(key, source) in META_TAGS {
        let value = match source {
            MetaSource::Title => seo.title.as_deref(),
            MetaSource::Description => seo.description.as_deref(),
            MetaSource::Keywords => seo.keywords.as_deref(),
            MetaSource::Image => seo.image.as_deref(),
            MetaSource::Locale => Some(lang_code),
        };
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            continue;
        };
        if let Some(meta) = find_meta(doc, key) {
            doc.set_attr(meta, "content", value);
        }
    }

    write_language_links(doc, lang_code, base_url);
}

/// Replace every canonical/alternate link with a fresh set.
fn write_language_links(doc: &mut Document, lang_code: &str, base_url: &str) {
    let stale = doc.query_all(is_language_link);
    debug!("Replacing {} language link(s)", stale.len());
    for link in stale {
        doc.discard(link);
    }

    let head = doc.head();
    let canonical = format!("{}?lang={}", base_url, lang_code);
    doc.append_element(head, "link", &[("rel", "canonical"), ("href", canonical.as_str())]);

    for lang in Language::all() {
        let href = format!("{}?lang={}", base_url, lang.code());
        doc.append_element(
            head,
            "link",
            &[("rel", "alternate"), ("hreflang", lang.code()), ("href", href.as_str())],
        );
    }

    doc.append_element(
        head,
        "link",
        &[("rel", "alternate"), ("hreflang", "x-default"), ("href", base_url)],
    );
}

/// Append the meta tags the injector writes to, with empty content.
///
/// Pages normally ship these in their static markup; the headless binary
/// uses this to build a skeleton page.
pub fn append_standard_meta_tags(doc: &mut Document) {
    let head = doc.head();
    for &(key, _) in META_TAGS {
        let (attr, value) = match key {
            MetaKey::Name(v) => ("name", v),
            MetaKey::Property(v) => ("property", v),
        };
        doc.append_element(head, "meta", &[(attr, value), ("content", "")]);
    }
}
