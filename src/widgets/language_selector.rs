//! Language selector: current-language indicator, option flags, active
//! highlighting, the dropdown toggle and switch requests.
//!
//! Switching never patches the page in place. The choice is persisted and the
//! page asks the host to reload with `?lang=<code>`, which re-enters the
//! page-ready sequence.

use crate::dom::{Document, NodeId};
use crate::events::{Component, EventContext, PageEvent};
use crate::i18n::{Language, PreferenceStore, SELECTED_LANG_KEY};
use crate::page::Page;
use tracing::{debug, info};

const SELECTOR_ID: &str = "lang-selector";
const TOGGLE_CLASS: &str = "lang-toggle";
const OPTIONS_CLASS: &str = "lang-options";

/// Twemoji asset URL for an emoji: `<base>svg/<cp>-<cp>.svg`.
pub fn twemoji_url(base: &str, emoji: &str) -> String {
    let codepoints = emoji
        .chars()
        .map(|c| format!("{:x}", c as u32))
        .collect::<Vec<_>>()
        .join("-");
    format!("{}svg/{}.svg", base, codepoints)
}

/// Build a flag element for `lang` (detached).
///
/// With a CDN base the flag is an `<img>`; otherwise a `<span>` holding the
/// emoji, hidden from assistive technology.
pub fn create_flag(doc: &mut Document, lang: Language, twemoji_base: Option<&str>) -> NodeId {
    let emoji = lang.flag_emoji();
    match twemoji_base {
        Some(base) => {
            let img = doc.create_element("img");
            doc.set_attr(img, "class", "emoji twemoji-selector-flag");
            doc.set_attr(img, "draggable", "false");
            doc.set_attr(img, "src", &twemoji_url(base, &emoji));
            doc.set_attr(img, "alt", &format!("{} flag", lang.name()));
            doc.set_attr(img, "title", lang.name());
            img
        }
        None => {
            let span = doc.create_element("span");
            doc.set_attr(span, "aria-hidden", "true");
            doc.set_attr(span, "class", "twemoji-flag twemoji-selector-flag");
            doc.set_text(span, &emoji);
            span
        }
    }
}

fn is_option_link(doc: &Document, node: NodeId) -> bool {
    doc.tag(node) == Some("a")
        && doc
            .parent(node)
            .and_then(|parent| doc.closest(parent, |d, n| d.has_class(n, OPTIONS_CLASS)))
            .is_some()
}

fn option_links(doc: &Document) -> Vec<NodeId> {
    doc.query_all(is_option_link)
}

/// The raw `lang` query value of a link's `href`, resolved against the page URL.
pub fn link_lang(page: &Page, link: NodeId) -> Option<String> {
    let href = page.document.attr(link, "href")?;
    let url = page.url().join(href).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "lang")
        .map(|(_, value)| value.into_owned())
}

/// Fill `#current-flag` and `#current-abbr` for the active language.
pub fn render_current_language(page: &mut Page, active: Language, twemoji_base: Option<&str>) {
    let doc = &mut page.document;
    let (Some(flag_el), Some(abbr_el)) = (doc.element_by_id("current-flag"), doc.element_by_id("current-abbr"))
    else {
        debug!("Language indicator not present on this page");
        return;
    };

    doc.discard_children(flag_el);
    doc.set_text(abbr_el, active.abbr());
    let flag = create_flag(doc, active, twemoji_base);
    doc.append_child(flag_el, flag);
}

/// Put a flag into the `span.flag` of every option link.
pub fn render_option_flags(page: &mut Page, twemoji_base: Option<&str>) {
    for link in option_links(&page.document) {
        let doc = &page.document;
        let Some(span) = doc
            .query_within(link, |d, n| d.tag(n) == Some("span") && d.has_class(n, "flag"))
            .first()
            .copied()
        else {
            continue;
        };

        let lang = link_lang(page, link).and_then(|code| Language::from_code(&code).ok());
        let doc = &mut page.document;
        doc.discard_children(span);
        if let Some(lang) = lang {
            let flag = create_flag(doc, lang, twemoji_base);
            doc.append_child(span, flag);
        }
    }
}

/// Mark the option link of the active language with `active`.
pub fn highlight_active_language(page: &mut Page, active: Language) {
    for link in option_links(&page.document) {
        let is_active = link_lang(page, link).as_deref() == Some(active.code());
        page.document.set_class(link, "active", is_active);
    }
}

/// Handles option clicks and the dropdown toggle.
pub struct LanguageSelector {
    active: Language,
}

impl LanguageSelector {
    pub fn new(active: Language) -> Self {
        Self { active }
    }

    pub fn active(&self) -> Language {
        self.active
    }

    /// Whether the dropdown is currently open.
    pub fn is_open(page: &Page) -> bool {
        page.document
            .element_by_id(SELECTOR_ID)
            .map(|sel| page.document.has_class(sel, "open"))
            .unwrap_or(false)
    }

    fn select(&self, page: &mut Page, link: NodeId, ctx: &mut EventContext) {
        ctx.prevent_default();
        let Some(code) = link_lang(page, link) else {
            return;
        };

        info!("Switching language {} -> {}", self.active, code);
        page.storage_mut().set(SELECTED_LANG_KEY, &code);
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.append_pair("lang", &code);
        page.navigate_with_query(&query.finish());
    }

    fn on_click(&self, page: &mut Page, target: NodeId, ctx: &mut EventContext) {
        if let Some(link) = page.document.closest(target, is_option_link) {
            self.select(page, link, ctx);
        }

        let doc = &mut page.document;
        let Some(selector) = doc.element_by_id(SELECTOR_ID) else {
            return;
        };
        let Some(toggle) = doc
            .query_within(selector, |d, n| d.has_class(n, TOGGLE_CLASS))
            .first()
            .copied()
        else {
            return;
        };

        if doc.contains(toggle, target) {
            let expanded = doc.attr(toggle, "aria-expanded") == Some("true");
            doc.toggle_class(selector, "open");
            doc.set_attr(toggle, "aria-expanded", if expanded { "false" } else { "true" });
        } else if !doc.contains(selector, target) {
            doc.remove_class(selector, "open");
            doc.set_attr(toggle, "aria-expanded", "false");
        }
    }
}

impl Component for LanguageSelector {
    fn name(&self) -> &'static str {
        "language-selector"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent, ctx: &mut EventContext) {
        if let PageEvent::Click { target } = event {
            self.on_click(page, *target, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ComponentRegistry;
    use crate::i18n::MemoryStore;
    use url::Url;

    const BASE: &str = "https://cdn.example/twemoji/";

    struct Fixture {
        page: Page,
        selector: NodeId,
        toggle: NodeId,
        links: Vec<NodeId>,
        outside: NodeId,
    }

    fn fixture(stored: Option<&str>) -> Fixture {
        let store = match stored {
            Some(code) => MemoryStore::with_selected(code),
            None => MemoryStore::new(),
        };
        let mut page = Page::new(
            Url::parse("https://example.com/index.html").unwrap(),
            Document::new(),
            Box::new(store),
        );
        let doc = &mut page.document;
        let body = doc.body();
        let selector = doc.append_element(body, "div", &[("id", "lang-selector")]);
        let toggle = doc.append_element(
            selector,
            "button",
            &[("class", "lang-toggle"), ("aria-expanded", "false")],
        );
        let flag = doc.append_element(toggle, "span", &[("id", "current-flag")]);
        doc.set_text(flag, "?");
        doc.append_element(toggle, "span", &[("id", "current-abbr")]);
        let list = doc.append_element(selector, "ul", &[("class", "lang-options")]);
        let mut links = Vec::new();
        for code in ["en", "fr", "mk", "de", "xx"] {
            let li = doc.append_element(list, "li", &[]);
            let href = format!("?lang={}", code);
            let a = doc.append_element(li, "a", &[("href", href.as_str())]);
            doc.append_element(a, "span", &[("class", "flag")]);
            links.push(a);
        }
        let outside = doc.append_element(body, "main", &[]);
        Fixture { page, selector, toggle, links, outside }
    }

    #[test]
    fn test_twemoji_url() {
        assert_eq!(
            twemoji_url(BASE, &Language::ENGLISH.flag_emoji()),
            "https://cdn.example/twemoji/svg/1f1ec-1f1e7.svg"
        );
    }

    #[test]
    fn test_create_flag_image() {
        let mut doc = Document::new();
        let img = create_flag(&mut doc, Language::GERMAN, Some(BASE));
        assert_eq!(doc.tag(img), Some("img"));
        assert_eq!(doc.attr(img, "alt"), Some("Deutsch flag"));
        assert_eq!(doc.attr(img, "title"), Some("Deutsch"));
        assert!(doc.has_class(img, "twemoji-selector-flag"));
    }

    #[test]
    fn test_create_flag_emoji_fallback() {
        let mut doc = Document::new();
        let span = create_flag(&mut doc, Language::FRENCH, None);
        assert_eq!(doc.tag(span), Some("span"));
        assert_eq!(doc.text_content(span), "🇫🇷");
        assert_eq!(doc.attr(span, "aria-hidden"), Some("true"));
    }

    #[test]
    fn test_render_current_language() {
        let mut f = fixture(None);
        render_current_language(&mut f.page, Language::MACEDONIAN, Some(BASE));

        let doc = &f.page.document;
        let flag_el = doc.element_by_id("current-flag").unwrap();
        let abbr_el = doc.element_by_id("current-abbr").unwrap();
        assert_eq!(doc.text_content(abbr_el), "MK");
        assert_eq!(doc.children(flag_el).len(), 1);
        assert_eq!(doc.tag(doc.children(flag_el)[0]), Some("img"));
    }

    #[test]
    fn test_render_current_language_without_indicator() {
        let mut page = Page::new(
            Url::parse("https://example.com/").unwrap(),
            Document::new(),
            Box::new(MemoryStore::new()),
        );
        let before = page.document.outer_html(page.document.root());
        render_current_language(&mut page, Language::FRENCH, Some(BASE));
        assert_eq!(page.document.outer_html(page.document.root()), before);
    }

    #[test]
    fn test_render_option_flags_skips_unsupported() {
        let mut f = fixture(None);
        render_option_flags(&mut f.page, None);
        render_option_flags(&mut f.page, None);

        let doc = &f.page.document;
        let span_of = |link: NodeId| doc.query_within(link, |d, n| d.has_class(n, "flag"))[0];
        assert_eq!(doc.text_content(span_of(f.links[0])), "🇬🇧");
        assert_eq!(doc.children(span_of(f.links[0])).len(), 1);
        assert!(doc.children(span_of(f.links[4])).is_empty());
    }

    #[test]
    fn test_highlight_active_language() {
        let mut f = fixture(None);
        highlight_active_language(&mut f.page, Language::FRENCH);

        let active: Vec<bool> = f
            .links
            .iter()
            .map(|&l| f.page.document.has_class(l, "active"))
            .collect();
        assert_eq!(active, vec![false, true, false, false, false]);

        highlight_active_language(&mut f.page, Language::GERMAN);
        assert!(!f.page.document.has_class(f.links[1], "active"));
        assert!(f.page.document.has_class(f.links[3], "active"));
    }

    #[test]
    fn test_option_click_persists_and_navigates() {
        let mut f = fixture(Some("mk"));
        let mut registry = ComponentRegistry::new();
        registry.mount(&mut f.page, Box::new(LanguageSelector::new(Language::MACEDONIAN)));

        let flag_span = f.page.document.children(f.links[3])[0];
        let outcome = registry.dispatch(&mut f.page, &PageEvent::Click { target: flag_span });

        assert!(outcome.default_prevented);
        assert_eq!(f.page.storage().get(SELECTED_LANG_KEY).as_deref(), Some("de"));
        assert_eq!(
            f.page.pending_navigation().map(Url::as_str),
            Some("https://example.com/index.html?lang=de")
        );
    }

    #[test]
    fn test_toggle_opens_and_closes() {
        let mut f = fixture(None);
        let mut selector = LanguageSelector::new(Language::MACEDONIAN);
        let mut ctx = EventContext::default();

        selector.handle(&mut f.page, &PageEvent::Click { target: f.toggle }, &mut ctx);
        assert!(LanguageSelector::is_open(&f.page));
        assert_eq!(f.page.document.attr(f.toggle, "aria-expanded"), Some("true"));

        selector.handle(&mut f.page, &PageEvent::Click { target: f.toggle }, &mut ctx);
        assert!(!LanguageSelector::is_open(&f.page));
        assert_eq!(f.page.document.attr(f.toggle, "aria-expanded"), Some("false"));
        assert!(!ctx.default_prevented());
    }

    #[test]
    fn test_outside_click_closes() {
        let mut f = fixture(None);
        let mut selector = LanguageSelector::new(Language::MACEDONIAN);
        let mut ctx = EventContext::default();

        selector.handle(&mut f.page, &PageEvent::Click { target: f.toggle }, &mut ctx);
        selector.handle(&mut f.page, &PageEvent::Click { target: f.selector }, &mut ctx);
        assert!(LanguageSelector::is_open(&f.page));

        selector.handle(&mut f.page, &PageEvent::Click { target: f.outside }, &mut ctx);
        assert!(!LanguageSelector::is_open(&f.page));
        assert_eq!(f.page.document.attr(f.toggle, "aria-expanded"), Some("false"));
    }

    #[test]
    fn test_active_is_reported() {
        assert_eq!(LanguageSelector::new(Language::FRENCH).active(), Language::FRENCH);
    }
}
