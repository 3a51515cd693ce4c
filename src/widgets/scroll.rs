//! In-page link scrolling and the scroll-to-top button.

use crate::dom::{Document, NodeId};
use crate::events::{Component, EventContext, PageEvent};
use crate::page::{Page, ScrollBehavior};

fn is_hash_link(doc: &Document, node: NodeId) -> bool {
    doc.tag(node) == Some("a") && doc.attr(node, "href").is_some_and(|h| h.starts_with('#'))
}

/// Document offset an element scrolls to. Elements without layout sit at 0.
pub(crate) fn element_top(doc: &Document, node: NodeId) -> f64 {
    doc.layout(node).map(|rect| rect.top).unwrap_or(0.0)
}

/// Smooth scrolling for `a[href^="#"]` links whose target exists.
#[derive(Debug, Default)]
pub struct SmoothScroll;

impl SmoothScroll {
    pub fn new() -> Self {
        Self
    }
}

impl Component for SmoothScroll {
    fn name(&self) -> &'static str {
        "smooth-scroll"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent, ctx: &mut EventContext) {
        let PageEvent::Click { target } = event else {
            return;
        };
        let doc = &page.document;
        let Some(link) = doc.closest(*target, is_hash_link) else {
            return;
        };
        let id = doc.attr(link, "href").unwrap_or_default()[1..].to_string();
        if id.is_empty() {
            return;
        }
        let Some(element) = doc.element_by_id(&id) else {
            return;
        };

        ctx.prevent_default();
        let top = element_top(doc, element);
        page.viewport.scroll_to(top, ScrollBehavior::Smooth);

        let mut url = page.url().clone();
        url.set_fragment(Some(&id));
        page.push_state(url);
    }
}

/// Shows `#scroll-top` past a scroll threshold; clicking it returns to the top.
pub struct ScrollToTop {
    threshold: f64,
}

impl ScrollToTop {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Component for ScrollToTop {
    fn name(&self) -> &'static str {
        "scroll-to-top"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent, _ctx: &mut EventContext) {
        let Some(button) = page.document.element_by_id("scroll-top") else {
            return;
        };
        match event {
            PageEvent::Scroll => {
                let visible = page.viewport.scroll_y > self.threshold;
                page.document.set_class(button, "visible", visible);
            }
            PageEvent::Click { target } if page.document.contains(button, *target) => {
                page.viewport.scroll_to(0.0, ScrollBehavior::Smooth);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Rect;
    use crate::i18n::MemoryStore;
    use crate::page::ScrollRequest;
    use url::Url;

    fn page() -> Page {
        Page::new(
            Url::parse("https://example.com/index.html").unwrap(),
            Document::new(),
            Box::new(MemoryStore::new()),
        )
    }

    #[test]
    fn test_hash_link_scrolls_and_pushes_history() {
        let mut page = page();
        let doc = &mut page.document;
        let body = doc.body();
        let link = doc.append_element(body, "a", &[("href", "#contact")]);
        let label = doc.create_text("Contact");
        doc.append_child(link, label);
        let section = doc.append_element(body, "section", &[("id", "contact")]);
        doc.set_layout(section, Rect::new(1500.0, 600.0));

        let mut ctx = EventContext::default();
        SmoothScroll::new().handle(&mut page, &PageEvent::Click { target: label }, &mut ctx);

        assert!(ctx.default_prevented());
        assert_eq!(
            page.viewport.last_scroll(),
            Some(ScrollRequest { top: 1500.0, behavior: ScrollBehavior::Smooth })
        );
        assert_eq!(page.hash(), "contact");
        assert_eq!(page.history_len(), 2);
    }

    #[test]
    fn test_hash_link_without_target_is_left_alone() {
        let mut page = page();
        let body = page.document.body();
        let link = page.document.append_element(body, "a", &[("href", "#nowhere")]);
        let bare = page.document.append_element(body, "a", &[("href", "#")]);

        let mut ctx = EventContext::default();
        let mut scroll = SmoothScroll::new();
        scroll.handle(&mut page, &PageEvent::Click { target: link }, &mut ctx);
        scroll.handle(&mut page, &PageEvent::Click { target: bare }, &mut ctx);

        assert!(!ctx.default_prevented());
        assert!(page.viewport.scroll_log.is_empty());
        assert_eq!(page.history_len(), 1);
    }

    #[test]
    fn test_scroll_top_visibility_follows_threshold() {
        let mut page = page();
        let body = page.document.body();
        let button = page.document.append_element(body, "button", &[("id", "scroll-top")]);
        let mut widget = ScrollToTop::new(400.0);

        page.viewport.scroll_y = 401.0;
        widget.handle(&mut page, &PageEvent::Scroll, &mut EventContext::default());
        assert!(page.document.has_class(button, "visible"));

        page.viewport.scroll_y = 400.0;
        widget.handle(&mut page, &PageEvent::Scroll, &mut EventContext::default());
        assert!(!page.document.has_class(button, "visible"));
    }

    #[test]
    fn test_scroll_top_click() {
        let mut page = page();
        let body = page.document.body();
        let button = page.document.append_element(body, "button", &[("id", "scroll-top")]);
        page.viewport.scroll_y = 2000.0;

        ScrollToTop::new(400.0).handle(
            &mut page,
            &PageEvent::Click { target: button },
            &mut EventContext::default(),
        );
        assert_eq!(page.viewport.scroll_y, 0.0);
        assert_eq!(page.viewport.last_scroll().map(|s| s.behavior), Some(ScrollBehavior::Smooth));
    }
}
