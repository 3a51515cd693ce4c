//! Hamburger-driven mobile navigation with a focus trap.

use crate::dom::{Document, NodeId};
use crate::events::{Component, EventContext, Key, PageEvent};
use crate::page::Page;
use tracing::debug;

const MENU_ID: &str = "mobile-menu";
const HAMBURGER_CLASS: &str = "hamburger";

fn find_parts(doc: &Document) -> Option<(NodeId, NodeId)> {
    let hamburger = doc.query_first(|d, n| d.has_class(n, HAMBURGER_CLASS))?;
    let menu = doc.element_by_id(MENU_ID)?;
    Some((hamburger, menu))
}

fn is_focusable(doc: &Document, node: NodeId) -> bool {
    matches!(doc.tag(node), Some("a") | Some("button") | Some("input")) || doc.has_attr(node, "tabindex")
}

fn set_closed(doc: &mut Document, hamburger: NodeId, menu: NodeId) {
    doc.remove_class(menu, "open");
    doc.remove_class(hamburger, "active");
    doc.set_attr(hamburger, "aria-expanded", "false");
}

/// Close the menu from outside the component (e.g. before an anchor scroll).
///
/// Leaves the body scroll lock alone; the component clears it on its next
/// open/close cycle.
pub fn close_mobile_menu(doc: &mut Document) {
    if let Some(menu) = doc.element_by_id(MENU_ID) {
        doc.remove_class(menu, "open");
    }
    if let Some(hamburger) = doc.query_first(|d, n| d.has_class(n, HAMBURGER_CLASS)) {
        doc.remove_class(hamburger, "active");
        doc.set_attr(hamburger, "aria-expanded", "false");
    }
}

/// Mobile menu component. Does nothing on pages without `.hamburger` and
/// `#mobile-menu`.
#[derive(Debug, Default)]
pub struct MobileMenu {
    open: bool,
}

impl MobileMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn open(&mut self, doc: &mut Document, hamburger: NodeId, menu: NodeId) {
        doc.add_class(menu, "open");
        doc.add_class(hamburger, "active");
        doc.set_attr(hamburger, "aria-expanded", "true");
        let body = doc.body();
        doc.add_class(body, "no-scroll");
        self.open = true;
        debug!("Mobile menu opened");
    }

    fn close(&mut self, doc: &mut Document, hamburger: NodeId, menu: NodeId) {
        set_closed(doc, hamburger, menu);
        let body = doc.body();
        doc.remove_class(body, "no-scroll");
        self.open = false;
        debug!("Mobile menu closed");
    }

    fn on_click(&mut self, doc: &mut Document, target: NodeId, hamburger: NodeId, menu: NodeId) {
        if doc.contains(hamburger, target) {
            if self.open {
                self.close(doc, hamburger, menu);
            } else {
                self.open(doc, hamburger, menu);
            }
            return;
        }

        if !self.open {
            return;
        }

        if !doc.contains(menu, target) {
            self.close(doc, hamburger, menu);
            return;
        }

        let on_item = doc
            .closest(target, |d, n| matches!(d.tag(n), Some("a") | Some("button")))
            .filter(|&item| doc.contains(menu, item))
            .is_some();
        if on_item {
            self.close(doc, hamburger, menu);
        }
    }

    /// Wrap Tab focus between the first and last focusable items.
    fn trap_focus(&self, doc: &mut Document, menu: NodeId, shift: bool, ctx: &mut EventContext) {
        let Some(active) = doc.active_element() else {
            return;
        };
        if !doc.contains(menu, active) {
            return;
        }

        let items = doc.query_within(menu, is_focusable);
        let (Some(&first), Some(&last)) = (items.first(), items.last()) else {
            return;
        };

        if shift && active == first {
            ctx.prevent_default();
            doc.focus(last);
        } else if !shift && active == last {
            ctx.prevent_default();
            doc.focus(first);
        }
    }
}

impl Component for MobileMenu {
    fn name(&self) -> &'static str {
        "mobile-menu"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent, ctx: &mut EventContext) {
        let doc = &mut page.document;
        let Some((hamburger, menu)) = find_parts(doc) else {
            return;
        };

        // Another component may have closed the menu directly
        if self.open && !doc.has_class(menu, "open") {
            self.close(doc, hamburger, menu);
        }

        match event {
            PageEvent::Click { target } => self.on_click(doc, *target, hamburger, menu),
            PageEvent::KeyUp { key: Key::Escape } if self.open => {
                self.close(doc, hamburger, menu);
                doc.focus(hamburger);
            }
            PageEvent::KeyDown { key: Key::Tab, shift } if self.open => {
                self.trap_focus(doc, menu, *shift, ctx);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::MemoryStore;
    use url::Url;

    struct Fixture {
        page: Page,
        hamburger: NodeId,
        menu: NodeId,
        items: Vec<NodeId>,
        outside: NodeId,
    }

    fn fixture() -> Fixture {
        let mut page = Page::new(
            Url::parse("https://example.com/").unwrap(),
            Document::new(),
            Box::new(MemoryStore::new()),
        );
        let doc = &mut page.document;
        let body = doc.body();
        let hamburger = doc.append_element(
            body,
            "button",
            &[("class", "hamburger"), ("aria-expanded", "false")],
        );
        doc.append_element(hamburger, "span", &[]);
        let menu = doc.append_element(body, "nav", &[("id", "mobile-menu")]);
        let items = vec![
            doc.append_element(menu, "a", &[("href", "#about")]),
            doc.append_element(menu, "a", &[("href", "#contact")]),
            doc.append_element(menu, "button", &[]),
        ];
        let outside = doc.append_element(body, "main", &[]);
        Fixture { page, hamburger, menu, items, outside }
    }

    fn click(menu: &mut MobileMenu, page: &mut Page, target: NodeId) {
        menu.handle(page, &PageEvent::Click { target }, &mut EventContext::default());
    }

    #[test]
    fn test_hamburger_toggles() {
        let mut f = fixture();
        let mut menu = MobileMenu::new();

        click(&mut menu, &mut f.page, f.hamburger);
        let doc = &f.page.document;
        assert!(menu.is_open());
        assert!(doc.has_class(f.menu, "open"));
        assert!(doc.has_class(f.hamburger, "active"));
        assert_eq!(doc.attr(f.hamburger, "aria-expanded"), Some("true"));
        assert!(doc.has_class(doc.body(), "no-scroll"));

        click(&mut menu, &mut f.page, f.hamburger);
        let doc = &f.page.document;
        assert!(!menu.is_open());
        assert!(!doc.has_class(f.menu, "open"));
        assert_eq!(doc.attr(f.hamburger, "aria-expanded"), Some("false"));
        assert!(!doc.has_class(doc.body(), "no-scroll"));
    }

    #[test]
    fn test_click_on_hamburger_child_toggles() {
        let mut f = fixture();
        let mut menu = MobileMenu::new();
        let bar = f.page.document.children(f.hamburger)[0];
        click(&mut menu, &mut f.page, bar);
        assert!(menu.is_open());
    }

    #[test]
    fn test_outside_click_closes() {
        let mut f = fixture();
        let mut menu = MobileMenu::new();
        click(&mut menu, &mut f.page, f.hamburger);
        click(&mut menu, &mut f.page, f.menu);
        assert!(menu.is_open());

        click(&mut menu, &mut f.page, f.outside);
        assert!(!menu.is_open());
    }

    #[test]
    fn test_item_click_closes() {
        let mut f = fixture();
        let mut menu = MobileMenu::new();
        click(&mut menu, &mut f.page, f.hamburger);
        click(&mut menu, &mut f.page, f.items[1]);
        assert!(!menu.is_open());
    }

    #[test]
    fn test_escape_closes_and_refocuses() {
        let mut f = fixture();
        let mut menu = MobileMenu::new();
        click(&mut menu, &mut f.page, f.hamburger);

        menu.handle(
            &mut f.page,
            &PageEvent::KeyUp { key: Key::Escape },
            &mut EventContext::default(),
        );
        assert!(!menu.is_open());
        assert_eq!(f.page.document.active_element(), Some(f.hamburger));
    }

    #[test]
    fn test_escape_ignored_when_closed() {
        let mut f = fixture();
        let mut menu = MobileMenu::new();
        menu.handle(
            &mut f.page,
            &PageEvent::KeyUp { key: Key::Escape },
            &mut EventContext::default(),
        );
        assert_eq!(f.page.document.active_element(), None);
    }

    #[test]
    fn test_focus_trap_wraps() {
        let mut f = fixture();
        let mut menu = MobileMenu::new();
        click(&mut menu, &mut f.page, f.hamburger);

        let last = f.items[2];
        let first = f.items[0];
        f.page.document.focus(last);
        let mut ctx = EventContext::default();
        menu.handle(&mut f.page, &PageEvent::KeyDown { key: Key::Tab, shift: false }, &mut ctx);
        assert!(ctx.default_prevented());
        assert_eq!(f.page.document.active_element(), Some(first));

        let mut ctx = EventContext::default();
        menu.handle(&mut f.page, &PageEvent::KeyDown { key: Key::Tab, shift: true }, &mut ctx);
        assert!(ctx.default_prevented());
        assert_eq!(f.page.document.active_element(), Some(last));
    }

    #[test]
    fn test_focus_trap_leaves_middle_items() {
        let mut f = fixture();
        let mut menu = MobileMenu::new();
        click(&mut menu, &mut f.page, f.hamburger);

        f.page.document.focus(f.items[1]);
        let mut ctx = EventContext::default();
        menu.handle(&mut f.page, &PageEvent::KeyDown { key: Key::Tab, shift: false }, &mut ctx);
        assert!(!ctx.default_prevented());
        assert_eq!(f.page.document.active_element(), Some(f.items[1]));
    }

    #[test]
    fn test_close_mobile_menu_resyncs_component() {
        let mut f = fixture();
        let mut menu = MobileMenu::new();
        click(&mut menu, &mut f.page, f.hamburger);

        close_mobile_menu(&mut f.page.document);
        assert!(!f.page.document.has_class(f.menu, "open"));

        // Next event notices the external close; a hamburger click reopens
        click(&mut menu, &mut f.page, f.hamburger);
        assert!(menu.is_open());
        assert!(f.page.document.has_class(f.menu, "open"));
    }

    #[test]
    fn test_missing_markup_is_ignored() {
        let mut page = Page::new(
            Url::parse("https://example.com/").unwrap(),
            Document::new(),
            Box::new(MemoryStore::new()),
        );
        let body = page.document.body();
        let mut menu = MobileMenu::new();
        click(&mut menu, &mut page, body);
        assert!(!menu.is_open());
    }
}
