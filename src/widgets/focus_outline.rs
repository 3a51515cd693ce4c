use crate::events::{Component, EventContext, Key, PageEvent};
use crate::page::Page;

const TABBING_CLASS: &str = "user-is-tabbing";

/// Shows focus outlines only while the user navigates with the keyboard.
#[derive(Debug, Default)]
pub struct FocusOutline;

impl FocusOutline {
    pub fn new() -> Self {
        Self
    }
}

impl Component for FocusOutline {
    fn name(&self) -> &'static str {
        "focus-outline"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent, _ctx: &mut EventContext) {
        let body = page.document.body();
        match event {
            PageEvent::KeyDown { key: Key::Tab, .. } => page.document.add_class(body, TABBING_CLASS),
            PageEvent::MouseDown { .. } => page.document.remove_class(body, TABBING_CLASS),
            _ => {}
        }
    }
}
