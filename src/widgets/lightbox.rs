//! Gallery lightbox.
//!
//! Thumbnails are `.gallery-item img`; the overlay is `#lightbox-overlay`
//! with `.lb-img`, `.lb-caption`, `.lb-close`, `.lb-prev` and `.lb-next`.
//!
//! Closing and image changes are animated by the stylesheet. The component
//! tracks which animation it is waiting for and finishes the step when the
//! matching `TransitionEnd`/`AnimationEnd` arrives. A close also arms a
//! fallback timer in case the transition never fires.

use crate::dom::{Document, NodeId};
use crate::events::{Component, EventContext, Key, PageEvent};
use crate::page::{Page, TimerId};
use std::time::Duration;
use tracing::debug;

const OVERLAY_ID: &str = "lightbox-overlay";
const CLOSE_FALLBACK: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    fn out_class(self) -> &'static str {
        match self {
            Direction::Next => "slide-out-left",
            Direction::Previous => "slide-out-right",
        }
    }

    fn in_class(self) -> &'static str {
        match self {
            Direction::Next => "slide-in-right",
            Direction::Previous => "slide-in-left",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slide {
    Idle,
    Out { target: isize, direction: Direction },
    In { direction: Direction },
}

#[derive(Debug, Clone, Copy)]
struct Parts {
    overlay: NodeId,
    image: NodeId,
    caption: NodeId,
    close: NodeId,
    prev: NodeId,
    next: NodeId,
    header: Option<NodeId>,
}

impl Parts {
    fn find(doc: &Document) -> Option<Self> {
        let overlay = doc.element_by_id(OVERLAY_ID)?;
        let part = |class: &str| doc.query_within(overlay, |d, n| d.has_class(n, class)).first().copied();
        Some(Self {
            overlay,
            image: part("lb-img")?,
            caption: part("lb-caption")?,
            close: part("lb-close")?,
            prev: part("lb-prev")?,
            next: part("lb-next")?,
            header: doc.query_first(|d, n| d.tag(n) == Some("header")),
        })
    }
}

fn gallery_thumbnails(doc: &Document) -> Vec<NodeId> {
    doc.query_all(|d, n| {
        d.tag(n) == Some("img")
            && d.parent(n)
                .and_then(|p| d.closest(p, |d, a| d.has_class(a, "gallery-item")))
                .is_some()
    })
}

/// Caption for a thumbnail: its figure's `figcaption`, else its alt text.
fn caption_for(doc: &Document, thumb: NodeId) -> String {
    let figcaption = doc
        .closest(thumb, |d, n| d.tag(n) == Some("figure"))
        .and_then(|figure| {
            doc.query_within(figure, |d, n| d.tag(n) == Some("figcaption"))
                .first()
                .copied()
        })
        .map(|caption| doc.text_content(caption).trim().to_string())
        .filter(|text| !text.is_empty());

    figcaption
        .or_else(|| doc.attr(thumb, "alt").filter(|alt| !alt.is_empty()).map(str::to_string))
        .unwrap_or_default()
}

pub struct Lightbox {
    parts: Parts,
    thumbs: Vec<NodeId>,
    index: usize,
    slide: Slide,
    closing: Option<TimerId>,
}

impl Lightbox {
    /// Build the lightbox for a page, or `None` when the overlay markup is
    /// incomplete or the page has no gallery.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let parts = Parts::find(doc)?;
        let thumbs = gallery_thumbnails(doc);
        if thumbs.is_empty() {
            return None;
        }
        Some(Self {
            parts,
            thumbs,
            index: 0,
            slide: Slide::Idle,
            closing: None,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    fn wrap(&self, index: isize) -> usize {
        index.rem_euclid(self.thumbs.len() as isize) as usize
    }

    fn is_hidden(&self, doc: &Document) -> bool {
        doc.has_attr(self.parts.overlay, "hidden")
    }

    fn set_padding(&self, doc: &mut Document, value: &str) {
        let body = doc.body();
        doc.set_style(body, "padding-right", value);
        if let Some(header) = self.parts.header {
            doc.set_style(header, "padding-right", value);
        }
    }

    fn render_current(&self, doc: &mut Document) {
        let thumb = self.thumbs[self.index];
        let src = doc.attr(thumb, "src").unwrap_or_default().to_string();
        let alt = doc.attr(thumb, "alt").unwrap_or_default().to_string();
        let caption = caption_for(doc, thumb);

        doc.set_attr(self.parts.image, "src", &src);
        doc.set_attr(self.parts.image, "alt", &alt);
        doc.set_text(self.parts.caption, &caption);
    }

    pub fn show(&mut self, page: &mut Page, index: isize) {
        if let Some(timer) = self.closing.take() {
            page.timers.clear(timer);
        }

        let scrollbar = format!("{}px", page.viewport.scrollbar_width());
        let doc = &mut page.document;
        let body = doc.body();
        doc.set_style(body, "overflow", "hidden");
        self.set_padding(doc, &scrollbar);

        self.index = self.wrap(index);
        let overlay = self.parts.overlay;
        doc.remove_attr(overlay, "hidden");
        doc.remove_class(overlay, "closing");
        doc.add_class(overlay, "visible");
        self.render_current(doc);
        debug!("Lightbox showing image {}", self.index);
    }

    pub fn hide(&mut self, page: &mut Page) {
        let doc = &mut page.document;
        let overlay = self.parts.overlay;
        doc.add_class(overlay, "closing");
        doc.remove_class(overlay, "visible");

        let body = doc.body();
        doc.set_style(body, "overflow", "");
        self.set_padding(doc, "");

        if let Some(timer) = self.closing.take() {
            page.timers.clear(timer);
        }
        self.closing = Some(page.timers.set_timeout(CLOSE_FALLBACK));
    }

    fn finish_close(&mut self, page: &mut Page) {
        if let Some(timer) = self.closing.take() {
            page.timers.clear(timer);
        }
        let overlay = self.parts.overlay;
        page.document.set_attr(overlay, "hidden", "");
        page.document.remove_class(overlay, "closing");
    }

    /// Start a slide towards `target` (unwrapped index).
    pub fn change(&mut self, doc: &mut Document, target: isize, direction: Direction) {
        let image = self.parts.image;
        for class in ["slide-out-left", "slide-out-right", "slide-in-left", "slide-in-right"] {
            doc.remove_class(image, class);
        }
        doc.add_class(image, direction.out_class());
        self.slide = Slide::Out { target, direction };
    }

    fn step(&mut self, doc: &mut Document, direction: Direction) {
        let offset = match direction {
            Direction::Previous => -1,
            Direction::Next => 1,
        };
        // Chained presses continue from the pending target
        let from = match self.slide {
            Slide::Out { target, .. } => target,
            _ => self.index as isize,
        };
        self.change(doc, from + offset, direction);
    }

    fn on_animation_end(&mut self, doc: &mut Document, animation_name: &str) {
        let image = self.parts.image;
        match self.slide {
            Slide::Out { target, direction } if animation_name.starts_with("slideOut") => {
                self.index = self.wrap(target);
                self.render_current(doc);
                doc.remove_class(image, direction.out_class());
                doc.add_class(image, direction.in_class());
                self.slide = Slide::In { direction };
            }
            Slide::In { direction } if animation_name.starts_with("slideIn") => {
                doc.remove_class(image, direction.in_class());
                self.slide = Slide::Idle;
            }
            _ => {}
        }
    }

    fn on_click(&mut self, page: &mut Page, target: NodeId, ctx: &mut EventContext) {
        let doc = &page.document;
        if let Some(i) = self.thumbs.iter().position(|&thumb| doc.contains(thumb, target)) {
            ctx.prevent_default();
            self.show(page, i as isize);
            return;
        }

        let parts = self.parts;
        if doc.contains(parts.close, target) || target == parts.overlay {
            self.hide(page);
        } else if doc.contains(parts.prev, target) {
            self.step(&mut page.document, Direction::Previous);
        } else if doc.contains(parts.next, target) {
            self.step(&mut page.document, Direction::Next);
        }
    }
}

impl Component for Lightbox {
    fn name(&self) -> &'static str {
        "lightbox"
    }

    fn mount(&mut self, page: &mut Page) {
        for &thumb in &self.thumbs {
            page.document.set_style(thumb, "cursor", "pointer");
        }
        debug!("Lightbox attached to {} thumbnail(s)", self.thumbs.len());
    }

    fn unmount(&mut self, page: &mut Page) {
        if let Some(timer) = self.closing.take() {
            page.timers.clear(timer);
        }
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent, ctx: &mut EventContext) {
        match event {
            PageEvent::Click { target } => self.on_click(page, *target, ctx),
            PageEvent::KeyDown { key, .. } => {
                if self.is_hidden(&page.document) {
                    return;
                }
                match key {
                    Key::Escape => self.hide(page),
                    Key::ArrowLeft => self.step(&mut page.document, Direction::Previous),
                    Key::ArrowRight => self.step(&mut page.document, Direction::Next),
                    _ => {}
                }
            }
            PageEvent::TransitionEnd { target } if *target == self.parts.image && self.closing.is_some() => {
                self.finish_close(page);
            }
            PageEvent::Timer(id) if Some(*id) == self.closing => self.finish_close(page),
            PageEvent::AnimationEnd { target, animation_name } if *target == self.parts.image => {
                self.on_animation_end(&mut page.document, animation_name);
            }
            _ => {}
        }
    }
}
