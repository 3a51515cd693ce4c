use crate::dom::{Document, NodeId};
use crate::events::{Component, EventContext, PageEvent};
use crate::page::{Page, TimerId};
use std::time::Duration;
use tracing::debug;

fn slides(doc: &Document) -> Vec<NodeId> {
    doc.query_all(|d, n| {
        d.has_class(n, "slide")
            && d.parent(n)
                .and_then(|p| d.closest(p, |d, a| d.has_class(a, "slider")))
                .is_some()
    })
}

/// Rotates the `active` class across `.slider .slide` on a fixed interval.
pub struct Slider {
    interval: Duration,
    current: usize,
    timer: Option<TimerId>,
}

impl Slider {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            current: 0,
            timer: None,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    fn advance(&mut self, doc: &mut Document) {
        let slides = slides(doc);
        if slides.is_empty() {
            return;
        }
        let current = self.current % slides.len();
        doc.remove_class(slides[current], "active");
        self.current = (current + 1) % slides.len();
        doc.add_class(slides[self.current], "active");
    }
}

impl Component for Slider {
    fn name(&self) -> &'static str {
        "slider"
    }

    fn mount(&mut self, page: &mut Page) {
        let count = slides(&page.document).len();
        if count == 0 {
            return;
        }
        debug!("Slider rotating {} slides every {:?}", count, self.interval);
        self.timer = Some(page.timers.set_interval(self.interval));
    }

    fn unmount(&mut self, page: &mut Page) {
        if let Some(id) = self.timer.take() {
            page.timers.clear(id);
        }
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent, _ctx: &mut EventContext) {
        match event {
            PageEvent::Timer(id) if Some(*id) == self.timer => self.advance(&mut page.document),
            _ => {}
        }
    }
}
