use crate::dom::{Document, NodeId};
use crate::events::{Component, EventContext, PageEvent};
use crate::page::{Page, Viewport};
use tracing::debug;

const LAZY_ATTR: &str = "data-lazy";

fn lazy_images(doc: &Document) -> Vec<NodeId> {
    doc.query_all(|d, n| d.tag(n) == Some("img") && d.has_attr(n, LAZY_ATTR))
}

/// Swap `data-lazy`/`data-srcset` into `src`/`srcset`.
fn load_image(doc: &mut Document, img: NodeId) {
    let Some(src) = doc.attr(img, LAZY_ATTR).map(str::to_string) else {
        return;
    };
    doc.set_attr(img, "src", &src);
    if let Some(srcset) = doc.attr(img, "data-srcset").map(str::to_string) {
        doc.set_attr(img, "srcset", &srcset);
    }
    doc.remove_attr(img, LAZY_ATTR);
}

/// Loads `img[data-lazy]` once they come within `root_margin` pixels of the
/// viewport. Hosts without intersection support get every image at mount,
/// through the same swap, so `srcset` is copied there too.
pub struct LazyLoader {
    root_margin: f64,
    observed: Vec<NodeId>,
}

impl LazyLoader {
    pub fn new(root_margin: f64) -> Self {
        Self {
            root_margin,
            observed: Vec::new(),
        }
    }

    pub fn observed(&self) -> usize {
        self.observed.len()
    }

    fn intersects(&self, doc: &Document, img: NodeId, viewport: &Viewport) -> bool {
        let Some(rect) = doc.layout(img) else {
            return false;
        };
        let top = viewport.scroll_y - self.root_margin;
        let bottom = viewport.scroll_y + viewport.height + self.root_margin;
        rect.bottom() >= top && rect.top <= bottom
    }

    fn check(&mut self, page: &mut Page) {
        let (visible, pending): (Vec<NodeId>, Vec<NodeId>) = self
            .observed
            .iter()
            .copied()
            .partition(|&img| self.intersects(&page.document, img, &page.viewport));

        for img in &visible {
            load_image(&mut page.document, *img);
        }
        if !visible.is_empty() {
            debug!("Loaded {} lazy image(s)", visible.len());
        }
        self.observed = pending;
    }
}

impl Component for LazyLoader {
    fn name(&self) -> &'static str {
        "lazy-loader"
    }

    fn mount(&mut self, page: &mut Page) {
        let images = lazy_images(&page.document);
        if !page.capabilities.intersection_observer {
            debug!("No intersection support, loading {} image(s) eagerly", images.len());
            for img in images {
                load_image(&mut page.document, img);
            }
            return;
        }
        self.observed = images;
        self.check(page);
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent, _ctx: &mut EventContext) {
        if self.observed.is_empty() {
            return;
        }
        if matches!(event, PageEvent::Load | PageEvent::Scroll) {
            self.check(page);
        }
    }
}
